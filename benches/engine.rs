//! Engine performance benchmarks (Criterion).
//!
//! Run: `cargo bench` or `cargo bench --bench engine`.

use beer_game_engine::agent;
use beer_game_engine::config::{EngineConfig, GameConfig};
use beer_game_engine::engine::{tick, GameState};
use beer_game_engine::types::{DemandPattern, GameStatus, Role};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};

fn active_state() -> GameState {
    let defaults = EngineConfig::default();
    let config = GameConfig::new("bench".into(), 1, 1, DemandPattern::Constant, 12, Some(7), &defaults).unwrap();
    let mut state = GameState::new(config);
    state.status = GameStatus::Active;
    state
}

fn bench_tick_throughput(c: &mut Criterion) {
    const WEEKS: usize = 1000;
    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(WEEKS as u64));
    group.bench_function("tick_1000_weeks_constant_demand", |b| {
        b.iter_batched(
            || {
                let mut defaults = EngineConfig::default();
                defaults.max_weeks = u32::MAX;
                let config = GameConfig::new("bench".into(), 1, 1, DemandPattern::Constant, 12, Some(7), &defaults).unwrap();
                let mut state = GameState::new(config);
                state.status = GameStatus::Active;
                state
            },
            |mut state| {
                for _ in 0..WEEKS {
                    for role in Role::ALL {
                        state.decision_ledger.insert(role, 4);
                    }
                    let (next, _events) = tick(&state).unwrap();
                    state = next;
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_agent_decide(c: &mut Criterion) {
    const ROLES: usize = 4;
    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(ROLES as u64));
    group.bench_function("agent_decide_all_roles", |b| {
        b.iter_batched(
            || {
                let mut state = active_state();
                state.current_week = 8;
                for role in Role::ALL {
                    state.order_history.get_mut(&role).unwrap().extend([4, 4, 4, 4, 4, 4, 4, 4]);
                }
                state
            },
            |state| {
                for role in Role::ALL {
                    let _ = agent::decide(&state, role).unwrap();
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_tick_throughput, bench_agent_decide);
criterion_main!(benches);
