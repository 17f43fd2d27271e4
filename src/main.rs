//! CLI demo: runs one all-AI game to completion and prints every emitted event.
//!
//! Config is read from environment variables, mirroring the matching
//! engine's env-var-configured binary:
//!   ORDER_DELAY, SHIPPING_DELAY (weeks, default 1)
//!   INITIAL_INVENTORY (units, default 12)
//!   DEMAND_PATTERN (constant|step|random, default constant)
//!   MAX_WEEKS (default 36)

use beer_game_engine::config::{EngineConfig, GameConfig};
use beer_game_engine::registry::GameRegistry;
use beer_game_engine::types::{DemandPattern, GameStatus, Role};
use beer_game_engine::AutoplaySettings;
use beer_game_engine::audit::StdoutAuditSink;
use beer_game_engine::persistence::FilePersistence;
use std::sync::Arc;

fn env_u8(name: &str, default: u8) -> u8 {
    std::env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn demand_pattern() -> DemandPattern {
    match std::env::var("DEMAND_PATTERN").as_deref() {
        Ok("step") => DemandPattern::Step,
        Ok("random") => DemandPattern::Random,
        _ => DemandPattern::Constant,
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let mut defaults = EngineConfig::default();
    defaults.max_weeks = env_u32("MAX_WEEKS", defaults.max_weeks);

    let config = GameConfig::new(
        "demo".into(),
        env_u8("ORDER_DELAY", 1),
        env_u8("SHIPPING_DELAY", 1),
        demand_pattern(),
        env_u32("INITIAL_INVENTORY", 12),
        Some(1),
        &defaults,
    )
    .expect("valid demo config");

    let persistence = Arc::new(FilePersistence::new("/tmp/beer-game-demo.json"));
    let registry = GameRegistry::new(Arc::new(StdoutAuditSink), Some(persistence));

    let game_id = registry.create_game(config, "demo-cli".into());
    for role in Role::ALL {
        registry
            .assign_role(&game_id, role, format!("{:?}", role), true)
            .await
            .expect("assign role");
    }
    registry.start(&game_id, "demo-cli".into()).await.expect("start game");
    registry
        .set_autoplay(&game_id, AutoplaySettings { enabled: true, auto_advance: true, interval_ms: 0 })
        .await
        .expect("enable autoplay");

    let mut subscriber = registry.subscribe(&game_id).await.expect("subscribe");

    loop {
        registry
            .request_agent_decisions(&game_id)
            .await
            .expect("request agent decisions");

        while let Ok(event) = subscriber.try_recv() {
            println!("{:?}", event);
        }

        let state = registry.snapshot_game(&game_id).await.expect("snapshot");
        if matches!(state.status, GameStatus::Completed | GameStatus::Halted) {
            println!("game {} finished: {:?}", state.game_id, state.status);
            break;
        }
    }
}
