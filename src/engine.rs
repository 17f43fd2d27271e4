//! The tick engine — the heart of this crate.
//!
//! [`tick`] is a pure function: a `&GameState` in, a new `GameState` and its
//! `Vec<Event>` out. It never mutates its input. On any failure the caller's
//! state is untouched — `tick` only ever clones, mutates the clone through
//! the seven phases, and returns the clone on success.

use crate::config::GameConfig;
use crate::demand::DemandGenerator;
use crate::error::GameError;
use crate::event::Event;
use crate::order::{Order, OrderIdAllocator};
use crate::pipeline::Pipeline;
use crate::stage::StageState;
use crate::types::{GameStatus, Party, Role};
use std::collections::HashMap;

/// Live state of one game. Owned exclusively by its coordinator; `tick`
/// never aliases it, only clones.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GameState {
    pub game_id: String,
    pub config: GameConfig,
    pub current_week: u32,
    pub status: GameStatus,
    pub stages: HashMap<Role, StageState>,
    pub demand: DemandGenerator,
    /// In-flight submissions for `current_week`. Cleared on every commit.
    pub decision_ledger: HashMap<Role, u32>,
    pub order_alloc: OrderIdAllocator,
    /// Orders in flight through each role's `orderPipeline`, keyed by the
    /// recipient role, for `OrderPlaced`/`OrderDelivered` lifecycle tracking.
    pub pending_order_arrivals: HashMap<Role, Vec<Order>>,
    /// Shipments in flight through each role's `shipmentPipeline`, keyed by
    /// the recipient role, for `OrderShipped`/`OrderDelivered` lifecycle tracking.
    pub pending_shipment_arrivals: HashMap<Role, Vec<Order>>,
    /// Per-week "orders received" series per role, used by the base-stock
    /// agent's visibility modes. Index `w` holds week `w`'s value.
    pub order_history: HashMap<Role, Vec<u32>>,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        let mut stages = HashMap::new();
        let mut order_history = HashMap::new();
        for role in Role::ALL {
            stages.insert(role, StageState::new(config.initial_inventory, config.order_delay, config.shipping_delay));
            order_history.insert(role, Vec::new());
        }
        let demand = DemandGenerator::new(config.game_id.clone(), config.demand_pattern, config.demand_seed);
        Self {
            game_id: config.game_id.clone(),
            config,
            current_week: 0,
            status: GameStatus::Setup,
            stages,
            demand,
            decision_ledger: HashMap::new(),
            order_alloc: OrderIdAllocator::new(),
            pending_order_arrivals: Role::ALL.iter().map(|r| (*r, Vec::new())).collect(),
            pending_shipment_arrivals: Role::ALL.iter().map(|r| (*r, Vec::new())).collect(),
            order_history,
        }
    }

    pub fn decisions_complete(&self) -> bool {
        Role::ALL.iter().all(|r| self.decision_ledger.contains_key(r))
    }

    pub fn stage(&self, role: Role) -> &StageState {
        self.stages.get(&role).expect("every role has a stage")
    }

    fn stage_mut(&mut self, role: Role) -> &mut StageState {
        self.stages.get_mut(&role).expect("every role has a stage")
    }
}

fn checked_add_u32(a: u32, b: u32, what: &str) -> Result<u32, GameError> {
    a.checked_add(b).ok_or_else(|| GameError::InvariantViolated(format!("{} overflow: {} + {}", what, a, b)))
}

/// Runs one tick, advancing `state.current_week` to `current_week + 1`.
///
/// Precondition: `status == Active`; every role has a decision in
/// `decision_ledger` for `current_week`. On any violated precondition or
/// detected impossible state, returns `Err` and leaves `state` untouched.
pub fn tick(state: &GameState) -> Result<(GameState, Vec<Event>), GameError> {
    if state.status != GameStatus::Active {
        return Err(GameError::InvalidState(format!("tick requires Active status, got {:?}", state.status)));
    }
    if !state.decisions_complete() {
        return Err(GameError::DecisionsPending);
    }

    let mut s = state.clone();
    let mut events = Vec::new();
    let w = s.current_week;

    phase1_deliveries(&mut s, w, &mut events)?;
    phase2_customer_demand(&mut s, w, &mut events)?;
    let mut total_due = phase3_order_arrivals(&mut s, w, &mut events)?;
    phase4_outbound_shipment(&mut s, w, &mut total_due, &mut events)?;
    phase4b_factory_production(&mut s, w, &mut total_due, &mut events)?;
    phase5_new_outbound_orders(&mut s, w, &mut events)?;
    phase6_cost_accrual(&mut s, w, &mut events)?;
    phase7_commit(&mut s, &mut events)?;

    Ok((s, events))
}

fn phase1_deliveries(s: &mut GameState, w: u32, events: &mut Vec<Event>) -> Result<(), GameError> {
    for role in Role::ALL {
        let delivered = s.stage_mut(role).shipment_pipeline.advance();
        if delivered > 0 {
            let stage = s.stage_mut(role);
            stage.inventory = checked_add_u32(stage.inventory, delivered, "inventory")?;
            if stage.backlog > 0 && stage.inventory > 0 {
                let consumed = stage.inventory.min(stage.backlog);
                stage.backlog -= consumed;
                stage.inventory -= consumed;
            }
        }
        let arrivals = s.pending_shipment_arrivals.get_mut(&role).expect("role present");
        let (arrived, remaining): (Vec<Order>, Vec<Order>) =
            arrivals.drain(..).partition(|o| o.scheduled_arrival_week == w);
        *arrivals = remaining;
        for order in arrived {
            events.push(Event::OrderDelivered { order_id: order.order_id, to_role: role, week: w });
        }
        events.push(Event::InventoryUpdated { role, week: w, inventory: s.stage(role).inventory, backlog: s.stage(role).backlog });
    }
    Ok(())
}

fn phase2_customer_demand(s: &mut GameState, w: u32, events: &mut Vec<Event>) -> Result<(), GameError> {
    let d = s.demand.demand_at(w);
    let stage = s.stage_mut(Role::Retailer);
    let total_due = checked_add_u32(stage.backlog, d, "retailer totalDue")?;
    let served = stage.inventory.min(total_due);
    stage.inventory -= served;
    stage.backlog = total_due - served;
    stage.incoming_orders = stage
        .incoming_orders
        .checked_add(d as u64)
        .ok_or_else(|| GameError::InvariantViolated("retailer incomingOrders overflow".into()))?;
    s.order_history.get_mut(&Role::Retailer).expect("role present").push(d);
    events.push(Event::InventoryUpdated {
        role: Role::Retailer,
        week: w,
        inventory: s.stage(Role::Retailer).inventory,
        backlog: s.stage(Role::Retailer).backlog,
    });
    Ok(())
}

/// Returns each upstream role's `totalDue` (backlog + arrived) for Phase 4/4b to consume.
fn phase3_order_arrivals(s: &mut GameState, w: u32, events: &mut Vec<Event>) -> Result<HashMap<Role, u32>, GameError> {
    let mut total_due = HashMap::new();
    for role in [Role::Wholesaler, Role::Distributor, Role::Factory] {
        let arrived = s.stage_mut(role).order_pipeline.advance();
        let stage = s.stage_mut(role);
        stage.incoming_orders = stage
            .incoming_orders
            .checked_add(arrived as u64)
            .ok_or_else(|| GameError::InvariantViolated(format!("{:?} incomingOrders overflow", role)))?;
        let due = checked_add_u32(stage.backlog, arrived, "totalDue")?;
        total_due.insert(role, due);
        s.order_history.get_mut(&role).expect("role present").push(arrived);

        let arrivals = s.pending_order_arrivals.get_mut(&role).expect("role present");
        let (arrived_orders, remaining): (Vec<Order>, Vec<Order>) =
            arrivals.drain(..).partition(|o| o.scheduled_arrival_week == w);
        *arrivals = remaining;
        for order in arrived_orders {
            events.push(Event::OrderDelivered { order_id: order.order_id, to_role: role, week: w });
        }
    }
    Ok(total_due)
}

fn phase4_outbound_shipment(
    s: &mut GameState,
    w: u32,
    total_due: &mut HashMap<Role, u32>,
    events: &mut Vec<Event>,
) -> Result<(), GameError> {
    for role in [Role::Wholesaler, Role::Distributor] {
        let downstream = role.downstream().expect("Wholesaler/Distributor have a downstream role");
        let due = *total_due.get(&role).expect("phase 3 populated totalDue");
        let stage = s.stage_mut(role);
        let ship = stage.inventory.min(due);
        stage.inventory -= ship;
        stage.backlog = due - ship;
        if ship > 0 {
            let order_id = s.order_alloc.next_id();
            let shipment = Order::new(order_id, role, Party::Role(downstream), ship, w, s.config.shipping_delay);
            let offset = Pipeline::injection_offset(s.config.shipping_delay);
            s.stage_mut(downstream).shipment_pipeline.inject(offset, ship)?;
            s.pending_shipment_arrivals.get_mut(&downstream).expect("role present").push(shipment);
            events.push(Event::OrderShipped { order_id, from_role: role, to_role: downstream, quantity: ship, week: w });
        }
    }
    Ok(())
}

fn phase4b_factory_production(
    s: &mut GameState,
    w: u32,
    total_due: &mut HashMap<Role, u32>,
    events: &mut Vec<Event>,
) -> Result<(), GameError> {
    let due = *total_due.get(&Role::Factory).expect("phase 3 populated totalDue");
    let produced = due;
    {
        let stage = s.stage_mut(Role::Factory);
        // Just-in-time production: producing and immediately shipping `produced`
        // cancel out, leaving inventory as it was before production.
        let _ = checked_add_u32(stage.inventory, produced, "factory inventory")?;
        stage.backlog = 0;
    }
    if produced > 0 {
        let order_id = s.order_alloc.next_id();
        let shipment = Order::new(order_id, Role::Factory, Party::Role(Role::Distributor), produced, w, s.config.shipping_delay);
        let offset = Pipeline::injection_offset(s.config.shipping_delay);
        s.stage_mut(Role::Distributor).shipment_pipeline.inject(offset, produced)?;
        s.pending_shipment_arrivals.get_mut(&Role::Distributor).expect("role present").push(shipment);
        events.push(Event::OrderShipped { order_id, from_role: Role::Factory, to_role: Role::Distributor, quantity: produced, week: w });
    }
    Ok(())
}

fn phase5_new_outbound_orders(s: &mut GameState, w: u32, events: &mut Vec<Event>) -> Result<(), GameError> {
    for role in Role::ALL {
        let qty = *s.decision_ledger.get(&role).expect("precondition checked decisions_complete");
        {
            let stage = s.stage_mut(role);
            stage.outgoing_orders = stage
                .outgoing_orders
                .checked_add(qty as u64)
                .ok_or_else(|| GameError::InvariantViolated(format!("{:?} outgoingOrders overflow", role)))?;
        }
        if role == Role::Factory || qty == 0 {
            continue;
        }
        let upstream = role.upstream().expect("Retailer/Wholesaler/Distributor have an upstream role");
        let order_id = s.order_alloc.next_id();
        let order = Order::new(order_id, role, Party::Role(upstream), qty, w, s.config.order_delay);
        let offset = Pipeline::injection_offset(s.config.order_delay);
        s.stage_mut(upstream).order_pipeline.inject(offset, qty)?;
        s.pending_order_arrivals.get_mut(&upstream).expect("role present").push(order.clone());
        events.push(Event::OrderPlaced { order });
    }
    Ok(())
}

fn phase6_cost_accrual(s: &mut GameState, w: u32, events: &mut Vec<Event>) -> Result<(), GameError> {
    let holding_rate = s.config.holding_cost_per_unit;
    let backlog_rate = s.config.backlog_cost_per_unit;
    for role in Role::ALL {
        let stage = s.stage_mut(role);
        let holding = stage.apply_holding(holding_rate);
        let backlog = stage.apply_backlog(backlog_rate);
        events.push(Event::CostIncurred { role, week: w, holding, backlog });
    }
    Ok(())
}

fn phase7_commit(s: &mut GameState, events: &mut Vec<Event>) -> Result<(), GameError> {
    s.current_week = s.current_week.checked_add(1).ok_or_else(|| GameError::InvariantViolated("week overflow".into()))?;
    s.decision_ledger.clear();
    events.push(Event::WeekAdvanced { week: s.current_week });
    if s.current_week >= s.config.max_weeks {
        s.status = GameStatus::Completed;
        events.push(Event::GameCompleted { week: s.current_week });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::types::DemandPattern;

    fn base_config(order_delay: u8, shipping_delay: u8, initial_inventory: u32, pattern: DemandPattern) -> GameConfig {
        let defaults = EngineConfig::default();
        GameConfig::new("g1".into(), order_delay, shipping_delay, pattern, initial_inventory, Some(1), &defaults).unwrap()
    }

    fn submit_all(state: &mut GameState, qty: u32) {
        for role in Role::ALL {
            state.decision_ledger.insert(role, qty);
        }
    }

    fn activate(mut state: GameState) -> GameState {
        state.status = GameStatus::Active;
        state
    }

    #[test]
    fn tick_rejects_when_not_active() {
        let state = GameState::new(base_config(1, 1, 12, DemandPattern::Constant));
        let err = tick(&state).unwrap_err();
        assert_eq!(err, GameError::InvalidState("tick requires Active status, got Setup".into()));
    }

    #[test]
    fn tick_rejects_when_decisions_pending() {
        let state = activate(GameState::new(base_config(1, 1, 12, DemandPattern::Constant)));
        let err = tick(&state).unwrap_err();
        assert_eq!(err, GameError::DecisionsPending);
    }

    #[test]
    fn tick_does_not_mutate_input_on_failure() {
        let state = GameState::new(base_config(1, 1, 12, DemandPattern::Constant));
        let before = state.current_week;
        let _ = tick(&state);
        assert_eq!(state.current_week, before);
    }

    /// S1 — Steady state: once every pipeline has filled, a constant order
    /// equal to constant demand leaves inventory and backlog unchanged week
    /// over week, and backlog never accrues (supply always covers demand).
    #[test]
    fn scenario_steady_state() {
        let mut state = activate(GameState::new(base_config(1, 1, 12, DemandPattern::Constant)));
        let mut previous: Option<HashMap<Role, (u32, u32)>> = None;
        for week in 0..10 {
            submit_all(&mut state, 4);
            let (next, _events) = tick(&state).unwrap();
            state = next;
            for role in Role::ALL {
                assert_eq!(state.stage(role).backlog, 0, "{:?} at week {}", role, week);
            }
            let snapshot: HashMap<Role, (u32, u32)> =
                Role::ALL.iter().map(|r| (*r, (state.stage(*r).inventory, state.stage(*r).backlog))).collect();
            if let Some(prev) = &previous {
                if prev == &snapshot {
                    return; // reached a fixed point before exhausting the loop
                }
            }
            previous = Some(snapshot);
        }
        panic!("steady state was not reached within 10 weeks");
    }

    /// Arrival-law equivalence: a declared delay of 0 behaves exactly
    /// like a declared delay of 1 — both take exactly one tick of latency,
    /// never the same tick.
    #[test]
    fn zero_delay_behaves_like_delay_one() {
        let mut zero = activate(GameState::new(base_config(0, 0, 12, DemandPattern::Constant)));
        let mut one = activate(GameState::new(base_config(1, 1, 12, DemandPattern::Constant)));
        for _ in 0..5 {
            submit_all(&mut zero, 4);
            submit_all(&mut one, 4);
            let (next_zero, _) = tick(&zero).unwrap();
            let (next_one, _) = tick(&one).unwrap();
            zero = next_zero;
            one = next_one;
            for role in Role::ALL {
                assert_eq!(zero.stage(role).inventory, one.stage(role).inventory, "{:?}", role);
                assert_eq!(zero.stage(role).backlog, one.stage(role).backlog, "{:?}", role);
            }
        }
    }

    /// S4 — Backlog accrual: zero orders into an empty retailer accrues
    /// backlog cost every week demand goes unmet, growing by one week's
    /// demand each tick. After weeks 0-3 (4 ticks), backlog = 4×4 = 16 and
    /// totalBacklogCost = 2×(4+8+12+16) = 80.
    #[test]
    fn scenario_backlog_accrual() {
        let mut state = activate(GameState::new(base_config(1, 1, 0, DemandPattern::Constant)));
        for _ in 0..4 {
            submit_all(&mut state, 0);
            let (next, _events) = tick(&state).unwrap();
            state = next;
        }
        let retailer = state.stage(Role::Retailer);
        assert_eq!(retailer.backlog, 16);
        assert_eq!(retailer.total_backlog_cost, rust_decimal::Decimal::from(80));
    }

    #[test]
    fn tick_completes_game_at_max_weeks() {
        let mut cfg = base_config(0, 0, 12, DemandPattern::Constant);
        cfg.max_weeks = 1;
        let mut state = activate(GameState::new(cfg));
        submit_all(&mut state, 4);
        let (next, events) = tick(&state).unwrap();
        assert_eq!(next.status, GameStatus::Completed);
        assert!(events.iter().any(|e| matches!(e, Event::GameCompleted { week: 1 })));
    }

    #[test]
    fn inventory_backlog_exclusive_after_every_tick() {
        let mut state = activate(GameState::new(base_config(1, 1, 12, DemandPattern::Step)));
        for _ in 0..12 {
            submit_all(&mut state, 4);
            let (next, _events) = tick(&state).unwrap();
            state = next;
            for role in Role::ALL {
                assert!(state.stage(role).inventory_backlog_exclusive(), "{:?} at week {}", role, state.current_week);
            }
        }
    }

    #[test]
    fn order_pipeline_arrival_law_delay_two() {
        // orderDelay = 2: a Retailer order placed at week w should not be
        // reflected in Wholesaler's incomingOrders until week w + 2.
        let mut state = activate(GameState::new(base_config(2, 1, 50, DemandPattern::Constant)));
        submit_all(&mut state, 7);
        let (s1, _) = tick(&state).unwrap();
        let before = s1.stage(Role::Wholesaler).incoming_orders;

        let mut s2 = s1.clone();
        submit_all(&mut s2, 0);
        let (s2, _) = tick(&s2).unwrap();
        assert_eq!(s2.stage(Role::Wholesaler).incoming_orders, before, "not yet at w+1");

        let mut s3 = s2.clone();
        submit_all(&mut s3, 0);
        let (s3, _) = tick(&s3).unwrap();
        assert_eq!(s3.stage(Role::Wholesaler).incoming_orders, before + 7, "arrives at w+2");
    }
}
