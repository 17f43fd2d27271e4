//! Deterministic base-stock ordering policy.
//!
//! Pure function of `GameState`: reads committed history and the current
//! stage, never the role's own in-flight submission. Two roles with the
//! same config and the same observed series always compute the same
//! quantity.

use crate::engine::GameState;
use crate::error::GameError;
use crate::types::{Role, VisibilityMode};

/// Computes the order quantity role `role` would submit for the current
/// week, per its configured visibility mode, forecast horizon, and safety
/// factor. Returns `InvalidArgument` if the role has no agent config.
pub fn decide(state: &GameState, role: Role) -> Result<u32, GameError> {
    let agent_cfg = state
        .config
        .agent_for(role)
        .ok_or_else(|| GameError::InvalidArgument(format!("no agent config for {:?}", role)))?;

    let relevant_roles: Vec<Role> = match agent_cfg.visibility_mode {
        VisibilityMode::Traditional => vec![role],
        VisibilityMode::Transparent => {
            let mut roles = vec![role];
            roles.extend(role.all_downstream());
            roles
        }
    };

    let series = observed_demand_series(state, &relevant_roles);
    let horizon = agent_cfg.forecast_horizon as usize;
    let avg_demand = average_demand(&series, horizon);

    let target_inventory = (avg_demand * horizon as f64 + agent_cfg.safety_factor * avg_demand).round();

    let stage = state.stage(role);
    let incoming_supply = stage.shipment_pipeline.total();
    let raw = target_inventory - stage.inventory as f64 + stage.backlog as f64 - incoming_supply as f64;
    let order_qty = raw.round().max(0.0).min(10_000.0);
    Ok(order_qty as u32)
}

/// Per-week series of orders received at `roles`' combined vantage point,
/// restricted to weeks strictly before the current one.
fn observed_demand_series(state: &GameState, roles: &[Role]) -> Vec<u32> {
    let w = state.current_week as usize;
    (0..w)
        .map(|wk| {
            roles
                .iter()
                .filter_map(|r| state.order_history.get(r).and_then(|h| h.get(wk)))
                .fold(0u32, |acc, &v| acc.saturating_add(v))
        })
        .collect()
}

fn average_demand(series: &[u32], horizon: usize) -> f64 {
    let take = series.len().min(horizon);
    if take == 0 {
        return 4.0;
    }
    let sum: u64 = series[series.len() - take..].iter().map(|&v| v as u64).sum();
    sum as f64 / take as f64
}
