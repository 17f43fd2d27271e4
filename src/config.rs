//! Game and engine configuration.
//!
//! `GameConfig` is immutable once a game is created. `EngineConfig` carries
//! process-wide defaults a `GameConfig` falls back to, mirroring the
//! field-by-field `Default` shape of a synthetic-data generator's config.

use crate::error::GameError;
use crate::types::{DemandPattern, Role, VisibilityMode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Process-wide defaults recognised by the core.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_weeks: u32,
    pub holding_cost_per_unit: Decimal,
    pub backlog_cost_per_unit: Decimal,
    pub autoplay_default_interval_ms: u64,
    pub agent_default_forecast_horizon: u8,
    pub agent_default_safety_factor: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_weeks: 36,
            holding_cost_per_unit: Decimal::new(1, 0),
            backlog_cost_per_unit: Decimal::new(2, 0),
            autoplay_default_interval_ms: 5000,
            agent_default_forecast_horizon: 4,
            agent_default_safety_factor: 0.5,
        }
    }
}

/// Per-role agent configuration declared in `GameConfig.agents`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentConfig {
    pub is_agent: bool,
    pub forecast_horizon: u8,
    pub safety_factor: f64,
    pub visibility_mode: VisibilityMode,
}

impl AgentConfig {
    pub fn human(defaults: &EngineConfig) -> Self {
        Self {
            is_agent: false,
            forecast_horizon: defaults.agent_default_forecast_horizon,
            safety_factor: defaults.agent_default_safety_factor,
            visibility_mode: VisibilityMode::Traditional,
        }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if !(1..=12).contains(&self.forecast_horizon) {
            return Err(GameError::InvalidArgument(format!(
                "forecastHorizon {} out of [1,12]",
                self.forecast_horizon
            )));
        }
        if !(0.0..=2.0).contains(&self.safety_factor) {
            return Err(GameError::InvalidArgument(format!(
                "safetyFactor {} out of [0,2]",
                self.safety_factor
            )));
        }
        Ok(())
    }
}

/// Immutable-after-creation configuration for one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    pub game_id: String,
    pub order_delay: u8,
    pub shipping_delay: u8,
    pub demand_pattern: DemandPattern,
    pub initial_inventory: u32,
    pub holding_cost_per_unit: Decimal,
    pub backlog_cost_per_unit: Decimal,
    pub demand_seed: Option<u64>,
    pub agents: HashMap<Role, AgentConfig>,
    pub max_weeks: u32,
}

impl GameConfig {
    /// Builds a config from user-supplied fields, filling cost/role defaults
    /// from `engine_defaults` and validating ranges.
    pub fn new(
        game_id: String,
        order_delay: u8,
        shipping_delay: u8,
        demand_pattern: DemandPattern,
        initial_inventory: u32,
        demand_seed: Option<u64>,
        engine_defaults: &EngineConfig,
    ) -> Result<Self, GameError> {
        if order_delay > 8 {
            return Err(GameError::InvalidArgument(format!("orderDelay {} out of [0,8]", order_delay)));
        }
        if shipping_delay > 8 {
            return Err(GameError::InvalidArgument(format!("shippingDelay {} out of [0,8]", shipping_delay)));
        }
        let mut agents = HashMap::new();
        for role in Role::ALL {
            agents.insert(role, AgentConfig::human(engine_defaults));
        }
        Ok(Self {
            game_id,
            order_delay,
            shipping_delay,
            demand_pattern,
            initial_inventory,
            holding_cost_per_unit: engine_defaults.holding_cost_per_unit,
            backlog_cost_per_unit: engine_defaults.backlog_cost_per_unit,
            demand_seed,
            agents,
            max_weeks: engine_defaults.max_weeks,
        })
    }

    pub fn agent_for(&self, role: Role) -> Option<&AgentConfig> {
        self.agents.get(&role)
    }

    pub fn set_agent(&mut self, role: Role, config: AgentConfig) -> Result<(), GameError> {
        config.validate()?;
        self.agents.insert(role, config);
        Ok(())
    }

    /// A game may `Start` once every role has an agent config entry (human or AI);
    /// `GameConfig::new` pre-populates all four as human so this is always true
    /// unless a caller has tampered with `agents` directly.
    pub fn all_roles_assigned(&self) -> bool {
        Role::ALL.iter().all(|r| self.agents.contains_key(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_out_of_range_delays() {
        let defaults = EngineConfig::default();
        let err = GameConfig::new(
            "g1".into(),
            9,
            1,
            DemandPattern::Constant,
            12,
            None,
            &defaults,
        )
        .unwrap_err();
        assert_eq!(err, GameError::InvalidArgument("orderDelay 9 out of [0,8]".into()));
    }

    #[test]
    fn new_fills_defaults_for_all_roles() {
        let defaults = EngineConfig::default();
        let cfg = GameConfig::new("g1".into(), 1, 1, DemandPattern::Constant, 12, None, &defaults).unwrap();
        assert!(cfg.all_roles_assigned());
        assert_eq!(cfg.holding_cost_per_unit, defaults.holding_cost_per_unit);
    }

    #[test]
    fn agent_config_validate_rejects_bad_horizon() {
        let defaults = EngineConfig::default();
        let mut a = AgentConfig::human(&defaults);
        a.forecast_horizon = 13;
        assert!(a.validate().is_err());
    }
}
