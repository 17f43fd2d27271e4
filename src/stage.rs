//! Per-role stage state: inventory, backlog, pipelines, running totals.
//!
//! Pure data plus small accumulation helpers. Mutating helpers are only ever
//! called from the tick engine (`engine.rs`); nothing else holds `&mut StageState`.

use crate::pipeline::Pipeline;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StageState {
    pub inventory: u32,
    pub backlog: u32,
    pub order_pipeline: Pipeline,
    pub shipment_pipeline: Pipeline,
    pub incoming_orders: u64,
    pub outgoing_orders: u64,
    pub total_holding_cost: Decimal,
    pub total_backlog_cost: Decimal,
}

impl StageState {
    pub fn new(initial_inventory: u32, order_delay: u8, shipping_delay: u8) -> Self {
        Self {
            inventory: initial_inventory,
            backlog: 0,
            order_pipeline: Pipeline::new(order_delay),
            shipment_pipeline: Pipeline::new(shipping_delay),
            incoming_orders: 0,
            outgoing_orders: 0,
            total_holding_cost: Decimal::ZERO,
            total_backlog_cost: Decimal::ZERO,
        }
    }

    /// Accumulates `inventory × rate` into the running holding-cost total.
    /// Returns the per-week holding cost charged.
    pub fn apply_holding(&mut self, rate: Decimal) -> Decimal {
        let cost = Decimal::from(self.inventory) * rate;
        self.total_holding_cost += cost;
        cost
    }

    /// Accumulates `backlog × rate` into the running backlog-cost total.
    /// Returns the per-week backlog cost charged.
    pub fn apply_backlog(&mut self, rate: Decimal) -> Decimal {
        let cost = Decimal::from(self.backlog) * rate;
        self.total_backlog_cost += cost;
        cost
    }

    /// Cross-invariant: at most one of `inventory`/`backlog` is nonzero.
    pub fn inventory_backlog_exclusive(&self) -> bool {
        self.inventory == 0 || self.backlog == 0
    }
}
