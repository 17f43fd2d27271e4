//! Order entity and lifecycle.
//!
//! Created by a submission, enters the recipient's `orderPipeline`, advances
//! one offset per tick, and is recorded `incomingOrder` when it reaches the
//! head. Once shipped, an equal-quantity entry is injected into the
//! downstream role's `shipmentPipeline`.

use crate::types::{OrderStatus, Party, Role};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub sender: Role,
    pub recipient: Party,
    pub quantity: u32,
    pub placed_week: u32,
    pub scheduled_arrival_week: u32,
    pub status: OrderStatus,
}

impl Order {
    pub fn new(
        order_id: OrderId,
        sender: Role,
        recipient: Party,
        quantity: u32,
        placed_week: u32,
        delay: u8,
    ) -> Self {
        // Arrival law: delay 0 behaves like delay 1.
        let scheduled_arrival_week = placed_week + (delay as u32).max(1);
        Self {
            order_id,
            sender,
            recipient,
            quantity,
            placed_week,
            scheduled_arrival_week,
            status: OrderStatus::Pending,
        }
    }
}

/// Monotone per-game order id allocator.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct OrderIdAllocator {
    next: u64,
}

impl OrderIdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> OrderId {
        let id = OrderId(self.next);
        self.next += 1;
        id
    }
}
