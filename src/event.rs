//! Domain events emitted by the tick engine, consumed by observers.
//!
//! Events for a single tick form a totally-ordered batch; batches are
//! emitted in week order. `Event` derives `Serialize`/`PartialEq` so
//! replayed/duplicated event streams can be compared byte-for-byte
//! for determinism checks.

use crate::order::{Order, OrderId};
use crate::types::Role;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    GameStarted,
    WeekAdvanced { week: u32 },
    OrderPlaced { order: Order },
    OrderShipped { order_id: OrderId, from_role: Role, to_role: Role, quantity: u32, week: u32 },
    OrderDelivered { order_id: OrderId, to_role: Role, week: u32 },
    InventoryUpdated { role: Role, week: u32, inventory: u32, backlog: u32 },
    CostIncurred { role: Role, week: u32, holding: Decimal, backlog: Decimal },
    GameCompleted { week: u32 },
}
