//! Core identifiers and enumerations (charter data models).
//!
//! [`Role`] fixes the chain order. IDs are newtype wrappers around their
//! primitive representation rather than bare integers.

use serde::{Deserialize, Serialize};

/// One of the four serial positions in the supply chain.
///
/// Chain order is fixed: Retailer is most downstream, Factory most upstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Retailer,
    Wholesaler,
    Distributor,
    Factory,
}

impl Role {
    /// Fixed iteration order used throughout the engine: Retailer, Wholesaler,
    /// Distributor, Factory. Phases that iterate "in role order" use this.
    pub const ALL: [Role; 4] = [Role::Retailer, Role::Wholesaler, Role::Distributor, Role::Factory];

    /// The role immediately upstream (closer to Factory), if any.
    pub fn upstream(self) -> Option<Role> {
        match self {
            Role::Retailer => Some(Role::Wholesaler),
            Role::Wholesaler => Some(Role::Distributor),
            Role::Distributor => Some(Role::Factory),
            Role::Factory => None,
        }
    }

    /// The role immediately downstream (closer to Retailer), if any.
    pub fn downstream(self) -> Option<Role> {
        match self {
            Role::Retailer => None,
            Role::Wholesaler => Some(Role::Retailer),
            Role::Distributor => Some(Role::Wholesaler),
            Role::Factory => Some(Role::Distributor),
        }
    }

    /// All roles strictly downstream of this one, nearest first.
    pub fn all_downstream(self) -> Vec<Role> {
        let mut out = Vec::new();
        let mut cur = self.downstream();
        while let Some(r) = cur {
            out.push(r);
            cur = r.downstream();
        }
        out
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Retailer => "retailer",
            Role::Wholesaler => "wholesaler",
            Role::Distributor => "distributor",
            Role::Factory => "factory",
        }
    }
}

/// Exogenous customer demand pattern used to pre-materialise the demand series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandPattern {
    /// 4 units every week.
    Constant,
    /// 4 units for week < 4, 8 units thereafter.
    Step,
    /// Deterministic pseudo-random values in [2, 6], stable across platforms.
    Random,
}

/// Scope of downstream demand history a base-stock agent may observe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisibilityMode {
    /// Orders received directly by this role only.
    Traditional,
    /// Orders received at this role and every role downstream of it.
    Transparent,
}

/// Lifecycle status of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Setup,
    Active,
    Completed,
    /// Terminal, distinct from Completed: a tick detected impossible state.
    Halted,
}

/// Lifecycle status of a single order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

/// Sender/recipient of an order: one of the four roles, or the exogenous customer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Party {
    Role(Role),
    Customer,
}
