//! # Beer Game Engine
//!
//! Deterministic Beer Distribution Game simulation: a four-stage serial
//! supply chain (Retailer, Wholesaler, Distributor, Factory) advancing one
//! week at a time under a fixed order of operations.
//!
//! ## Entry point
//!
//! [`engine::tick`] is the pure core: `&GameState` in, a new `GameState`
//! plus the week's [`event::Event`]s out. [`coordinator::GameCoordinatorHandle`]
//! wraps one game's state in a single-writer actor; [`registry::GameRegistry`]
//! maps `gameId` to a running coordinator for a whole process. [`agent::decide`]
//! computes the base-stock order quantity an AI-controlled role would submit.
//!
//! ## Example
//!
//! ```rust
//! use beer_game_engine::config::{EngineConfig, GameConfig};
//! use beer_game_engine::engine::{tick, GameState};
//! use beer_game_engine::types::{DemandPattern, GameStatus, Role};
//!
//! let defaults = EngineConfig::default();
//! let config = GameConfig::new("demo".into(), 1, 1, DemandPattern::Constant, 12, Some(1), &defaults).unwrap();
//! let mut state = GameState::new(config);
//! state.status = GameStatus::Active;
//! for role in Role::ALL {
//!     state.decision_ledger.insert(role, 4);
//! }
//! let (next, events) = tick(&state).unwrap();
//! assert_eq!(next.current_week, 1);
//! assert!(!events.is_empty());
//! ```

pub mod agent;
pub mod audit;
pub mod config;
pub mod coordinator;
pub mod demand;
pub mod engine;
pub mod error;
pub mod event;
pub mod order;
pub mod persistence;
pub mod pipeline;
pub mod registry;
pub mod scheduler;
pub mod stage;
pub mod types;

pub use config::{AgentConfig, EngineConfig, GameConfig};
pub use coordinator::{AutoplaySettings, GameCoordinatorHandle};
pub use engine::{tick, GameState};
pub use error::{GameError, GameResult};
pub use event::Event;
pub use registry::GameRegistry;
pub use scheduler::AutoplayTask;
pub use types::{DemandPattern, GameStatus, Party, Role, VisibilityMode};
