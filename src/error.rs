//! Typed, kind-distinguishable errors returned by the core.
//!
//! No nesting, no inheritance. Collaborators map each variant to a transport
//! code; `InvariantViolated` additionally marks the game `Halted`.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("game {0} not found")]
    NotFound(String),

    #[error("operation illegal for current game state: {0}")]
    InvalidState(String),

    #[error("caller is not authorized for this action")]
    Unauthorized,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("tick attempted before every role submitted a decision")]
    DecisionsPending,

    #[error("role already submitted a decision for this week")]
    AlreadySubmitted,

    #[error("game is finalised and accepts no further mutations")]
    GameFinalised,

    #[error("invariant violated, game halted: {0}")]
    InvariantViolated(String),
}

pub type GameResult<T> = Result<T, GameError>;
