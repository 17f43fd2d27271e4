//! Game registry: maps `gameId` to a running coordinator and exposes the
//! operations external callers use.
//!
//! One entry per independent unit of state, looked up by key, with no
//! global lock across games. Each entry's internal serialization is the
//! coordinator actor itself, so looking a game up never contends with
//! mutating a different game.

use crate::audit::{AuditAction, AuditEvent, AuditSink, Outcome};
use crate::config::GameConfig;
use crate::coordinator::{AutoplaySettings, GameCoordinatorHandle};
use crate::engine::GameState;
use crate::error::{GameError, GameResult};
use crate::event::Event;
use crate::persistence::EffectSink;
use crate::types::Role;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Shared, cloneable registry of every live game on this process.
#[derive(Clone)]
pub struct GameRegistry {
    games: Arc<DashMap<String, GameCoordinatorHandle>>,
    audit: Arc<dyn AuditSink>,
    effect: Option<Arc<dyn EffectSink>>,
}

impl GameRegistry {
    pub fn new(audit: Arc<dyn AuditSink>, effect: Option<Arc<dyn EffectSink>>) -> Self {
        Self { games: Arc::new(DashMap::new()), audit, effect }
    }

    fn handle(&self, game_id: &str) -> GameResult<GameCoordinatorHandle> {
        self.games
            .get(game_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| GameError::NotFound(game_id.to_string()))
    }

    /// Creates a game and spawns its coordinator. Idempotent under a
    /// duplicate `gameId`: returns the existing coordinator rather than
    /// overwriting it, so a retried create can never orphan a game in
    /// progress.
    pub fn create_game(&self, config: GameConfig, creator_id: String) -> String {
        let game_id = config.game_id.clone();
        let entry = self.games.entry(game_id.clone());
        if matches!(entry, dashmap::mapref::entry::Entry::Vacant(_)) {
            self.audit.emit(&AuditEvent::now(
                creator_id.clone(),
                AuditAction::CreateGame { game_id: game_id.clone() },
                Outcome::Success,
            ));
        }
        entry.or_insert_with(|| {
            GameCoordinatorHandle::spawn(config, creator_id, self.audit.clone(), self.effect.clone())
        });
        game_id
    }

    pub async fn assign_role(&self, game_id: &str, role: Role, participant_id: String, is_agent: bool) -> GameResult<()> {
        self.handle(game_id)?.assign_role(role, participant_id, is_agent).await
    }

    pub async fn start(&self, game_id: &str, caller_id: String) -> GameResult<()> {
        self.handle(game_id)?.start(caller_id).await
    }

    pub async fn submit_order(&self, game_id: &str, role: Role, quantity: u32, caller_id: String) -> GameResult<()> {
        self.handle(game_id)?.submit(role, quantity, caller_id).await
    }

    pub async fn request_agent_decisions(&self, game_id: &str) -> GameResult<()> {
        self.handle(game_id)?.request_agent_decisions().await
    }

    /// Caller must be the game's creator; fails with `Unauthorized` otherwise,
    /// or `DecisionsPending` unless every role has submitted for the current
    /// week.
    pub async fn advance_week(&self, game_id: &str, caller_id: String) -> GameResult<()> {
        self.handle(game_id)?.advance_week(caller_id).await
    }

    pub async fn set_autoplay(&self, game_id: &str, settings: AutoplaySettings) -> GameResult<()> {
        self.handle(game_id)?.set_autoplay(settings).await
    }

    pub async fn snapshot_game(&self, game_id: &str) -> GameResult<GameState> {
        Ok(self.handle(game_id)?.snapshot().await)
    }

    pub async fn subscribe(&self, game_id: &str) -> GameResult<broadcast::Receiver<Event>> {
        Ok(self.handle(game_id)?.subscribe().await)
    }
}
