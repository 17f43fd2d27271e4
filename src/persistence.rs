//! Persistence: save and load a game's logical state to a file.
//!
//! Enables recovery after restart: stages, pipelines, decision ledger, and
//! the demand generator's materialised series are restored exactly.

use crate::engine::GameState;
use std::path::Path;

/// Full persisted state: one game's `GameState`, serialized as-is.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PersistedState {
    pub state: GameState,
}

/// File-based persistence: one JSON file per game. Save after each commit;
/// load on startup/reattach.
#[derive(Clone, Debug)]
pub struct FilePersistence {
    path: std::path::PathBuf,
}

impl FilePersistence {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Save state to file. Overwrites existing file.
    pub fn save(&self, state: &PersistedState) -> Result<(), String> {
        let json = serde_json::to_string_pretty(state).map_err(|e| e.to_string())?;
        std::fs::write(&self.path, json).map_err(|e| e.to_string())
    }

    /// Load state from file. Returns `None` if the file does not exist.
    pub fn load(&self) -> Result<Option<PersistedState>, String> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.to_string()),
        };
        let state: PersistedState = serde_json::from_str(&data).map_err(|e| e.to_string())?;
        Ok(Some(state))
    }
}

/// Effect sink invoked exactly once per committed tick, after `tick`
/// returns successfully. Persistence is the built-in implementation;
/// other sinks (webhooks, anchoring) can implement the same trait.
pub trait EffectSink: Send + Sync {
    fn on_committed(&self, state: &GameState);
}

impl EffectSink for FilePersistence {
    fn on_committed(&self, state: &GameState) {
        let persisted = PersistedState { state: state.clone() };
        if let Err(e) = self.save(&persisted) {
            log::warn!("failed to persist game {}: {}", state.game_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, GameConfig};
    use crate::types::DemandPattern;

    fn sample_state() -> GameState {
        let defaults = EngineConfig::default();
        let cfg = GameConfig::new("g1".into(), 1, 1, DemandPattern::Constant, 12, Some(7), &defaults).unwrap();
        GameState::new(cfg)
    }

    #[test]
    fn round_trips_through_a_temp_file() {
        let dir = std::env::temp_dir().join(format!("beer-game-persist-test-{}", std::process::id()));
        let persistence = FilePersistence::new(&dir);
        let state = sample_state();
        persistence.save(&PersistedState { state: state.clone() }).unwrap();
        let loaded = persistence.load().unwrap().expect("file was just written");
        assert_eq!(loaded.state.game_id, state.game_id);
        assert_eq!(loaded.state.current_week, state.current_week);
        let _ = std::fs::remove_file(&dir);
    }

    #[test]
    fn load_missing_file_returns_none() {
        let persistence = FilePersistence::new("/nonexistent/path/that/does/not/exist.json");
        assert!(persistence.load().unwrap().is_none());
    }
}
