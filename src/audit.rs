//! Structured audit trail for material coordinator actions.
//!
//! Each event is a typed [`AuditAction`] rather than a free-form action
//! name plus JSON blob, so a sink (or a downstream log consumer) can match
//! on the variant instead of parsing a string. Format: one JSON line per
//! event, tagged by action. Sink: stdout or pluggable (e.g. test mock).

use crate::types::Role;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Every action this crate's coordinator/registry audits, with the fields
/// specific to that action carried on the variant instead of a generic
/// resource blob.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AuditAction {
    CreateGame { game_id: String },
    AssignRole { role: Role },
    StartGame,
    SubmitDecision { role: Role, quantity: u32 },
    Tick { week: u32 },
    SetAutoplay { enabled: bool, auto_advance: bool, interval_ms: u64 },
    Halt { week: u32, reason: String },
}

/// Result of the audited action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Rejected,
    Halted,
}

/// Single audit record: one line of JSON per event.
#[derive(Clone, Debug, Serialize)]
pub struct AuditEvent {
    /// Unix timestamp (seconds since epoch). Log aggregators can convert to ISO8601.
    pub timestamp_secs: u64,
    /// Who performed the action (e.g. player id, "scheduler", "system").
    pub actor: String,
    #[serde(flatten)]
    pub action: AuditAction,
    pub outcome: Outcome,
}

impl AuditEvent {
    pub fn now(actor: impl Into<String>, action: AuditAction, outcome: Outcome) -> Self {
        let timestamp_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self { timestamp_secs, actor: actor.into(), action, outcome }
    }
}

/// Sink for audit events. Implementations write to stdout, file, or in-memory (tests).
pub trait AuditSink: Send + Sync {
    fn emit(&self, event: &AuditEvent);
}

/// Writes one JSON line per event to stdout. Safe to use from multiple threads.
pub struct StdoutAuditSink;

impl AuditSink for StdoutAuditSink {
    fn emit(&self, event: &AuditEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{}", line);
        }
    }
}

/// In-memory sink that stores events for tests. Clone shares the same backing buffer.
#[derive(Clone)]
pub struct InMemoryAuditSink {
    events: std::sync::Arc<std::sync::Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self { events: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())) }
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("lock").clone()
    }

    pub fn clear(&self) {
        self.events.lock().expect("lock").clear();
    }
}

impl Default for InMemoryAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn emit(&self, event: &AuditEvent) {
        self.events.lock().expect("lock").push(event.clone());
    }
}
