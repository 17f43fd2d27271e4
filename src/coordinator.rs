//! Per-game coordinator: a single-writer actor serializing human and agent
//! submissions over one game's `GameState`.
//!
//! One Tokio task per game, driven by an `mpsc` command queue with
//! `oneshot`-acknowledged replies. The task owns the only mutable
//! `GameState`, so the single-writer guarantee falls out structurally —
//! there is never a lock to contend for. Events fan out to subscribers via
//! `tokio::sync::broadcast`.

use crate::agent;
use crate::audit::{AuditAction, AuditEvent, AuditSink, Outcome};
use crate::config::GameConfig;
use crate::engine::{self, GameState};
use crate::error::{GameError, GameResult};
use crate::event::Event;
use crate::persistence::EffectSink;
use crate::types::{GameStatus, Role};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};

const EVENT_CHANNEL_CAPACITY: usize = 256;
const COMMAND_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Debug)]
struct Assignment {
    participant_id: String,
    is_agent: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AutoplaySettings {
    pub enabled: bool,
    pub auto_advance: bool,
    pub interval_ms: u64,
}

enum Command {
    AssignRole { role: Role, participant_id: String, is_agent: bool, reply: oneshot::Sender<GameResult<()>> },
    Start { caller_id: String, reply: oneshot::Sender<GameResult<()>> },
    Submit { role: Role, quantity: u32, caller_id: String, reply: oneshot::Sender<GameResult<()>> },
    RequestAgentDecisions { reply: oneshot::Sender<GameResult<()>> },
    Tick { reply: oneshot::Sender<GameResult<()>> },
    AdvanceWeek { caller_id: String, reply: oneshot::Sender<GameResult<()>> },
    SetAutoplay { settings: AutoplaySettings, reply: oneshot::Sender<GameResult<()>> },
    Snapshot { reply: oneshot::Sender<GameState> },
    Subscribe { reply: oneshot::Sender<broadcast::Receiver<Event>> },
}

/// Cheaply-clonable handle to a running coordinator task. Every method sends
/// a command and awaits its reply; the actor itself never aliases state
/// across calls.
#[derive(Clone)]
pub struct GameCoordinatorHandle {
    tx: mpsc::Sender<Command>,
}

impl GameCoordinatorHandle {
    /// Spawns the coordinator task and returns a handle to it. `creator_id`
    /// is the only caller allowed to `Start`/`AdvanceWeek` directly.
    pub fn spawn(
        config: GameConfig,
        creator_id: String,
        audit: Arc<dyn AuditSink>,
        effect: Option<Arc<dyn EffectSink>>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let actor = CoordinatorActor {
            state: GameState::new(config),
            creator_id,
            assignments: HashMap::new(),
            autoplay: AutoplaySettings::default(),
            event_tx,
            audit,
            effect,
        };
        tokio::spawn(actor.run(rx));
        Self { tx }
    }

    pub async fn assign_role(&self, role: Role, participant_id: String, is_agent: bool) -> GameResult<()> {
        self.call(|reply| Command::AssignRole { role, participant_id, is_agent, reply }).await
    }

    pub async fn start(&self, caller_id: String) -> GameResult<()> {
        self.call(|reply| Command::Start { caller_id, reply }).await
    }

    pub async fn submit(&self, role: Role, quantity: u32, caller_id: String) -> GameResult<()> {
        self.call(|reply| Command::Submit { role, quantity, caller_id, reply }).await
    }

    pub async fn request_agent_decisions(&self) -> GameResult<()> {
        self.call(|reply| Command::RequestAgentDecisions { reply }).await
    }

    /// System-triggered tick with no caller check, for the scheduler's
    /// autoplay loop and the coordinator's own post-submit auto-advance.
    pub async fn tick(&self) -> GameResult<()> {
        self.call(|reply| Command::Tick { reply }).await
    }

    /// Human-facing `AdvanceWeek`: only the game's creator may call this.
    pub async fn advance_week(&self, caller_id: String) -> GameResult<()> {
        self.call(|reply| Command::AdvanceWeek { caller_id, reply }).await
    }

    pub async fn set_autoplay(&self, settings: AutoplaySettings) -> GameResult<()> {
        self.call(|reply| Command::SetAutoplay { settings, reply }).await
    }

    pub async fn snapshot(&self) -> GameState {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(Command::Snapshot { reply }).await;
        rx.await.expect("coordinator task dropped the reply channel")
    }

    pub async fn subscribe(&self) -> broadcast::Receiver<Event> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(Command::Subscribe { reply }).await;
        rx.await.expect("coordinator task dropped the reply channel")
    }

    async fn call<F>(&self, make_cmd: F) -> GameResult<()>
    where
        F: FnOnce(oneshot::Sender<GameResult<()>>) -> Command,
    {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make_cmd(reply))
            .await
            .map_err(|_| GameError::InvalidState("coordinator task is no longer running".into()))?;
        rx.await.map_err(|_| GameError::InvalidState("coordinator task dropped the reply channel".into()))?
    }
}

struct CoordinatorActor {
    state: GameState,
    creator_id: String,
    assignments: HashMap<Role, Assignment>,
    autoplay: AutoplaySettings,
    event_tx: broadcast::Sender<Event>,
    audit: Arc<dyn AuditSink>,
    effect: Option<Arc<dyn EffectSink>>,
}

impl CoordinatorActor {
    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        while let Some(cmd) = rx.recv().await {
            match cmd {
                Command::AssignRole { role, participant_id, is_agent, reply } => {
                    let _ = reply.send(self.handle_assign_role(role, participant_id, is_agent));
                }
                Command::Start { caller_id, reply } => {
                    let _ = reply.send(self.handle_start(&caller_id));
                }
                Command::Submit { role, quantity, caller_id, reply } => {
                    let result = self.handle_submit(role, quantity, &caller_id);
                    let _ = reply.send(result);
                }
                Command::RequestAgentDecisions { reply } => {
                    let _ = reply.send(self.handle_request_agent_decisions());
                }
                Command::Tick { reply } => {
                    let _ = reply.send(self.handle_tick());
                }
                Command::AdvanceWeek { caller_id, reply } => {
                    let _ = reply.send(self.handle_advance_week(&caller_id));
                }
                Command::SetAutoplay { settings, reply } => {
                    self.autoplay = settings;
                    self.audit(
                        "system",
                        AuditAction::SetAutoplay {
                            enabled: settings.enabled,
                            auto_advance: settings.auto_advance,
                            interval_ms: settings.interval_ms,
                        },
                        Outcome::Success,
                    );
                    let _ = reply.send(Ok(()));
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.state.clone());
                }
                Command::Subscribe { reply } => {
                    let _ = reply.send(self.event_tx.subscribe());
                }
            }
        }
    }

    fn reject_if_finalised(&self) -> GameResult<()> {
        if matches!(self.state.status, GameStatus::Completed | GameStatus::Halted) {
            return Err(GameError::GameFinalised);
        }
        Ok(())
    }

    fn audit(&self, actor: &str, action: AuditAction, outcome: Outcome) {
        self.audit.emit(&AuditEvent::now(actor, action, outcome));
    }

    fn broadcast(&self, events: Vec<Event>) {
        for event in events {
            let _ = self.event_tx.send(event);
        }
    }

    fn handle_assign_role(&mut self, role: Role, participant_id: String, is_agent: bool) -> GameResult<()> {
        self.reject_if_finalised()?;
        if self.state.status != GameStatus::Setup {
            return Err(GameError::InvalidState("roles can only be assigned before Start".into()));
        }
        self.assignments.insert(role, Assignment { participant_id: participant_id.clone(), is_agent });
        self.audit(&participant_id, AuditAction::AssignRole { role }, Outcome::Success);
        Ok(())
    }

    fn handle_start(&mut self, caller_id: &str) -> GameResult<()> {
        self.reject_if_finalised()?;
        if caller_id != self.creator_id {
            return Err(GameError::Unauthorized);
        }
        if self.state.status != GameStatus::Setup {
            return Err(GameError::InvalidState(format!("Start requires Setup, got {:?}", self.state.status)));
        }
        if Role::ALL.iter().any(|r| !self.assignments.contains_key(r)) {
            return Err(GameError::InvalidArgument("all four roles must be assigned before Start".into()));
        }
        self.state.status = GameStatus::Active;
        self.broadcast(vec![Event::GameStarted]);
        self.audit(caller_id, AuditAction::StartGame, Outcome::Success);
        Ok(())
    }

    fn handle_submit(&mut self, role: Role, quantity: u32, caller_id: &str) -> GameResult<()> {
        self.reject_if_finalised()?;
        if self.state.status != GameStatus::Active {
            return Err(GameError::InvalidState(format!("Submit requires Active, got {:?}", self.state.status)));
        }
        let authorized = caller_id == self.creator_id
            || self.assignments.get(&role).is_some_and(|a| a.participant_id == caller_id);
        if !authorized {
            return Err(GameError::Unauthorized);
        }
        if quantity > 10_000 {
            return Err(GameError::InvalidArgument(format!("quantity {} out of [0,10000]", quantity)));
        }
        if self.state.decision_ledger.contains_key(&role) {
            return Err(GameError::AlreadySubmitted);
        }
        self.state.decision_ledger.insert(role, quantity);
        self.audit(caller_id, AuditAction::SubmitDecision { role, quantity }, Outcome::Success);
        self.maybe_auto_tick();
        Ok(())
    }

    fn handle_request_agent_decisions(&mut self) -> GameResult<()> {
        self.reject_if_finalised()?;
        if self.state.status != GameStatus::Active {
            return Err(GameError::InvalidState(format!("RequestAgentDecisions requires Active, got {:?}", self.state.status)));
        }
        for role in Role::ALL {
            let is_ai = self.assignments.get(&role).map(|a| a.is_agent).unwrap_or(false);
            if !is_ai || self.state.decision_ledger.contains_key(&role) {
                continue;
            }
            let quantity = agent::decide(&self.state, role)?;
            self.state.decision_ledger.insert(role, quantity);
            self.audit("scheduler", AuditAction::SubmitDecision { role, quantity }, Outcome::Success);
        }
        self.maybe_auto_tick();
        Ok(())
    }

    fn maybe_auto_tick(&mut self) {
        if self.autoplay.enabled && self.autoplay.auto_advance && self.state.decisions_complete() {
            let _ = self.handle_tick();
        }
    }

    /// The gated counterpart to `handle_tick`: only the creator may drive
    /// the week forward directly. System-triggered ticks (autoplay,
    /// post-submit auto-advance) go through `handle_tick` instead, since
    /// they have no caller to check.
    fn handle_advance_week(&mut self, caller_id: &str) -> GameResult<()> {
        if caller_id != self.creator_id {
            return Err(GameError::Unauthorized);
        }
        self.handle_tick()
    }

    fn handle_tick(&mut self) -> GameResult<()> {
        self.reject_if_finalised()?;
        match engine::tick(&self.state) {
            Ok((next, events)) => {
                self.state = next;
                self.broadcast(events);
                if let Some(effect) = &self.effect {
                    effect.on_committed(&self.state);
                }
                self.audit("scheduler", AuditAction::Tick { week: self.state.current_week }, Outcome::Success);
                Ok(())
            }
            Err(GameError::InvariantViolated(msg)) => {
                self.state.status = GameStatus::Halted;
                log::error!("game {} halted: {}", self.state.game_id, msg);
                self.audit(
                    "scheduler",
                    AuditAction::Halt { week: self.state.current_week, reason: msg.clone() },
                    Outcome::Halted,
                );
                Err(GameError::InvariantViolated(msg))
            }
            Err(e) => Err(e),
        }
    }
}
