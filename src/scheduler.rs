//! Autoplay scheduler: fires AI role decisions on an interval and
//! optionally advances the week once every role has one.
//!
//! A `tokio::time::interval` drives a bounded amount of work per fire: ask
//! a game's coordinator to fill in its AI roles' decisions, then tick if
//! autoplay wants it. One scheduler task per game; cancelling it is just
//! dropping the `JoinHandle`/flipping the shared flag.

use crate::coordinator::GameCoordinatorHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Handle to a running autoplay loop for one game. Dropping or calling
/// [`AutoplayTask::cancel`] stops the loop before its next fire.
pub struct AutoplayTask {
    cancelled: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

impl AutoplayTask {
    /// Spawns a loop that fires every `interval` to request agent decisions
    /// for `coordinator`'s game, then ticks if `auto_advance` and every role
    /// now has a decision. Stops on its own once the game completes or
    /// halts, since `request_agent_decisions`/`tick` both reject finalised
    /// games and the loop treats that as a signal to exit.
    pub fn spawn(coordinator: GameCoordinatorHandle, interval: Duration, auto_advance: bool) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if flag.load(Ordering::Relaxed) {
                    return;
                }
                if coordinator.request_agent_decisions().await.is_err() {
                    // Finalised or otherwise no longer accepting decisions.
                    return;
                }
                if auto_advance {
                    let state = coordinator.snapshot().await;
                    if state.decisions_complete() {
                        if coordinator.tick().await.is_err() {
                            return;
                        }
                    }
                }
            }
        });
        Self { cancelled, join }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.join.abort();
    }
}

impl Drop for AutoplayTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
