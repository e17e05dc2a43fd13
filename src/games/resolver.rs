//! Resolution Timer
//!
//! One-shot delayed flip per game, armed at join and never rearmed. Handles
//! are tracked so shutdown can abort anything still pending; an aborted flip
//! is simply lost, like every other piece of in-memory state.

use dashmap::DashMap;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct FlipScheduler {
    delay: Duration,
    pending: DashMap<u64, JoinHandle<()>>,
}

impl FlipScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: DashMap::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer for `game_id`; `resolve` runs once the delay elapses.
    /// A game's timer is armed at most once.
    pub fn schedule<F>(&self, game_id: u64, resolve: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.pending.contains_key(&game_id) {
            warn!(game_id, "flip timer already armed; ignoring");
            return;
        }

        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            resolve.await;
        });
        self.pending.insert(game_id, handle);
        debug!(game_id, delay_ms = delay.as_millis() as u64, "flip timer armed");
    }

    /// Forget a fired timer.
    pub fn complete(&self, game_id: u64) {
        self.pending.remove(&game_id);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Abort every pending flip. Called on shutdown; the resolutions are
    /// lost with the rest of the process state.
    pub fn abort_all(&self) {
        for entry in self.pending.iter() {
            entry.value().abort();
        }
        let aborted = self.pending.len();
        self.pending.clear();
        if aborted > 0 {
            warn!(aborted, "aborted pending flips at shutdown");
        }
    }
}
