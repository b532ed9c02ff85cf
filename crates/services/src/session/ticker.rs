use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use study_core::Clock;

use super::engine::SessionEngine;

/// Low-frequency background tick that republishes the elapsed display while
/// a session is active.
///
/// The task exits on its own the moment the session is no longer active, and
/// is aborted on [`ElapsedTicker::stop`] or drop, so it can never outlive
/// its session or its owner. The engine stays the single source of truth;
/// the tick only re-derives `format_elapsed` from the origin instant.
pub struct ElapsedTicker {
    handle: JoinHandle<()>,
}

impl ElapsedTicker {
    /// Spawns a ~1 Hz ticker publishing the formatted elapsed duration.
    ///
    /// The first publish happens immediately. Subscribers read from their
    /// side of the `watch` channel; if every receiver is dropped the task
    /// exits as well.
    #[must_use]
    pub fn spawn(
        engine: Arc<Mutex<SessionEngine>>,
        clock: Clock,
        tx: watch::Sender<String>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let display = {
                    let guard = engine.lock().unwrap_or_else(PoisonError::into_inner);
                    if !guard.is_active() {
                        break;
                    }
                    guard.format_elapsed(clock.now())
                };
                if tx.send(display).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    /// Cancels the tick immediately.
    pub fn stop(&self) {
        self.handle.abort();
    }

    /// Whether the background task has exited (finished or aborted).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
