use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Duration;
use serde_json::Value;
use tracing::{debug, warn};

use storage::keys::{RESUME_ELAPSED_KEY, reviewed_key};
use storage::store::ProgressStore;
use study_core::Clock;
use study_core::model::{Catalog, ItemId, ItemKind, Week, WeekId};

use super::engine::SessionEngine;

/// Binds the pure [`SessionEngine`] to a durable [`ProgressStore`].
///
/// Hydrates ever-reviewed progress and the resume duration at load, and
/// flushes merged progress on stop. Storage failures never surface to the
/// caller: reads degrade to "nothing reviewed yet" and writes are
/// fire-and-forget, leaving the in-memory state authoritative for the
/// process lifetime. Engine transitions happen under one lock with no await
/// in between, so rapid intents cannot interleave half-applied.
#[derive(Clone)]
pub struct StudySessionService {
    clock: Clock,
    store: Arc<dyn ProgressStore>,
    engine: Arc<Mutex<SessionEngine>>,
}

impl StudySessionService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn ProgressStore>) -> Self {
        Self {
            clock,
            store,
            engine: Arc::new(Mutex::new(SessionEngine::new())),
        }
    }

    /// Shared handle to the engine, for the elapsed ticker.
    #[must_use]
    pub fn engine_handle(&self) -> Arc<Mutex<SessionEngine>> {
        Arc::clone(&self.engine)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    fn engine(&self) -> MutexGuard<'_, SessionEngine> {
        // A poisoned lock still holds valid engine state: every mutation is
        // a single non-panicking assignment sequence.
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads durable progress for every week in the catalog, plus the
    /// retained resume duration.
    ///
    /// Missing keys, malformed values, and read failures all hydrate as
    /// empty, per the degrade-to-nothing policy.
    pub async fn hydrate(&self, catalog: &Catalog) {
        for week in catalog.weeks() {
            for kind in ItemKind::ALL {
                let ids = self.read_id_array(&reviewed_key(kind, &week.id)).await;
                self.engine().hydrate_ever(kind, week.id.clone(), ids);
            }
        }

        if let Some(ms) = self.read_elapsed_ms().await {
            self.engine()
                .hydrate_stopped_elapsed(Duration::milliseconds(ms));
        }
    }

    async fn read_id_array(&self, key: &str) -> Vec<ItemId> {
        match self.store.get(key).await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|err| {
                debug!(key, error = %err, "malformed reviewed array, treating as empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                debug!(key, error = %err, "progress read failed, treating as empty");
                Vec::new()
            }
        }
    }

    async fn read_elapsed_ms(&self) -> Option<i64> {
        match self.store.get(RESUME_ELAPSED_KEY).await {
            Ok(Some(value)) => value.as_i64(),
            Ok(None) => None,
            Err(err) => {
                debug!(error = %err, "resume duration read failed, ignoring");
                None
            }
        }
    }

    /// Starts (or resumes) a session over the given weeks.
    ///
    /// The persisted resume key is removed once the session owns the
    /// duration again, so a reload mid-session does not double-resume.
    pub async fn start(&self, week_ids: &[WeekId]) {
        let started = self.engine().start(week_ids, self.clock.now());
        if started {
            if let Err(err) = self.store.remove(RESUME_ELAPSED_KEY).await {
                warn!(error = %err, "failed to clear persisted resume duration");
            }
        }
    }

    /// Flips one review mark; ignored while no session is active.
    pub fn toggle_reviewed(&self, week_id: &WeekId, item_id: &ItemId, kind: ItemKind) {
        self.engine().toggle_reviewed(week_id, item_id, kind);
    }

    /// Stops the session and persists merged progress plus the elapsed
    /// duration. Each key is independent; a failed write is logged and
    /// skipped.
    pub async fn stop(&self) {
        let Some(flush) = self.engine().stop(self.clock.now()) else {
            return;
        };

        for entry in &flush.entries {
            let key = reviewed_key(entry.kind, &entry.week_id);
            let ids: Vec<&str> = entry.ever_ids.iter().map(ItemId::as_str).collect();
            if let Err(err) = self.store.set(&key, &Value::from(ids)).await {
                warn!(key, error = %err, "failed to persist reviewed progress");
            }
        }

        let ms = flush.elapsed.num_milliseconds();
        if let Err(err) = self.store.set(RESUME_ELAPSED_KEY, &Value::from(ms)).await {
            warn!(error = %err, "failed to persist resume duration");
        }
    }

    /// Clears volatile session and timer state, including the persisted
    /// resume key. Durable progress is untouched.
    pub async fn reset(&self) {
        self.engine().reset();
        if let Err(err) = self.store.remove(RESUME_ELAPSED_KEY).await {
            warn!(error = %err, "failed to remove persisted resume duration");
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.engine().is_active()
    }

    /// The reviewed ids a display should show for one (kind, week) pair:
    /// volatile while active, ever-reviewed while inactive.
    #[must_use]
    pub fn reviewed_ids(&self, kind: ItemKind, week_id: &WeekId) -> Vec<ItemId> {
        self.engine().reviewed_view(kind, week_id)
    }

    /// The durable ever-reviewed ids for one (kind, week) pair.
    #[must_use]
    pub fn ever_reviewed_ids(&self, kind: ItemKind, week_id: &WeekId) -> Vec<ItemId> {
        let engine = self.engine();
        let mut ids: Vec<ItemId> = engine
            .ever_reviewed()
            .ids(kind, week_id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    #[must_use]
    pub fn is_week_completed(&self, week: &Week) -> bool {
        self.engine().is_week_completed(week)
    }

    /// The `HH:MM:SS` display for the currently relevant duration.
    #[must_use]
    pub fn format_elapsed(&self) -> String {
        self.engine().format_elapsed(self.clock.now())
    }
}
