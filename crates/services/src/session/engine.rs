use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use study_core::model::{ItemId, ItemKind, Week, WeekId};
use study_core::time::format_hms;

//
// ─── REVIEWED MARKS ────────────────────────────────────────────────────────────
//

/// Per-kind mapping from week id to a set of reviewed item ids.
///
/// Used twice by the engine: once for the volatile marks of the running
/// session, once for the durable ever-reviewed mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewedMarks {
    vocab: HashMap<WeekId, HashSet<ItemId>>,
    phrase: HashMap<WeekId, HashSet<ItemId>>,
}

impl ReviewedMarks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn for_kind(&self, kind: ItemKind) -> &HashMap<WeekId, HashSet<ItemId>> {
        match kind {
            ItemKind::Vocab => &self.vocab,
            ItemKind::Phrase => &self.phrase,
        }
    }

    fn for_kind_mut(&mut self, kind: ItemKind) -> &mut HashMap<WeekId, HashSet<ItemId>> {
        match kind {
            ItemKind::Vocab => &mut self.vocab,
            ItemKind::Phrase => &mut self.phrase,
        }
    }

    /// The reviewed ids for one (kind, week) pair; empty when untracked.
    #[must_use]
    pub fn ids(&self, kind: ItemKind, week_id: &WeekId) -> Option<&HashSet<ItemId>> {
        self.for_kind(kind).get(week_id)
    }

    #[must_use]
    pub fn contains(&self, kind: ItemKind, week_id: &WeekId, item_id: &ItemId) -> bool {
        self.ids(kind, week_id).is_some_and(|ids| ids.contains(item_id))
    }

    /// Total number of marked ids across both kinds.
    #[must_use]
    pub fn count(&self) -> usize {
        self.vocab.values().map(HashSet::len).sum::<usize>()
            + self.phrase.values().map(HashSet::len).sum::<usize>()
    }

    fn toggle(&mut self, kind: ItemKind, week_id: &WeekId, item_id: &ItemId) {
        let ids = self.for_kind_mut(kind).entry(week_id.clone()).or_default();
        if !ids.remove(item_id) {
            ids.insert(item_id.clone());
        }
    }

    fn replace_week(&mut self, kind: ItemKind, week_id: WeekId, ids: HashSet<ItemId>) {
        self.for_kind_mut(kind).insert(week_id, ids);
    }

    fn union_week(&mut self, kind: ItemKind, week_id: &WeekId, ids: &HashSet<ItemId>) {
        self.for_kind_mut(kind)
            .entry(week_id.clone())
            .or_default()
            .extend(ids.iter().cloned());
    }

    fn entries(&self, kind: ItemKind) -> impl Iterator<Item = (&WeekId, &HashSet<ItemId>)> {
        self.for_kind(kind).iter()
    }
}

//
// ─── FLUSH ─────────────────────────────────────────────────────────────────────
//

/// One (kind, week) progress record due for persistence after a stop.
///
/// Carries the merged ever-reviewed id list, sorted so repeated stops write
/// identical values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushEntry {
    pub kind: ItemKind,
    pub week_id: WeekId,
    pub ever_ids: Vec<ItemId>,
}

/// Everything `stop` hands to the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFlush {
    pub elapsed: Duration,
    pub entries: Vec<FlushEntry>,
}

//
// ─── SESSION ENGINE ────────────────────────────────────────────────────────────
//

/// The timed study session state machine.
///
/// Pure and synchronous: operations take `now` as a parameter and return
/// whatever the caller must persist, so the whole machine is testable with a
/// fixed clock and no storage. The async workflow in this module's parent
/// owns the clock and the store.
///
/// Elapsed time is derived from an origin instant (`started_at`), never from
/// an incrementing counter; resuming shifts the origin backward by the
/// retained duration.
#[derive(Debug, Clone, Default)]
pub struct SessionEngine {
    active: bool,
    started_at: Option<DateTime<Utc>>,
    stopped_elapsed: Option<Duration>,
    reviewed: ReviewedMarks,
    ever: ReviewedMarks,
}

impl SessionEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn stopped_elapsed(&self) -> Option<Duration> {
        self.stopped_elapsed
    }

    /// Volatile marks of the current (or last) session.
    #[must_use]
    pub fn reviewed(&self) -> &ReviewedMarks {
        &self.reviewed
    }

    /// Durable ever-reviewed marks, hydrated at load and merged at stop.
    #[must_use]
    pub fn ever_reviewed(&self) -> &ReviewedMarks {
        &self.ever
    }

    /// Replaces the hydrated ever-reviewed set for one (kind, week) pair.
    pub fn hydrate_ever(
        &mut self,
        kind: ItemKind,
        week_id: WeekId,
        ids: impl IntoIterator<Item = ItemId>,
    ) {
        self.ever.replace_week(kind, week_id, ids.into_iter().collect());
    }

    /// Restores the persisted resume duration from a previous process.
    ///
    /// Ignored while a session is active or once a stop already retained a
    /// value, matching hydrate-once semantics.
    pub fn hydrate_stopped_elapsed(&mut self, elapsed: Duration) {
        if !self.active && self.stopped_elapsed.is_none() {
            self.stopped_elapsed = Some(elapsed);
        }
    }

    /// Starts (or resumes) a session over the given weeks.
    ///
    /// No-op on an empty list; duplicates are collapsed. The volatile map is
    /// fully replaced with empty sets for every (week, kind) pair, so
    /// uncommitted marks from an earlier session that never stopped are
    /// discarded. When a retained duration exists from a prior stop, the
    /// clock origin is shifted backward so the display resumes.
    ///
    /// Returns whether a session actually started.
    pub fn start(&mut self, week_ids: &[WeekId], now: DateTime<Utc>) -> bool {
        if week_ids.is_empty() {
            return false;
        }
        let unique: HashSet<&WeekId> = week_ids.iter().collect();

        let mut initial = ReviewedMarks::new();
        for week_id in unique {
            for kind in ItemKind::ALL {
                initial.replace_week(kind, week_id.clone(), HashSet::new());
            }
        }
        self.reviewed = initial;
        self.active = true;

        match self.stopped_elapsed {
            Some(elapsed) if elapsed > Duration::zero() => {
                self.started_at = Some(now - elapsed);
            }
            _ => {
                self.started_at = Some(now);
            }
        }
        self.stopped_elapsed = None;
        true
    }

    /// Flips one review mark. No-op unless a session is active.
    pub fn toggle_reviewed(&mut self, week_id: &WeekId, item_id: &ItemId, kind: ItemKind) {
        if !self.active {
            return;
        }
        self.reviewed.toggle(kind, week_id, item_id);
    }

    /// Stops the session, merging volatile marks into ever-reviewed.
    ///
    /// Returns the merged records and final elapsed duration for the caller
    /// to persist, or `None` when no session was active. The volatile map is
    /// kept for display; the next `start` replaces it.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<SessionFlush> {
        if !self.active {
            return None;
        }
        let elapsed = self.started_at.map_or(Duration::zero(), |at| now - at);

        let mut entries = Vec::new();
        for kind in ItemKind::ALL {
            for (week_id, ids) in self.reviewed.entries(kind) {
                entries.push((kind, week_id.clone(), ids.clone()));
            }
        }
        let mut flush_entries = Vec::with_capacity(entries.len());
        for (kind, week_id, ids) in entries {
            self.ever.union_week(kind, &week_id, &ids);
            let mut ever_ids: Vec<ItemId> = self
                .ever
                .ids(kind, &week_id)
                .map(|ids| ids.iter().cloned().collect())
                .unwrap_or_default();
            ever_ids.sort();
            flush_entries.push(FlushEntry {
                kind,
                week_id,
                ever_ids,
            });
        }

        self.active = false;
        self.stopped_elapsed = Some(elapsed);
        Some(SessionFlush {
            elapsed,
            entries: flush_entries,
        })
    }

    /// Clears all volatile session and timer state.
    ///
    /// Ever-reviewed progress is never touched by reset.
    pub fn reset(&mut self) {
        self.active = false;
        self.started_at = None;
        self.stopped_elapsed = None;
        self.reviewed = ReviewedMarks::new();
    }

    /// The reviewed ids a display should show for one (kind, week) pair:
    /// the volatile marks while a session is active, the durable
    /// ever-reviewed set once it is not.
    #[must_use]
    pub fn reviewed_view(&self, kind: ItemKind, week_id: &WeekId) -> Vec<ItemId> {
        let marks = if self.active { &self.reviewed } else { &self.ever };
        let mut ids: Vec<ItemId> = marks
            .ids(kind, week_id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    /// Whether long-term progress fully covers a week.
    ///
    /// A week counts as completed only when it has at least one vocabulary
    /// item and at least one phrase item, and every id of both kinds has
    /// been reviewed at some point. Weeks missing either kind can never be
    /// completed.
    #[must_use]
    pub fn is_week_completed(&self, week: &Week) -> bool {
        if week.vocab.is_empty() || week.phrases.is_empty() {
            return false;
        }
        ItemKind::ALL.into_iter().all(|kind| {
            week.item_ids(kind)
                .all(|id| self.ever.contains(kind, &week.id, id))
        })
    }

    /// The currently relevant duration: running elapsed while active, else
    /// the retained stop value, else zero.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        if self.active {
            self.started_at.map_or(Duration::zero(), |at| now - at)
        } else {
            self.stopped_elapsed.unwrap_or_else(Duration::zero)
        }
    }

    /// Renders [`Self::elapsed`] as `HH:MM:SS` with hours capped at 99.
    #[must_use]
    pub fn format_elapsed(&self, now: DateTime<Utc>) -> String {
        format_hms(self.elapsed(now))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::Item;
    use study_core::model::{CourseId, UnitId};
    use study_core::time::fixed_now;

    fn wid(id: &str) -> WeekId {
        WeekId::new(id)
    }

    fn iid(id: &str) -> ItemId {
        ItemId::new(id)
    }

    fn week_with(id: &str, vocab: &[&str], phrases: &[&str]) -> Week {
        let item = |raw: &&str, kind| Item::new(ItemId::new(*raw), "es", "en", kind);
        Week {
            id: wid(id),
            title: format!("Week {id}"),
            date_range: String::new(),
            start_date: None,
            end_date: None,
            unit_id: UnitId::new("u1"),
            course_id: CourseId::new("c1"),
            vocab: vocab.iter().map(|v| item(v, ItemKind::Vocab)).collect(),
            phrases: phrases.iter().map(|p| item(p, ItemKind::Phrase)).collect(),
        }
    }

    #[test]
    fn start_with_no_weeks_is_a_no_op() {
        let mut engine = SessionEngine::new();
        assert!(!engine.start(&[], fixed_now()));
        assert!(!engine.is_active());
        assert!(engine.started_at().is_none());
    }

    #[test]
    fn start_deduplicates_and_seeds_empty_sets() {
        let mut engine = SessionEngine::new();
        assert!(engine.start(&[wid("w1"), wid("w1"), wid("w2")], fixed_now()));
        assert!(engine.is_active());
        for kind in ItemKind::ALL {
            assert_eq!(engine.reviewed().ids(kind, &wid("w1")), Some(&HashSet::new()));
            assert_eq!(engine.reviewed().ids(kind, &wid("w2")), Some(&HashSet::new()));
        }
    }

    #[test]
    fn toggle_is_ignored_while_inactive() {
        let mut engine = SessionEngine::new();
        engine.toggle_reviewed(&wid("w1"), &iid("v1"), ItemKind::Vocab);
        assert_eq!(engine.reviewed().count(), 0);
    }

    #[test]
    fn toggle_flips_membership() {
        let mut engine = SessionEngine::new();
        engine.start(&[wid("w1")], fixed_now());

        engine.toggle_reviewed(&wid("w1"), &iid("v1"), ItemKind::Vocab);
        assert!(engine.reviewed().contains(ItemKind::Vocab, &wid("w1"), &iid("v1")));

        engine.toggle_reviewed(&wid("w1"), &iid("v1"), ItemKind::Vocab);
        assert!(!engine.reviewed().contains(ItemKind::Vocab, &wid("w1"), &iid("v1")));
    }

    #[test]
    fn toggle_creates_sets_for_untracked_weeks() {
        let mut engine = SessionEngine::new();
        engine.start(&[wid("w1")], fixed_now());
        engine.toggle_reviewed(&wid("w9"), &iid("p1"), ItemKind::Phrase);
        assert!(engine.reviewed().contains(ItemKind::Phrase, &wid("w9"), &iid("p1")));
    }

    #[test]
    fn stop_merges_into_ever_and_reports_flush() {
        let mut engine = SessionEngine::new();
        engine.hydrate_ever(ItemKind::Vocab, wid("w1"), [iid("old")]);

        let start = fixed_now();
        engine.start(&[wid("w1")], start);
        engine.toggle_reviewed(&wid("w1"), &iid("v1"), ItemKind::Vocab);

        let flush = engine.stop(start + Duration::seconds(90)).unwrap();
        assert_eq!(flush.elapsed, Duration::seconds(90));

        let vocab_entry = flush
            .entries
            .iter()
            .find(|e| e.kind == ItemKind::Vocab && e.week_id == wid("w1"))
            .unwrap();
        assert_eq!(vocab_entry.ever_ids, vec![iid("old"), iid("v1")]);

        // phrase entry exists too, carrying the (empty) merged set
        assert!(
            flush
                .entries
                .iter()
                .any(|e| e.kind == ItemKind::Phrase && e.week_id == wid("w1"))
        );

        assert!(!engine.is_active());
        assert_eq!(engine.stopped_elapsed(), Some(Duration::seconds(90)));
        // merge is monotonic: nothing removed from ever
        assert!(engine.ever_reviewed().contains(ItemKind::Vocab, &wid("w1"), &iid("old")));
        assert!(engine.ever_reviewed().contains(ItemKind::Vocab, &wid("w1"), &iid("v1")));
    }

    #[test]
    fn stop_without_active_session_is_a_no_op() {
        let mut engine = SessionEngine::new();
        assert!(engine.stop(fixed_now()).is_none());
    }

    #[test]
    fn volatile_marks_survive_stop_until_next_start() {
        let mut engine = SessionEngine::new();
        engine.start(&[wid("w1")], fixed_now());
        engine.toggle_reviewed(&wid("w1"), &iid("v1"), ItemKind::Vocab);
        engine.stop(fixed_now());

        assert!(engine.reviewed().contains(ItemKind::Vocab, &wid("w1"), &iid("v1")));

        // the next start replaces the map wholesale
        engine.start(&[wid("w1")], fixed_now());
        assert!(!engine.reviewed().contains(ItemKind::Vocab, &wid("w1"), &iid("v1")));
    }

    #[test]
    fn restart_without_stop_discards_uncommitted_marks() {
        let mut engine = SessionEngine::new();
        engine.start(&[wid("w1")], fixed_now());
        engine.toggle_reviewed(&wid("w1"), &iid("v1"), ItemKind::Vocab);

        engine.start(&[wid("w2")], fixed_now());
        assert_eq!(engine.reviewed().count(), 0);
        assert!(!engine.ever_reviewed().contains(ItemKind::Vocab, &wid("w1"), &iid("v1")));
    }

    #[test]
    fn resume_shifts_the_origin_backward() {
        let mut engine = SessionEngine::new();
        let t0 = fixed_now();
        engine.start(&[wid("w1")], t0);
        engine.stop(t0 + Duration::seconds(65));
        assert_eq!(engine.format_elapsed(t0 + Duration::seconds(120)), "00:01:05");

        let t1 = t0 + Duration::seconds(600);
        engine.start(&[wid("w1")], t1);
        assert_eq!(engine.format_elapsed(t1), "00:01:05");
        assert_eq!(
            engine.format_elapsed(t1 + Duration::seconds(55)),
            "00:02:00"
        );
    }

    #[test]
    fn reset_clears_timer_state_and_resume() {
        let mut engine = SessionEngine::new();
        let t0 = fixed_now();
        engine.start(&[wid("w1")], t0);
        engine.toggle_reviewed(&wid("w1"), &iid("v1"), ItemKind::Vocab);
        engine.stop(t0 + Duration::seconds(30));

        engine.reset();
        assert!(!engine.is_active());
        assert!(engine.started_at().is_none());
        assert!(engine.stopped_elapsed().is_none());
        assert_eq!(engine.reviewed().count(), 0);
        assert_eq!(engine.format_elapsed(t0 + Duration::seconds(99)), "00:00:00");

        // a start after reset begins at zero again
        engine.start(&[wid("w1")], t0 + Duration::seconds(100));
        assert_eq!(engine.format_elapsed(t0 + Duration::seconds(100)), "00:00:00");
    }

    #[test]
    fn reset_never_touches_ever_reviewed() {
        let mut engine = SessionEngine::new();
        let t0 = fixed_now();
        engine.start(&[wid("w1")], t0);
        engine.toggle_reviewed(&wid("w1"), &iid("v1"), ItemKind::Vocab);
        engine.stop(t0);

        engine.reset();
        assert!(engine.ever_reviewed().contains(ItemKind::Vocab, &wid("w1"), &iid("v1")));
    }

    #[test]
    fn reviewed_view_switches_between_volatile_and_ever() {
        let mut engine = SessionEngine::new();
        engine.hydrate_ever(ItemKind::Vocab, wid("w1"), [iid("old")]);

        // inactive: the durable view
        assert_eq!(engine.reviewed_view(ItemKind::Vocab, &wid("w1")), vec![iid("old")]);

        engine.start(&[wid("w1")], fixed_now());
        // active: the empty volatile view
        assert!(engine.reviewed_view(ItemKind::Vocab, &wid("w1")).is_empty());

        engine.toggle_reviewed(&wid("w1"), &iid("v1"), ItemKind::Vocab);
        assert_eq!(engine.reviewed_view(ItemKind::Vocab, &wid("w1")), vec![iid("v1")]);

        engine.stop(fixed_now());
        // inactive again: the merged durable view
        assert_eq!(
            engine.reviewed_view(ItemKind::Vocab, &wid("w1")),
            vec![iid("old"), iid("v1")]
        );
    }

    #[test]
    fn completion_requires_both_kinds_present_and_covered() {
        let mut engine = SessionEngine::new();
        let week = week_with("w1", &["a", "b"], &["p"]);

        assert!(!engine.is_week_completed(&week));

        engine.hydrate_ever(ItemKind::Vocab, wid("w1"), [iid("a"), iid("b")]);
        assert!(!engine.is_week_completed(&week));

        engine.hydrate_ever(ItemKind::Phrase, wid("w1"), [iid("p")]);
        assert!(engine.is_week_completed(&week));
    }

    #[test]
    fn week_missing_a_kind_is_never_completed() {
        let mut engine = SessionEngine::new();
        let vocab_only = week_with("w1", &["a", "b"], &[]);
        engine.hydrate_ever(ItemKind::Vocab, wid("w1"), [iid("a"), iid("b")]);
        assert!(!engine.is_week_completed(&vocab_only));

        let empty = week_with("w2", &[], &[]);
        assert!(!engine.is_week_completed(&empty));
    }

    #[test]
    fn elapsed_saturates_display_at_ninety_nine_hours() {
        let mut engine = SessionEngine::new();
        let t0 = fixed_now();
        engine.start(&[wid("w1")], t0);
        assert_eq!(
            engine.format_elapsed(t0 + Duration::hours(500)),
            "99:00:00"
        );
    }

    #[test]
    fn hydrated_resume_is_used_once_then_cleared() {
        let mut engine = SessionEngine::new();
        engine.hydrate_stopped_elapsed(Duration::seconds(42));
        assert_eq!(engine.format_elapsed(fixed_now()), "00:00:42");

        let t0 = fixed_now();
        engine.start(&[wid("w1")], t0);
        assert_eq!(engine.format_elapsed(t0), "00:00:42");
        assert!(engine.stopped_elapsed().is_none());

        // a later hydrate cannot override a retained stop value
        engine.stop(t0 + Duration::seconds(18));
        engine.hydrate_stopped_elapsed(Duration::seconds(5));
        assert_eq!(engine.stopped_elapsed(), Some(Duration::seconds(60)));
    }
}
