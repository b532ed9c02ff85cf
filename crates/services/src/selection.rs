use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use study_core::model::{Catalog, CourseId, TriState, UnitId, Week, WeekId};

//
// ─── DERIVED STATES ────────────────────────────────────────────────────────────
//

/// Tri-state of every node in the hierarchy, derived from the week set.
///
/// Always produced fresh by [`SelectionEngine::states`]; holding onto an old
/// value across a mutation shows stale data, by construction there is no
/// cached copy that could drift from the selection set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionStates {
    pub weeks: HashMap<WeekId, TriState>,
    pub units: HashMap<UnitId, TriState>,
    pub courses: HashMap<CourseId, TriState>,
}

impl SelectionStates {
    #[must_use]
    pub fn week(&self, id: &WeekId) -> TriState {
        self.weeks.get(id).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn unit(&self, id: &UnitId) -> TriState {
        self.units.get(id).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn course(&self, id: &CourseId) -> TriState {
        self.courses.get(id).copied().unwrap_or_default()
    }
}

//
// ─── SELECTION ENGINE ──────────────────────────────────────────────────────────
//

/// Multi-select over the catalog hierarchy.
///
/// The set of selected week ids is the only stored fact; unit and course
/// states are always recomputed from it. Toggling a parent acts on its
/// descendant weeks, never on a per-parent flag.
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    catalog: Arc<Catalog>,
    selected: HashSet<WeekId>,
}

impl SelectionEngine {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            selected: HashSet::new(),
        }
    }

    /// Creates an engine seeded with one initially selected week.
    #[must_use]
    pub fn with_initial_week(catalog: Arc<Catalog>, week_id: WeekId) -> Self {
        let mut engine = Self::new(catalog);
        engine.selected.insert(week_id);
        engine
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The raw selection set.
    #[must_use]
    pub fn selected_week_ids(&self) -> &HashSet<WeekId> {
        &self.selected
    }

    /// Selected weeks resolved against the catalog, in document order.
    ///
    /// Ids not present in the catalog are skipped here, which is how stale
    /// selections degrade to no-ops downstream.
    #[must_use]
    pub fn selected_weeks(&self) -> Vec<&Week> {
        self.catalog
            .weeks()
            .iter()
            .filter(|week| self.selected.contains(&week.id))
            .collect()
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Flips membership of one week in the selection set.
    ///
    /// The id is not validated against the catalog; display layers are
    /// expected to only pass ids they rendered.
    pub fn toggle_week(&mut self, week_id: &WeekId) {
        if !self.selected.remove(week_id) {
            self.selected.insert(week_id.clone());
        }
    }

    /// Toggles every week of a unit as one action.
    ///
    /// A fully selected unit deselects all of its weeks; `none` and
    /// `partial` both select all of them. A unit without weeks is a no-op.
    pub fn toggle_unit(&mut self, unit_id: &UnitId) {
        let week_ids = self.catalog.unit_week_ids(unit_id).to_vec();
        self.toggle_week_group(&week_ids);
    }

    /// Toggles every descendant week of a course, same rule as units.
    pub fn toggle_course(&mut self, course_id: &CourseId) {
        let week_ids = self.catalog.course_week_ids(course_id);
        self.toggle_week_group(&week_ids);
    }

    fn toggle_week_group(&mut self, week_ids: &[WeekId]) {
        if week_ids.is_empty() {
            return;
        }
        let selected_count = week_ids
            .iter()
            .filter(|id| self.selected.contains(*id))
            .count();
        if selected_count == week_ids.len() {
            for id in week_ids {
                self.selected.remove(id);
            }
        } else {
            for id in week_ids {
                self.selected.insert(id.clone());
            }
        }
    }

    /// Replaces the whole selection with a single week.
    ///
    /// Used when the learner drills directly into one week, discarding any
    /// multi-selection.
    pub fn select_single_week(&mut self, week_id: WeekId) {
        self.selected.clear();
        self.selected.insert(week_id);
    }

    /// Empties the selection set.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Computes the tri-state of every week, unit, and course.
    ///
    /// Pure read over the selection set and catalog; call it again after any
    /// mutation.
    #[must_use]
    pub fn states(&self) -> SelectionStates {
        let weeks = self
            .catalog
            .weeks()
            .iter()
            .map(|week| {
                let state = if self.selected.contains(&week.id) {
                    TriState::Selected
                } else {
                    TriState::None
                };
                (week.id.clone(), state)
            })
            .collect();

        let units = self
            .catalog
            .units()
            .iter()
            .map(|unit| {
                let week_ids = self.catalog.unit_week_ids(&unit.id);
                (unit.id.clone(), self.group_state(week_ids))
            })
            .collect();

        let courses = self
            .catalog
            .courses()
            .iter()
            .map(|course| {
                let week_ids = self.catalog.course_week_ids(&course.id);
                (course.id.clone(), self.group_state(&week_ids))
            })
            .collect();

        SelectionStates {
            weeks,
            units,
            courses,
        }
    }

    fn group_state(&self, week_ids: &[WeekId]) -> TriState {
        let selected = week_ids
            .iter()
            .filter(|id| self.selected.contains(*id))
            .count();
        TriState::from_counts(selected, week_ids.len())
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
