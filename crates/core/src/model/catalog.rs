use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::ids::{CourseId, ItemId, UnitId, WeekId};
use crate::model::item::{Item, ItemKind};

//
// ─── ENTITIES ──────────────────────────────────────────────────────────────────
//

/// Top level of the content hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A teaching unit within a course.
///
/// Carries a parent back-reference by id rather than an object pointer, so
/// the hierarchy stays cycle-free and serializable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub title: String,
    pub course_id: CourseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One week of content: a date-ranged bundle of vocabulary and phrases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Week {
    pub id: WeekId,
    pub title: String,
    pub date_range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub unit_id: UnitId,
    pub course_id: CourseId,
    pub vocab: Vec<Item>,
    pub phrases: Vec<Item>,
}

impl Week {
    /// The week's items of the given kind.
    #[must_use]
    pub fn items(&self, kind: ItemKind) -> &[Item] {
        match kind {
            ItemKind::Vocab => &self.vocab,
            ItemKind::Phrase => &self.phrases,
        }
    }

    /// Ids of the week's items of the given kind, in document order.
    pub fn item_ids(&self, kind: ItemKind) -> impl Iterator<Item = &ItemId> {
        self.items(kind).iter().map(Item::id)
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// The immutable content hierarchy for the current load.
///
/// Built once per load; all descendant/ancestor queries run against
/// id-indexed lookup tables so derived views never walk object graphs.
/// Weeks that reference a unit absent from the hierarchy are dropped at
/// construction (the loader reports them).
#[derive(Debug, Clone)]
pub struct Catalog {
    courses: Vec<Course>,
    units: Vec<Unit>,
    weeks: Vec<Week>,
    course_index: HashMap<CourseId, usize>,
    unit_index: HashMap<UnitId, usize>,
    week_index: HashMap<WeekId, usize>,
    units_by_course: HashMap<CourseId, Vec<UnitId>>,
    weeks_by_unit: HashMap<UnitId, Vec<WeekId>>,
}

impl Catalog {
    /// Builds the catalog and its lookup tables.
    ///
    /// Returns the catalog together with the ids of any weeks that were
    /// dropped because their `unit_id` does not exist.
    #[must_use]
    pub fn new(courses: Vec<Course>, units: Vec<Unit>, weeks: Vec<Week>) -> (Self, Vec<WeekId>) {
        let course_index: HashMap<CourseId, usize> = courses
            .iter()
            .enumerate()
            .map(|(idx, course)| (course.id.clone(), idx))
            .collect();
        let unit_index: HashMap<UnitId, usize> = units
            .iter()
            .enumerate()
            .map(|(idx, unit)| (unit.id.clone(), idx))
            .collect();

        let mut units_by_course: HashMap<CourseId, Vec<UnitId>> = HashMap::new();
        for unit in &units {
            units_by_course
                .entry(unit.course_id.clone())
                .or_default()
                .push(unit.id.clone());
        }

        let mut kept = Vec::with_capacity(weeks.len());
        let mut orphaned = Vec::new();
        for week in weeks {
            if unit_index.contains_key(&week.unit_id) {
                kept.push(week);
            } else {
                orphaned.push(week.id);
            }
        }

        let week_index: HashMap<WeekId, usize> = kept
            .iter()
            .enumerate()
            .map(|(idx, week)| (week.id.clone(), idx))
            .collect();
        let mut weeks_by_unit: HashMap<UnitId, Vec<WeekId>> = HashMap::new();
        for week in &kept {
            weeks_by_unit
                .entry(week.unit_id.clone())
                .or_default()
                .push(week.id.clone());
        }

        let catalog = Self {
            courses,
            units,
            weeks: kept,
            course_index,
            unit_index,
            week_index,
            units_by_course,
            weeks_by_unit,
        };
        (catalog, orphaned)
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    #[must_use]
    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    #[must_use]
    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.course_index.get(id).map(|&idx| &self.courses[idx])
    }

    #[must_use]
    pub fn unit(&self, id: &UnitId) -> Option<&Unit> {
        self.unit_index.get(id).map(|&idx| &self.units[idx])
    }

    #[must_use]
    pub fn week(&self, id: &WeekId) -> Option<&Week> {
        self.week_index.get(id).map(|&idx| &self.weeks[idx])
    }

    #[must_use]
    pub fn contains_week(&self, id: &WeekId) -> bool {
        self.week_index.contains_key(id)
    }

    /// Ids of the weeks directly under a unit, in document order.
    ///
    /// Unknown units and units without weeks both yield an empty slice.
    #[must_use]
    pub fn unit_week_ids(&self, id: &UnitId) -> &[WeekId] {
        self.weeks_by_unit.get(id).map_or(&[], Vec::as_slice)
    }

    /// Ids of every descendant week of a course, flattened across its units
    /// in unit order.
    #[must_use]
    pub fn course_week_ids(&self, id: &CourseId) -> Vec<WeekId> {
        self.units_by_course
            .get(id)
            .into_iter()
            .flatten()
            .flat_map(|unit_id| self.unit_week_ids(unit_id))
            .cloned()
            .collect()
    }

}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::ItemId;
    use crate::model::item::Item;

    fn week(id: &str, unit: &str, course: &str) -> Week {
        Week {
            id: WeekId::new(id),
            title: format!("Week {id}"),
            date_range: "Jan 1-7".to_owned(),
            start_date: None,
            end_date: None,
            unit_id: UnitId::new(unit),
            course_id: CourseId::new(course),
            vocab: vec![Item::new(
                ItemId::new(format!("{id}-v1")),
                "hola",
                "hello",
                ItemKind::Vocab,
            )],
            phrases: Vec::new(),
        }
    }

    fn sample() -> (Catalog, Vec<WeekId>) {
        let courses = vec![Course {
            id: CourseId::new("c1"),
            title: "Spanish".to_owned(),
            description: None,
        }];
        let units = vec![
            Unit {
                id: UnitId::new("u1"),
                title: "Unit 1".to_owned(),
                course_id: CourseId::new("c1"),
                description: None,
            },
            Unit {
                id: UnitId::new("u2"),
                title: "Unit 2".to_owned(),
                course_id: CourseId::new("c1"),
                description: None,
            },
        ];
        let weeks = vec![
            week("w1", "u1", "c1"),
            week("w2", "u1", "c1"),
            week("w3", "u2", "c1"),
            week("w4", "missing-unit", "c1"),
        ];
        Catalog::new(courses, units, weeks)
    }

    #[test]
    fn indexes_resolve_entities() {
        let (catalog, _) = sample();
        assert_eq!(catalog.course(&CourseId::new("c1")).unwrap().title, "Spanish");
        assert_eq!(catalog.unit(&UnitId::new("u2")).unwrap().title, "Unit 2");
        assert!(catalog.contains_week(&WeekId::new("w3")));
        assert!(catalog.week(&WeekId::new("nope")).is_none());
    }

    #[test]
    fn orphaned_weeks_are_dropped_and_reported() {
        let (catalog, orphaned) = sample();
        assert_eq!(orphaned, vec![WeekId::new("w4")]);
        assert!(!catalog.contains_week(&WeekId::new("w4")));
        assert_eq!(catalog.weeks().len(), 3);
    }

    #[test]
    fn unit_weeks_keep_document_order() {
        let (catalog, _) = sample();
        let ids = catalog.unit_week_ids(&UnitId::new("u1"));
        assert_eq!(ids, &[WeekId::new("w1"), WeekId::new("w2")]);
        assert!(catalog.unit_week_ids(&UnitId::new("empty")).is_empty());
    }

    #[test]
    fn course_weeks_flatten_across_units() {
        let (catalog, _) = sample();
        let ids = catalog.course_week_ids(&CourseId::new("c1"));
        assert_eq!(
            ids,
            vec![WeekId::new("w1"), WeekId::new("w2"), WeekId::new("w3")]
        );
    }
}
