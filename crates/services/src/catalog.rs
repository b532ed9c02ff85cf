//! Catalog loading: JSON documents in, an indexed [`Catalog`] out.
//!
//! Two on-disk formats are accepted. The hierarchical format nests units
//! inside courses in `config.json` and keeps each week in its own file under
//! `weeks/`; the legacy flat format carries a top-level `weeks` array, for
//! which a default course and unit are synthesized. Weeks that reference an
//! unknown unit are skipped with a warning rather than failing the load.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use study_core::model::{
    Catalog, Conjugations, Course, CourseId, Item, ItemId, ItemKind, Unit, UnitId, Week, WeekId,
    WordClass,
};

use crate::error::CatalogError;

const DEFAULT_COURSE_ID: &str = "default-course";
const DEFAULT_UNIT_ID: &str = "default-unit";

//
// ─── DOCUMENT SHAPES ───────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct ConfigDoc {
    #[serde(default)]
    courses: Option<Vec<CourseDoc>>,
    #[serde(default)]
    weeks: Option<Vec<WeekDoc>>,
}

#[derive(Debug, Deserialize)]
struct CourseDoc {
    id: CourseId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    units: Vec<UnitDoc>,
}

#[derive(Debug, Deserialize)]
struct UnitDoc {
    id: UnitId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    weeks: Vec<WeekDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeekDoc {
    id: WeekId,
    title: String,
    #[serde(default)]
    date_range: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    unit_id: Option<UnitId>,
    #[serde(default)]
    vocab: Vec<ItemDoc>,
    #[serde(default)]
    phrases: Vec<ItemDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemDoc {
    id: ItemId,
    spanish: String,
    english: String,
    #[serde(default, rename = "type")]
    word_class: Option<WordClass>,
    #[serde(default)]
    conjugations: Option<Conjugations>,
    #[serde(default)]
    audio_url: Option<String>,
}

impl ItemDoc {
    fn into_item(self, kind: ItemKind) -> Item {
        let mut item = Item::new(self.id, self.spanish, self.english, kind);
        if let Some(word_class) = self.word_class {
            item = item.with_word_class(word_class);
        }
        if let Some(conjugations) = self.conjugations {
            item = item.with_conjugations(conjugations);
        }
        if let Some(audio) = self.audio_url {
            item = item.with_audio(audio);
        }
        item
    }
}

impl WeekDoc {
    fn into_week(self, unit_id: UnitId, course_id: CourseId) -> Week {
        Week {
            id: self.id,
            title: self.title,
            date_range: self.date_range.unwrap_or_default(),
            start_date: self.start_date,
            end_date: self.end_date,
            unit_id,
            course_id,
            vocab: self
                .vocab
                .into_iter()
                .map(|doc| doc.into_item(ItemKind::Vocab))
                .collect(),
            phrases: self
                .phrases
                .into_iter()
                .map(|doc| doc.into_item(ItemKind::Phrase))
                .collect(),
        }
    }
}

//
// ─── LOADING ───────────────────────────────────────────────────────────────────
//

/// Loads a catalog from a content directory.
///
/// Expects `config.json` at the top level and, for the hierarchical format,
/// one JSON document per week anywhere under `weeks/`.
///
/// # Errors
///
/// Returns `CatalogError` when files cannot be read or parsed, or when the
/// config matches neither known format.
pub fn load_from_dir(dir: &Path) -> Result<Catalog, CatalogError> {
    let config_path = dir.join("config.json");
    let config_json = read_file(&config_path)?;
    let config: ConfigDoc = parse_doc(&config_json, &config_path.display().to_string())?;

    let mut week_docs = Vec::new();
    let weeks_dir = dir.join("weeks");
    if weeks_dir.is_dir() {
        for path in collect_json_files(&weeks_dir)? {
            let raw = read_file(&path)?;
            let doc: WeekDoc = parse_doc(&raw, &path.display().to_string())?;
            week_docs.push(doc);
        }
    }

    assemble(config, week_docs)
}

/// Builds a catalog from already-loaded JSON strings.
///
/// Same semantics as [`load_from_dir`] without touching the filesystem;
/// useful for embedded content and tests.
///
/// # Errors
///
/// Returns `CatalogError` on parse failures or an unrecognized config shape.
pub fn load_from_json(config_json: &str, week_jsons: &[&str]) -> Result<Catalog, CatalogError> {
    let config: ConfigDoc = parse_doc(config_json, "config.json")?;
    let mut week_docs = Vec::with_capacity(week_jsons.len());
    for (idx, raw) in week_jsons.iter().enumerate() {
        let doc: WeekDoc = parse_doc(raw, &format!("week document #{idx}"))?;
        week_docs.push(doc);
    }
    assemble(config, week_docs)
}

fn read_file(path: &Path) -> Result<String, CatalogError> {
    fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_doc<'de, T: Deserialize<'de>>(raw: &'de str, name: &str) -> Result<T, CatalogError> {
    serde_json::from_str(raw).map_err(|source| CatalogError::Parse {
        name: name.to_owned(),
        source,
    })
}

fn collect_json_files(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current).map_err(|source| CatalogError::Io {
            path: current.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| CatalogError::Io {
                path: current.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

//
// ─── ASSEMBLY ──────────────────────────────────────────────────────────────────
//

fn assemble(config: ConfigDoc, external_weeks: Vec<WeekDoc>) -> Result<Catalog, CatalogError> {
    let (courses, units, weeks) = if let Some(course_docs) = config.courses {
        hierarchical(course_docs, external_weeks)
    } else if let Some(week_docs) = config.weeks {
        legacy_flat(week_docs)
    } else {
        return Err(CatalogError::UnrecognizedFormat);
    };

    let (catalog, orphaned) = Catalog::new(courses, units, weeks);
    for week_id in orphaned {
        warn!(%week_id, "week references an unknown unit, skipping");
    }
    Ok(catalog)
}

fn hierarchical(
    course_docs: Vec<CourseDoc>,
    external_weeks: Vec<WeekDoc>,
) -> (Vec<Course>, Vec<Unit>, Vec<Week>) {
    let mut courses = Vec::with_capacity(course_docs.len());
    let mut units = Vec::new();
    let mut weeks = Vec::new();
    let mut course_by_unit: HashMap<UnitId, CourseId> = HashMap::new();

    for course_doc in course_docs {
        let course_id = course_doc.id.clone();
        for unit_doc in course_doc.units {
            course_by_unit.insert(unit_doc.id.clone(), course_id.clone());
            // Inline unit weeks predate the external week files; both are
            // accepted so older content keeps loading.
            for week_doc in unit_doc.weeks {
                weeks.push(week_doc.into_week(unit_doc.id.clone(), course_id.clone()));
            }
            units.push(Unit {
                id: unit_doc.id,
                title: unit_doc.title,
                course_id: course_id.clone(),
                description: unit_doc.description,
            });
        }
        courses.push(Course {
            id: course_doc.id,
            title: course_doc.title,
            description: course_doc.description,
        });
    }

    for week_doc in external_weeks {
        let Some(unit_id) = week_doc.unit_id.clone() else {
            warn!(week_id = %week_doc.id, "week document has no unitId, skipping");
            continue;
        };
        let Some(course_id) = course_by_unit.get(&unit_id).cloned() else {
            warn!(week_id = %week_doc.id, %unit_id, "week references an unknown unit, skipping");
            continue;
        };
        weeks.push(week_doc.into_week(unit_id, course_id));
    }

    (courses, units, weeks)
}

fn legacy_flat(week_docs: Vec<WeekDoc>) -> (Vec<Course>, Vec<Unit>, Vec<Week>) {
    let course_id = CourseId::new(DEFAULT_COURSE_ID);
    let unit_id = UnitId::new(DEFAULT_UNIT_ID);

    let courses = vec![Course {
        id: course_id.clone(),
        title: "Course".to_owned(),
        description: None,
    }];
    let units = vec![Unit {
        id: unit_id.clone(),
        title: "Lessons".to_owned(),
        course_id: course_id.clone(),
        description: None,
    }];
    let weeks = week_docs
        .into_iter()
        .map(|doc| doc.into_week(unit_id.clone(), course_id.clone()))
        .collect();

    (courses, units, weeks)
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
