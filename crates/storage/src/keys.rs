//! The key scheme for persisted progress.
//!
//! Keys are flat strings so any key-value backend can serve them. Reviewed
//! progress is scoped per kind and week; the resume duration is a single
//! process-wide key.

use study_core::model::{ItemKind, WeekId};

/// Key holding the elapsed milliseconds retained by the last `stop`.
pub const RESUME_ELAPSED_KEY: &str = "studySession.lastElapsedMs";

/// Key holding the ever-reviewed item-id array for one kind of one week.
#[must_use]
pub fn reviewed_key(kind: ItemKind, week_id: &WeekId) -> String {
    let kind = match kind {
        ItemKind::Vocab => "vocabReviewed",
        ItemKind::Phrase => "phraseReviewed",
    };
    format!("progress.{kind}.{week_id}")
}
