#![forbid(unsafe_code)]

//! The engines of the study tracker.
//!
//! [`selection::SelectionEngine`] owns the multi-select over the content
//! hierarchy; [`session`] owns the timed study session, its durable progress
//! merge, and the elapsed-display ticker. [`catalog`] loads the content
//! documents and [`highlight`] marks vocabulary inside phrase text.

pub mod catalog;
pub mod error;
pub mod highlight;
pub mod selection;
pub mod session;

pub use study_core::Clock;

pub use catalog::{load_from_dir, load_from_json};
pub use error::CatalogError;
pub use highlight::{Segment, highlight_phrase, vocab_forms};
pub use selection::{SelectionEngine, SelectionStates};
pub use session::{ElapsedTicker, SessionEngine, SessionFlush, StudySessionService};
