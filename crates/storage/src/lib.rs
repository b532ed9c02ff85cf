#![forbid(unsafe_code)]

//! Durable per-key progress storage.
//!
//! Everything the study tracker persists fits a small string-keyed JSON
//! value store: one array of item ids per (kind, week) pair and one global
//! resume-elapsed number. The [`store::ProgressStore`] trait captures that
//! contract; `sqlite` provides the durable backend and
//! [`store::InMemoryStore`] backs tests and prototyping.

pub mod keys;
pub mod sqlite;
pub mod store;

pub use keys::{RESUME_ELAPSED_KEY, reviewed_key};
pub use sqlite::{SqliteInitError, SqliteStore};
pub use store::{InMemoryStore, ProgressStore, StorageError};
