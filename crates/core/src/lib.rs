#![forbid(unsafe_code)]

//! Domain model for the multi-week study tracker: the course/unit/week
//! catalog, study items, tri-state selection values, and time helpers.
//!
//! This crate is pure data and queries; persistence and the engines that
//! mutate state live in the `storage` and `services` crates.

pub mod model;
pub mod time;

pub use time::Clock;
