//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted while loading a content catalog.
///
/// Only loading can fail; once a catalog exists, every engine operation is
/// total over its inputs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {name}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("config has neither courses nor weeks")]
    UnrecognizedFormat,
}
