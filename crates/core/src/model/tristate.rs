use serde::{Deserialize, Serialize};
use std::fmt;

/// How much of a parent node's descendant weeks are selected.
///
/// Weeks themselves are only ever `None` or `Selected`; `Partial` appears at
/// the unit and course levels, where it is always derived from the week set
/// and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    #[default]
    None,
    Partial,
    Selected,
}

impl TriState {
    /// Derives the state of a parent from its descendant week counts.
    ///
    /// A parent with zero weeks is always `None`, so an empty branch can
    /// never report itself fully selected.
    #[must_use]
    pub fn from_counts(selected: usize, total: usize) -> Self {
        if total == 0 || selected == 0 {
            TriState::None
        } else if selected == total {
            TriState::Selected
        } else {
            TriState::Partial
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriState::None => "none",
            TriState::Partial => "partial",
            TriState::Selected => "selected",
        };
        f.write_str(name)
    }
}
