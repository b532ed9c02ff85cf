use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a Course.
///
/// Ids are opaque, stable strings supplied by the content catalog; this
/// crate never interprets their contents.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(String);

/// Unique identifier for a Unit.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

/// Unique identifier for a Week.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekId(String);

/// Unique identifier for a vocabulary or phrase Item.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            /// Creates a new id from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(CourseId);
string_id!(UnitId);
string_id!(WeekId);
string_id!(ItemId);

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_id_display_is_raw_string() {
        let id = WeekId::new("week-03");
        assert_eq!(id.to_string(), "week-03");
        assert_eq!(id.as_str(), "week-03");
    }

    #[test]
    fn ids_with_same_text_are_equal() {
        assert_eq!(ItemId::from("v1"), ItemId::new(String::from("v1")));
    }

    #[test]
    fn debug_includes_type_name() {
        let id = CourseId::new("spanish-101");
        assert_eq!(format!("{id:?}"), "CourseId(spanish-101)");
    }
}
