mod catalog;
mod ids;
mod item;
mod tristate;

pub use catalog::{Catalog, Course, Unit, Week};
pub use ids::{CourseId, ItemId, UnitId, WeekId};
pub use item::{Conjugations, Item, ItemKind, WordClass};
pub use tristate::TriState;
