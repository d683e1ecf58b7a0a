//! Request matching: structural equality and stub selection.

mod deep_equals;
mod engine;

pub use deep_equals::{optional_equals, DeepEquals};
pub use engine::{partial_passes, select, specificity, strict_matches};
