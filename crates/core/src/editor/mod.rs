//! Interactive allocation editing.
//!
//! An [`AllocationEditor`] holds the category and country allocations of one
//! budget while a user edits them in dollars, percent of the total, or (for
//! countries) dollars per night, and produces a new
//! [`BudgetDefinition`](crate::budget::BudgetDefinition) on save.

pub mod error;
pub mod input;
pub mod session;
pub mod sink;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::EditorError;
pub use input::parse_input;
pub use session::AllocationEditor;
pub use sink::BudgetSink;
pub use types::{
    AllocationGroup, AllocationKey, Completeness, DisplayValue, GroupSummary, InputUnit,
};
