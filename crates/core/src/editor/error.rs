//! Allocation editor error types.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{AllocationGroup, AllocationKey, InputUnit};

/// Allocation editor errors.
///
/// None of these leave the session in a changed state.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Input could not be read as a number.
    #[error("Not a number: {0:?}")]
    InvalidNumber(String),

    /// Unit not offered for the group.
    #[error("{unit} input is not available for the {group} group")]
    UnitUnavailable {
        /// Group the unit was requested for.
        group: AllocationGroup,
        /// Requested unit.
        unit: InputUnit,
    },

    /// Value would make an amount or a group total unrepresentable.
    #[error("Value out of range: {0}")]
    OutOfRange(Decimal),

    /// No such item in the session.
    #[error("Unknown allocation item: {0}")]
    UnknownItem(AllocationKey),
}
