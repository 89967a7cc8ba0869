//! Budget error types.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::CostCategory;
use crate::location::Country;

/// Budget-related errors.
#[derive(Debug, Error)]
pub enum BudgetError {
    /// Total budget is negative.
    #[error("Total budget cannot be negative: {0}")]
    NegativeTotal(Decimal),

    /// A category allocation is negative.
    #[error("Allocation for {category} cannot be negative: {amount}")]
    NegativeCategoryAllocation {
        /// Category with the bad allocation.
        category: CostCategory,
        /// Allocated amount.
        amount: Decimal,
    },

    /// A country allocation is negative.
    #[error("Allocation for {country} cannot be negative: {amount}")]
    NegativeCountryAllocation {
        /// Country with the bad allocation.
        country: Country,
        /// Allocated amount.
        amount: Decimal,
    },

    /// Category name not recognized.
    #[error("Unknown cost category: {0}")]
    UnknownCategory(String),
}
