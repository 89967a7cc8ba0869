//! Budget allocation and alerting.

pub mod alerts;
pub mod calculator;
pub mod error;
pub mod status;
pub mod types;


pub use alerts::AlertPolicy;
pub use calculator::{AllocationCalculator, compute_status, default_allocation};
pub use error::BudgetError;
pub use status::{Alert, AlertLevel, AlertScope, BudgetStatus, ScopeBreakdown};
pub use types::{BudgetDefinition, CostCategory, CostItem, CostStatus};
