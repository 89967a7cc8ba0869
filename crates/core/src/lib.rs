//! Core business logic for Tripbudget.
//!
//! This crate contains pure business logic with ZERO I/O dependencies.
//! All domain types, alert rules, and allocation math live here.
//!
//! # Modules
//!
//! - `budget` - Spend totals, utilization, and alerts for a trip budget
//! - `editor` - Interactive allocation editing in dollars, percent, or per-day units
//! - `location` - Trip destinations and country resolution

pub mod budget;
pub mod editor;
pub mod location;

pub use budget::{
    Alert, AlertLevel, AlertPolicy, AlertScope, AllocationCalculator, BudgetDefinition,
    BudgetError, BudgetStatus, CostCategory, CostItem, CostStatus, ScopeBreakdown,
    compute_status, default_allocation,
};
pub use editor::{AllocationEditor, BudgetSink, EditorError, InputUnit};
pub use location::{Country, Destination, DestinationDirectory, LocationDirectory};
