//! Derived budget status.
//!
//! Everything here is recomputed from a [`BudgetDefinition`](super::BudgetDefinition)
//! and the trip's cost items on every query and is never persisted.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::CostCategory;
use crate::location::Country;

/// Spend as a percentage of an allocation, unrounded.
///
/// A zero allocation yields zero. A ratio too large to represent saturates
/// at `Decimal::MAX` (or `Decimal::MIN` when the signs differ).
pub(crate) fn utilization(spent: Decimal, allocated: Decimal) -> Decimal {
    if allocated.is_zero() {
        return Decimal::ZERO;
    }
    spent
        .checked_div(allocated)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if spent.is_sign_negative() == allocated.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        })
}

/// Allocated vs spent for one category or country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeBreakdown {
    /// Allocated amount.
    pub allocated: Decimal,
    /// Amount spent.
    pub spent: Decimal,
    /// Allocated minus spent; negative when over.
    pub remaining: Decimal,
    /// Spent as a percentage of allocated, 2 decimal places.
    pub percentage: Decimal,
}

impl ScopeBreakdown {
    /// Builds a breakdown from an allocation and the spend against it.
    #[must_use]
    pub fn new(allocated: Decimal, spent: Decimal) -> Self {
        Self {
            allocated,
            spent,
            remaining: allocated.saturating_sub(spent),
            percentage: utilization(spent, allocated).round_dp(2),
        }
    }

    /// Returns true if spend is above the allocation.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.remaining < Decimal::ZERO
    }
}

/// Severity of an alert, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Approaching the allocation.
    Info,
    /// Close to the allocation.
    Warning,
    /// Above the allocation.
    Exceeded,
}

/// What an alert applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "key", rename_all = "snake_case")]
pub enum AlertScope {
    /// The trip total.
    Total,
    /// A single spending category.
    Category(CostCategory),
    /// A single country.
    Country(Country),
}

impl AlertScope {
    /// Returns true for the trip-total scope.
    #[must_use]
    pub const fn is_total(&self) -> bool {
        matches!(self, Self::Total)
    }
}

impl std::fmt::Display for AlertScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Total => f.write_str("Trip"),
            Self::Category(category) => f.write_str(category.label()),
            Self::Country(country) => write!(f, "{country}"),
        }
    }
}

/// A threshold crossing on one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Severity.
    pub level: AlertLevel,
    /// Scope the alert applies to.
    pub scope: AlertScope,
    /// Amount spent in the scope.
    pub spent: Decimal,
    /// Amount allocated to the scope.
    pub allocated: Decimal,
    /// Spent as a percentage of allocated, 2 decimal places.
    pub percentage: Decimal,
    /// Human-readable description.
    pub message: String,
}

impl Alert {
    /// Builds an alert and its message.
    ///
    /// `percentage` is the unrounded utilization; it is rounded for storage.
    #[must_use]
    pub fn new(
        level: AlertLevel,
        scope: AlertScope,
        spent: Decimal,
        allocated: Decimal,
        percentage: Decimal,
    ) -> Self {
        let shown = percentage.round_dp(1);
        let message = match level {
            AlertLevel::Exceeded => format!(
                "{scope} budget exceeded by ${:.2} ({shown:.1}% used)",
                spent.saturating_sub(allocated).round_dp(2)
            ),
            AlertLevel::Warning => format!("{scope} budget is nearly used up ({shown:.1}% used)"),
            AlertLevel::Info => format!("{scope} budget has reached {shown:.1}%"),
        };

        Self {
            level,
            scope,
            spent,
            allocated,
            percentage: percentage.round_dp(2),
            message,
        }
    }
}

/// Spend against a budget definition, with alerts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetStatus {
    /// Total budget.
    pub total_budget: Decimal,
    /// Sum of every cost item.
    pub total_spent: Decimal,
    /// Total budget minus total spent.
    pub total_remaining: Decimal,
    /// Total spent as a percentage of the total budget, 2 decimal places.
    pub percentage_used: Decimal,
    /// One entry per allocated category.
    pub by_category: BTreeMap<CostCategory, ScopeBreakdown>,
    /// One entry per allocated country.
    pub by_country: BTreeMap<Country, ScopeBreakdown>,
    /// Alerts: total first, then categories, then countries.
    pub alerts: Vec<Alert>,
}

impl BudgetStatus {
    /// Returns true if any alert was raised.
    #[must_use]
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// Alerts of exactly `level`.
    pub fn alerts_at(&self, level: AlertLevel) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(move |a| a.level == level)
    }

    /// Most severe alert level raised, if any.
    #[must_use]
    pub fn worst_level(&self) -> Option<AlertLevel> {
        self.alerts.iter().map(|a| a.level).max()
    }
}
