//! Budget data types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tripbudget_shared::types::{CostItemId, DestinationId};

use super::error::BudgetError;
use crate::location::Country;

/// Spending category of a cost item.
///
/// Ordering follows declaration order and drives the order of per-category
/// output and alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    /// Flights.
    Flight,
    /// Hotels, hostels, rentals.
    Accommodation,
    /// Tours, tickets, excursions.
    Activity,
    /// Meals and groceries.
    Food,
    /// Local transport.
    Transport,
    /// Courses and tuition.
    Education,
    /// Books, supplies, and other learning materials.
    EducationalMaterials,
    /// Museum visits, workshops, and other learning activities.
    EducationalActivities,
    /// Anything else.
    Other,
}

impl CostCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 9] = [
        Self::Flight,
        Self::Accommodation,
        Self::Activity,
        Self::Food,
        Self::Transport,
        Self::Education,
        Self::EducationalMaterials,
        Self::EducationalActivities,
        Self::Other,
    ];

    /// Wire name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Accommodation => "accommodation",
            Self::Activity => "activity",
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Education => "education",
            Self::EducationalMaterials => "educational_materials",
            Self::EducationalActivities => "educational_activities",
            Self::Other => "other",
        }
    }

    /// Human-readable label used in alert messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Flight => "Flight",
            Self::Accommodation => "Accommodation",
            Self::Activity => "Activity",
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Education => "Education",
            Self::EducationalMaterials => "Educational materials",
            Self::EducationalActivities => "Educational activities",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for CostCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CostCategory {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| BudgetError::UnknownCategory(s.to_string()))
    }
}

/// Lifecycle status of a cost item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostStatus {
    /// Rough guess.
    #[default]
    Estimated,
    /// Price looked up but not committed.
    Researched,
    /// Reserved.
    Booked,
    /// Paid in full.
    Paid,
}

/// A single recorded or estimated expenditure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostItem {
    /// Cost item ID.
    pub id: CostItemId,
    /// Spending category; items without one count as [`CostCategory::Other`].
    #[serde(default)]
    pub category: Option<CostCategory>,
    /// Amount in the reference currency.
    pub amount_usd: Decimal,
    /// ISO 4217 code of the currency the cost was quoted in.
    #[serde(default)]
    pub original_currency: Option<String>,
    /// Amount in the original currency.
    #[serde(default)]
    pub original_amount: Option<Decimal>,
    /// Destination the cost belongs to.
    #[serde(default)]
    pub destination_id: Option<DestinationId>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: CostStatus,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Date the cost applies to.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl CostItem {
    /// Creates an estimated cost with no destination.
    #[must_use]
    pub fn new(category: CostCategory, amount_usd: Decimal) -> Self {
        Self {
            id: CostItemId::new(),
            category: Some(category),
            amount_usd,
            original_currency: None,
            original_amount: None,
            destination_id: None,
            status: CostStatus::Estimated,
            notes: None,
            date: None,
        }
    }

    /// Attaches the cost to a destination.
    #[must_use]
    pub fn at(mut self, destination_id: DestinationId) -> Self {
        self.destination_id = Some(destination_id);
        self
    }

    /// Category used for aggregation.
    #[must_use]
    pub fn effective_category(&self) -> CostCategory {
        self.category.unwrap_or(CostCategory::Other)
    }
}

/// The user's allocation plan for a trip.
///
/// Holds only what the user entered. Percentages and per-day rates are
/// always derived, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetDefinition {
    /// Total budget in the reference currency.
    pub total_budget_usd: Decimal,
    /// Allocation per category. Need not cover every category.
    #[serde(default)]
    pub budgets_by_category: BTreeMap<CostCategory, Decimal>,
    /// Allocation per country.
    #[serde(default)]
    pub budgets_by_country: BTreeMap<Country, Decimal>,
    /// Contingency buffer in percent, informational.
    #[serde(default)]
    pub contingency_pct: Decimal,
    /// Notes per category.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub category_notes: BTreeMap<CostCategory, String>,
    /// Notes per country.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub country_notes: BTreeMap<Country, String>,
    /// Note on the category allocation as a whole.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_group_note: Option<String>,
    /// Note on the country allocation as a whole.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_group_note: Option<String>,
}

impl BudgetDefinition {
    /// Creates a budget with a total and no allocations.
    #[must_use]
    pub fn new(total_budget_usd: Decimal) -> Self {
        Self {
            total_budget_usd,
            ..Self::default()
        }
    }

    /// Sum of all category allocations.
    #[must_use]
    pub fn allocated_to_categories(&self) -> Decimal {
        self.budgets_by_category.values().copied().sum()
    }

    /// Sum of all country allocations.
    #[must_use]
    pub fn allocated_to_countries(&self) -> Decimal {
        self.budgets_by_country.values().copied().sum()
    }

    /// Rejects negative totals and allocations.
    ///
    /// The calculator itself accepts any value; this is for callers that
    /// want to refuse such budgets before they are stored.
    ///
    /// # Errors
    ///
    /// Returns the first negative amount found.
    pub fn validate(&self) -> Result<(), BudgetError> {
        if self.total_budget_usd < Decimal::ZERO {
            return Err(BudgetError::NegativeTotal(self.total_budget_usd));
        }
        if let Some((category, amount)) = self
            .budgets_by_category
            .iter()
            .find(|(_, a)| **a < Decimal::ZERO)
        {
            return Err(BudgetError::NegativeCategoryAllocation {
                category: *category,
                amount: *amount,
            });
        }
        if let Some((country, amount)) = self
            .budgets_by_country
            .iter()
            .find(|(_, a)| **a < Decimal::ZERO)
        {
            return Err(BudgetError::NegativeCountryAllocation {
                country: country.clone(),
                amount: *amount,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_category_wire_names() {
        for category in CostCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            assert_eq!(CostCategory::from_str(category.as_str()).unwrap(), category);
        }
    }

    #[test]
    fn test_category_from_str_rejects_unknown() {
        assert!(matches!(
            CostCategory::from_str("hotel"),
            Err(BudgetError::UnknownCategory(ref s)) if s == "hotel"
        ));
        assert_eq!(
            CostCategory::from_str(" Food ").unwrap(),
            CostCategory::Food
        );
    }

    #[test]
    fn test_missing_category_counts_as_other() {
        let mut item = CostItem::new(CostCategory::Food, dec!(10));
        item.category = None;
        assert_eq!(item.effective_category(), CostCategory::Other);
    }

    #[test]
    fn test_cost_item_deserialize_minimal() {
        let json = r#"{"id":"0194f1a2-0000-7000-8000-000000000001","amount_usd":"42.50"}"#;
        let item: CostItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.amount_usd, dec!(42.50));
        assert_eq!(item.category, None);
        assert_eq!(item.status, CostStatus::Estimated);
        assert!(item.destination_id.is_none());
    }

    #[test]
    fn test_budget_definition_json_shape() {
        let mut budget = BudgetDefinition::new(dec!(1000));
        budget
            .budgets_by_category
            .insert(CostCategory::Flight, dec!(500));
        budget
            .budgets_by_country
            .insert(Country::new("Japan"), dec!(700));

        let value = serde_json::to_value(&budget).unwrap();
        assert_eq!(value["budgets_by_category"]["flight"], "500");
        assert_eq!(value["budgets_by_country"]["Japan"], "700");
        assert!(value.get("category_notes").is_none());

        let back: BudgetDefinition = serde_json::from_value(value).unwrap();
        assert_eq!(back, budget);
    }

    #[test]
    fn test_allocated_sums() {
        let mut budget = BudgetDefinition::new(dec!(1000));
        budget
            .budgets_by_category
            .insert(CostCategory::Flight, dec!(500));
        budget
            .budgets_by_category
            .insert(CostCategory::Food, dec!(125.50));
        assert_eq!(budget.allocated_to_categories(), dec!(625.50));
        assert_eq!(budget.allocated_to_countries(), Decimal::ZERO);
    }

    #[test]
    fn test_validate() {
        let mut budget = BudgetDefinition::new(dec!(1000));
        assert!(budget.validate().is_ok());

        budget
            .budgets_by_country
            .insert(Country::new("Peru"), dec!(-5));
        match budget.validate() {
            Err(BudgetError::NegativeCountryAllocation { country, amount }) => {
                assert_eq!(country.as_str(), "Peru");
                assert_eq!(amount, dec!(-5));
            }
            other => panic!("expected a negative country allocation, got {other:?}"),
        }

        budget.total_budget_usd = dec!(-1);
        assert!(matches!(budget.validate(), Err(BudgetError::NegativeTotal(_))));
    }
}
