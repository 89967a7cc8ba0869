//! Allocation editor types.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::budget::CostCategory;
use crate::location::Country;

/// Unit an allocation group is being edited in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputUnit {
    /// Absolute amount in the reference currency.
    #[default]
    Dollars,
    /// Percentage of the total budget.
    Percent,
    /// Amount per night spent in the country.
    PerDay,
}

impl InputUnit {
    /// Decimal places shown for values in this unit.
    #[must_use]
    pub const fn display_scale(self) -> u32 {
        match self {
            Self::Dollars | Self::PerDay => 0,
            Self::Percent => 1,
        }
    }

    /// Rounds a value the way it is displayed in this unit.
    #[must_use]
    pub fn round_for_display(self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.display_scale(), RoundingStrategy::MidpointAwayFromZero)
    }
}

impl std::fmt::Display for InputUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dollars => f.write_str("dollars"),
            Self::Percent => f.write_str("percent"),
            Self::PerDay => f.write_str("perday"),
        }
    }
}

/// One of the two independent allocation partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationGroup {
    /// Allocation by spending category.
    Category,
    /// Allocation by country.
    Country,
}

impl std::fmt::Display for AllocationGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category => f.write_str("category"),
            Self::Country => f.write_str("country"),
        }
    }
}

/// Identifies a single editable allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "group", content = "key", rename_all = "lowercase")]
pub enum AllocationKey {
    /// A category allocation.
    Category(CostCategory),
    /// A country allocation.
    Country(Country),
}

impl AllocationKey {
    /// Group the key belongs to.
    #[must_use]
    pub const fn group(&self) -> AllocationGroup {
        match self {
            Self::Category(_) => AllocationGroup::Category,
            Self::Country(_) => AllocationGroup::Country,
        }
    }
}

impl std::fmt::Display for AllocationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category(category) => write!(f, "category {category}"),
            Self::Country(country) => write!(f, "country {country}"),
        }
    }
}

impl From<CostCategory> for AllocationKey {
    fn from(category: CostCategory) -> Self {
        Self::Category(category)
    }
}

impl From<Country> for AllocationKey {
    fn from(country: Country) -> Self {
        Self::Country(country)
    }
}

/// What an input field shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayValue {
    /// Unit of `value`.
    pub unit: InputUnit,
    /// Shown value.
    pub value: Decimal,
}

/// Allocation totals for a group, in currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Sum of the group's allocations.
    pub total_allocated: Decimal,
    /// `total_allocated` as a percentage of the total budget, 2 decimal places.
    pub percentage: Decimal,
    /// Total budget minus `total_allocated`; negative when over-allocated.
    pub unallocated: Decimal,
}

/// Percent-mode readout, summed from the shown percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completeness {
    /// Sum of the percentages shown.
    pub allocated_percent: Decimal,
    /// 100 minus `allocated_percent`; negative when over 100.
    pub remaining_percent: Decimal,
}

impl Completeness {
    /// Returns true when the shown percentages add up to exactly 100.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining_percent.is_zero()
    }
}
