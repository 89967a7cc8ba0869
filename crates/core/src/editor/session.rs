//! Allocation editing session.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, info};
use tripbudget_shared::{EditorConfig, NonNumericInput};

use super::error::EditorError;
use super::input::parse_input;
use super::sink::BudgetSink;
use super::types::{
    AllocationGroup, AllocationKey, Completeness, DisplayValue, GroupSummary, InputUnit,
};
use crate::budget::status::utilization;
use crate::budget::{BudgetDefinition, CostCategory};
use crate::location::{Country, DestinationDirectory};

/// One editable allocation.
///
/// `amount` is the only stored value; every unit is derived from it.
#[derive(Debug, Clone)]
struct AllocationItem {
    amount: Decimal,
    /// Nights in the country. `None` for categories, which have no per-day unit.
    days: Option<u32>,
    /// Value as typed in the group's current unit, shown until the unit changes.
    entered: Option<Decimal>,
    /// Whether the loaded budget had this key.
    in_source: bool,
}

impl AllocationItem {
    fn new(amount: Decimal, days: Option<u32>, in_source: bool) -> Self {
        Self {
            amount,
            days,
            entered: None,
            in_source,
        }
    }

    /// Amount expressed in `unit`, unrounded.
    fn value_in(&self, unit: InputUnit, total_budget: Decimal) -> Decimal {
        match unit {
            InputUnit::Dollars => self.amount,
            InputUnit::Percent => utilization(self.amount, total_budget),
            InputUnit::PerDay => match self.days {
                Some(days) if days > 0 => self.amount / Decimal::from(days),
                _ => Decimal::ZERO,
            },
        }
    }

    /// Amount that `value` in `unit` stands for, or `None` if it overflows.
    fn amount_from(
        &self,
        unit: InputUnit,
        value: Decimal,
        total_budget: Decimal,
    ) -> Option<Decimal> {
        match unit {
            InputUnit::Dollars => Some(value),
            InputUnit::Percent => (value / Decimal::ONE_HUNDRED).checked_mul(total_budget),
            InputUnit::PerDay => value.checked_mul(Decimal::from(self.days.unwrap_or(0))),
        }
    }

    fn shown(&self, unit: InputUnit, total_budget: Decimal) -> Decimal {
        self.entered
            .unwrap_or_else(|| unit.round_for_display(self.value_in(unit, total_budget)))
    }

    fn should_save(&self) -> bool {
        self.in_source || !self.amount.is_zero()
    }
}

/// Unit and items of one allocation group.
#[derive(Debug, Clone)]
struct GroupState<K: Ord> {
    unit: InputUnit,
    items: BTreeMap<K, AllocationItem>,
    note: Option<String>,
}

impl<K: Ord> GroupState<K> {
    fn new(items: BTreeMap<K, AllocationItem>, note: Option<String>) -> Self {
        Self {
            unit: InputUnit::Dollars,
            items,
            note,
        }
    }

    fn set_unit(&mut self, unit: InputUnit) {
        self.unit = unit;
        self.forget_entered();
    }

    fn forget_entered(&mut self) {
        for item in self.items.values_mut() {
            item.entered = None;
        }
    }

    /// Group total with `key` set to `amount`, or `None` if it overflows.
    fn total_with(&self, key: &K, amount: Decimal) -> Option<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |sum, (k, item)| {
            sum.checked_add(if k == key { amount } else { item.amount })
        })
    }

    fn summary(&self, total_budget: Decimal) -> GroupSummary {
        let total_allocated = self
            .items
            .values()
            .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.amount));
        GroupSummary {
            total_allocated,
            percentage: utilization(total_allocated, total_budget).round_dp(2),
            unallocated: total_budget.saturating_sub(total_allocated),
        }
    }

    fn completeness(&self, total_budget: Decimal) -> Option<Completeness> {
        if self.unit != InputUnit::Percent {
            return None;
        }
        let allocated_percent = self
            .items
            .values()
            .map(|item| item.shown(InputUnit::Percent, total_budget))
            .fold(Decimal::ZERO, Decimal::saturating_add);
        Some(Completeness {
            allocated_percent,
            remaining_percent: Decimal::ONE_HUNDRED.saturating_sub(allocated_percent),
        })
    }

    fn saved_amounts(&self) -> BTreeMap<K, Decimal>
    where
        K: Clone,
    {
        self.items
            .iter()
            .filter(|(_, item)| item.should_save())
            .map(|(key, item)| (key.clone(), item.amount.round_dp(2)))
            .collect()
    }
}

/// An interactive session over one budget's category and country allocations.
///
/// Each group is edited in its own unit. Switching units only changes what
/// is displayed; the stored currency amounts stay exactly as they were, so
/// any number of unit switches is lossless.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use rust_decimal_macros::dec;
/// use tripbudget_core::budget::{BudgetDefinition, CostCategory};
/// use tripbudget_core::editor::{AllocationEditor, AllocationGroup, InputUnit};
/// use tripbudget_shared::EditorConfig;
///
/// let budget = BudgetDefinition::new(dec!(2000));
/// let mut editor = AllocationEditor::new(&budget, &BTreeMap::new(), EditorConfig::default());
///
/// editor.set_mode(AllocationGroup::Category, InputUnit::Percent).unwrap();
/// editor.set_value(&CostCategory::Flight.into(), "25").unwrap();
/// editor.set_mode(AllocationGroup::Category, InputUnit::Dollars).unwrap();
///
/// let shown = editor.display(&CostCategory::Flight.into()).unwrap();
/// assert_eq!(shown.value, dec!(500));
/// assert_eq!(editor.save().budgets_by_category[&CostCategory::Flight], dec!(500));
/// ```
#[derive(Debug, Clone)]
pub struct AllocationEditor {
    total_budget: Decimal,
    contingency_pct: Decimal,
    categories: GroupState<CostCategory>,
    countries: GroupState<Country>,
    category_notes: BTreeMap<CostCategory, String>,
    country_notes: BTreeMap<Country, String>,
    non_numeric_input: NonNumericInput,
    dirty: bool,
}

impl AllocationEditor {
    /// Opens a session on `budget`.
    ///
    /// Every category is editable. Countries are those in the budget plus
    /// those in `days_by_country`, which also supplies the nights used for
    /// per-day values; a country with no entry there has zero days.
    #[must_use]
    pub fn new(
        budget: &BudgetDefinition,
        days_by_country: &BTreeMap<Country, u32>,
        config: EditorConfig,
    ) -> Self {
        let categories: BTreeMap<CostCategory, AllocationItem> = CostCategory::ALL
            .into_iter()
            .map(|category| {
                let allocated = budget.budgets_by_category.get(&category);
                let item = AllocationItem::new(
                    allocated.copied().unwrap_or(Decimal::ZERO),
                    None,
                    allocated.is_some(),
                );
                (category, item)
            })
            .collect();

        let mut countries: BTreeMap<Country, AllocationItem> = budget
            .budgets_by_country
            .iter()
            .map(|(country, amount)| {
                let days = days_by_country.get(country).copied().unwrap_or(0);
                (
                    country.clone(),
                    AllocationItem::new(*amount, Some(days), true),
                )
            })
            .collect();
        for (country, days) in days_by_country {
            countries
                .entry(country.clone())
                .or_insert_with(|| AllocationItem::new(Decimal::ZERO, Some(*days), false));
        }

        Self {
            total_budget: budget.total_budget_usd,
            contingency_pct: budget.contingency_pct,
            categories: GroupState::new(categories, budget.category_group_note.clone()),
            countries: GroupState::new(countries, budget.country_group_note.clone()),
            category_notes: budget.category_notes.clone(),
            country_notes: budget.country_notes.clone(),
            non_numeric_input: config.non_numeric_input,
            dirty: false,
        }
    }

    /// Opens a session with per-country days taken from the trip's destinations.
    #[must_use]
    pub fn for_trip(
        budget: &BudgetDefinition,
        destinations: &DestinationDirectory,
        config: EditorConfig,
    ) -> Self {
        Self::new(budget, &destinations.nights_by_country(), config)
    }

    /// Total budget the percentages refer to.
    #[must_use]
    pub const fn total_budget(&self) -> Decimal {
        self.total_budget
    }

    /// Unit `group` is currently edited in.
    #[must_use]
    pub const fn mode(&self, group: AllocationGroup) -> InputUnit {
        match group {
            AllocationGroup::Category => self.categories.unit,
            AllocationGroup::Country => self.countries.unit,
        }
    }

    /// Items of `group`, in display order.
    #[must_use]
    pub fn keys(&self, group: AllocationGroup) -> Vec<AllocationKey> {
        match group {
            AllocationGroup::Category => self
                .categories
                .items
                .keys()
                .map(|c| AllocationKey::Category(*c))
                .collect(),
            AllocationGroup::Country => self
                .countries
                .items
                .keys()
                .map(|c| AllocationKey::Country(c.clone()))
                .collect(),
        }
    }

    /// Returns true if anything changed since the session opened or last saved.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Switches the unit `group` is edited in.
    ///
    /// Stored amounts are untouched; only the displayed values change.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::UnitUnavailable` for per-day on categories.
    pub fn set_mode(&mut self, group: AllocationGroup, unit: InputUnit) -> Result<(), EditorError> {
        match group {
            AllocationGroup::Category => {
                if unit == InputUnit::PerDay {
                    return Err(EditorError::UnitUnavailable { group, unit });
                }
                self.categories.set_unit(unit);
            }
            AllocationGroup::Country => self.countries.set_unit(unit),
        }
        debug!(%group, %unit, "Allocation unit changed");
        Ok(())
    }

    /// Sets an allocation from raw input in the group's current unit.
    ///
    /// Returns the resulting currency amount.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::UnknownItem` for a country not in the session,
    /// `EditorError::InvalidNumber` when the input is not a number and the
    /// session rejects such input, or `EditorError::OutOfRange` when the
    /// value is too large to allocate.
    pub fn set_value(&mut self, key: &AllocationKey, raw: &str) -> Result<Decimal, EditorError> {
        let value = parse_input(raw, self.non_numeric_input)?;
        self.set_number(key, value)
    }

    /// Sets an allocation from an already-parsed value in the group's current unit.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::UnknownItem` for a country not in the session,
    /// or `EditorError::OutOfRange` when the resulting amount or group total
    /// cannot be represented. The session is unchanged on error.
    pub fn set_number(
        &mut self,
        key: &AllocationKey,
        value: Decimal,
    ) -> Result<Decimal, EditorError> {
        let unit = self.mode(key.group());
        let amount = self
            .item(key)?
            .amount_from(unit, value, self.total_budget)
            .ok_or(EditorError::OutOfRange(value))?;
        let group_total = match key {
            AllocationKey::Category(category) => self.categories.total_with(category, amount),
            AllocationKey::Country(country) => self.countries.total_with(country, amount),
        };
        if group_total.is_none() {
            return Err(EditorError::OutOfRange(value));
        }

        let item = self.item_mut(key)?;
        item.amount = amount;
        item.entered = Some(value);
        self.dirty = true;

        debug!(%key, %unit, %value, %amount, "Allocation set");
        Ok(amount)
    }

    /// What the input field for `key` shows in its group's current unit.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::UnknownItem` for a country not in the session.
    pub fn display(&self, key: &AllocationKey) -> Result<DisplayValue, EditorError> {
        let unit = self.mode(key.group());
        let item = self.item(key)?;
        Ok(DisplayValue {
            unit,
            value: item.shown(unit, self.total_budget),
        })
    }

    /// The value of `key` as it would be shown in `unit`.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::UnknownItem` for a country not in the session,
    /// or `EditorError::UnitUnavailable` for per-day on a category.
    pub fn display_in(
        &self,
        key: &AllocationKey,
        unit: InputUnit,
    ) -> Result<DisplayValue, EditorError> {
        if unit == self.mode(key.group()) {
            return self.display(key);
        }
        if unit == InputUnit::PerDay && key.group() == AllocationGroup::Category {
            return Err(EditorError::UnitUnavailable {
                group: AllocationGroup::Category,
                unit,
            });
        }
        let item = self.item(key)?;
        Ok(DisplayValue {
            unit,
            value: unit.round_for_display(item.value_in(unit, self.total_budget)),
        })
    }

    /// Stored currency amount for `key`.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::UnknownItem` for a country not in the session.
    pub fn amount(&self, key: &AllocationKey) -> Result<Decimal, EditorError> {
        self.item(key).map(|item| item.amount)
    }

    /// Allocation totals for `group`.
    #[must_use]
    pub fn summary(&self, group: AllocationGroup) -> GroupSummary {
        match group {
            AllocationGroup::Category => self.categories.summary(self.total_budget),
            AllocationGroup::Country => self.countries.summary(self.total_budget),
        }
    }

    /// Sum of the shown percentages and the remainder to 100.
    ///
    /// Only available while `group` is in percent mode; it is computed from
    /// what the user sees, not from the currency amounts, so the two never
    /// visibly disagree because of rounding.
    #[must_use]
    pub fn completeness(&self, group: AllocationGroup) -> Option<Completeness> {
        match group {
            AllocationGroup::Category => self.categories.completeness(self.total_budget),
            AllocationGroup::Country => self.countries.completeness(self.total_budget),
        }
    }

    /// Changes the total budget.
    ///
    /// Allocations keep their currency amounts, so their percentages change.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::InvalidNumber` when the input is rejected.
    pub fn set_total_budget(&mut self, raw: &str) -> Result<Decimal, EditorError> {
        let total = parse_input(raw, self.non_numeric_input)?;
        self.total_budget = total;
        if self.categories.unit == InputUnit::Percent {
            self.categories.forget_entered();
        }
        if self.countries.unit == InputUnit::Percent {
            self.countries.forget_entered();
        }
        self.dirty = true;
        debug!(%total, "Total budget set");
        Ok(total)
    }

    /// Changes the contingency percentage.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::InvalidNumber` when the input is rejected.
    pub fn set_contingency(&mut self, raw: &str) -> Result<Decimal, EditorError> {
        let pct = parse_input(raw, self.non_numeric_input)?;
        self.contingency_pct = pct;
        self.dirty = true;
        Ok(pct)
    }

    /// Sets or clears (with blank text) the note on one allocation.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::UnknownItem` for a country not in the session.
    pub fn set_note(&mut self, key: &AllocationKey, note: &str) -> Result<(), EditorError> {
        self.item(key)?;
        let note = normalize_note(note);
        match key {
            AllocationKey::Category(category) => match note {
                Some(note) => {
                    self.category_notes.insert(*category, note);
                }
                None => {
                    self.category_notes.remove(category);
                }
            },
            AllocationKey::Country(country) => match note {
                Some(note) => {
                    self.country_notes.insert(country.clone(), note);
                }
                None => {
                    self.country_notes.remove(country);
                }
            },
        }
        self.dirty = true;
        Ok(())
    }

    /// Sets or clears (with blank text) the note on a whole group.
    pub fn set_group_note(&mut self, group: AllocationGroup, note: &str) {
        let note = normalize_note(note);
        match group {
            AllocationGroup::Category => self.categories.note = note,
            AllocationGroup::Country => self.countries.note = note,
        }
        self.dirty = true;
    }

    /// Adds a country to the session, or updates its days if present.
    pub fn add_country(&mut self, country: Country, days: u32) {
        self.countries
            .items
            .entry(country)
            .and_modify(|item| item.days = Some(days))
            .or_insert_with(|| AllocationItem::new(Decimal::ZERO, Some(days), false));
        self.dirty = true;
    }

    /// Builds the budget the session currently describes.
    ///
    /// Amounts are rounded to cents. An allocation is included if the loaded
    /// budget had it or it is non-zero.
    #[must_use]
    pub fn to_budget(&self) -> BudgetDefinition {
        BudgetDefinition {
            total_budget_usd: self.total_budget,
            budgets_by_category: self.categories.saved_amounts(),
            budgets_by_country: self.countries.saved_amounts(),
            contingency_pct: self.contingency_pct,
            category_notes: self.category_notes.clone(),
            country_notes: self.country_notes.clone(),
            category_group_note: self.categories.note.clone(),
            country_group_note: self.countries.note.clone(),
        }
    }

    /// Produces the budget and marks the session clean.
    pub fn save(&mut self) -> BudgetDefinition {
        let budget = self.to_budget();
        self.dirty = false;
        info!(
            total_budget = %budget.total_budget_usd,
            categories = budget.budgets_by_category.len(),
            countries = budget.budgets_by_country.len(),
            "Budget allocation saved"
        );
        budget
    }

    /// Saves and hands the budget to `sink`.
    pub fn save_into<S>(&mut self, sink: &mut S) -> BudgetDefinition
    where
        S: BudgetSink + ?Sized,
    {
        let budget = self.save();
        sink.on_budget_update(&budget);
        budget
    }

    fn item(&self, key: &AllocationKey) -> Result<&AllocationItem, EditorError> {
        match key {
            AllocationKey::Category(category) => self.categories.items.get(category),
            AllocationKey::Country(country) => self.countries.items.get(country),
        }
        .ok_or_else(|| EditorError::UnknownItem(key.clone()))
    }

    fn item_mut(&mut self, key: &AllocationKey) -> Result<&mut AllocationItem, EditorError> {
        match key {
            AllocationKey::Category(category) => self.categories.items.get_mut(category),
            AllocationKey::Country(country) => self.countries.items.get_mut(country),
        }
        .ok_or_else(|| EditorError::UnknownItem(key.clone()))
    }
}

fn normalize_note(note: &str) -> Option<String> {
    let trimmed = note.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
