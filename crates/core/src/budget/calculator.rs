//! Allocation calculator: spend totals, utilization, and alerts.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::alerts::AlertPolicy;
use super::status::{AlertScope, BudgetStatus, ScopeBreakdown, utilization};
use super::types::{BudgetDefinition, CostCategory, CostItem};
use crate::location::{Country, LocationDirectory};

/// Computes budget status from a budget definition and cost items.
///
/// Stateless apart from its alert thresholds; every call is independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationCalculator {
    policy: AlertPolicy,
}

impl AllocationCalculator {
    /// Creates a calculator with the given alert thresholds.
    #[must_use]
    pub const fn new(policy: AlertPolicy) -> Self {
        Self { policy }
    }

    /// Alert thresholds in use.
    #[must_use]
    pub const fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    /// Computes spend per category and per country, overall utilization, and alerts.
    ///
    /// The category and country views are built independently: a cost item
    /// whose destination does not resolve is missing from `by_country` but
    /// still counted in the totals and in its category. Only scopes present
    /// in the budget's allocation maps appear in the breakdowns.
    #[must_use]
    pub fn compute_status<L>(
        &self,
        budget: &BudgetDefinition,
        cost_items: &[CostItem],
        locations: &L,
    ) -> BudgetStatus
    where
        L: LocationDirectory + ?Sized,
    {
        let spent_by_category = spend_by_category(cost_items);
        let spent_by_country = spend_by_country(cost_items, locations);

        let total_budget = budget.total_budget_usd;
        let total_spent = saturating_sum(spent_by_category.values().copied());

        let by_category: BTreeMap<CostCategory, ScopeBreakdown> = budget
            .budgets_by_category
            .iter()
            .map(|(category, allocated)| {
                let spent = spent_by_category
                    .get(category)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                (*category, ScopeBreakdown::new(*allocated, spent))
            })
            .collect();

        let by_country: BTreeMap<Country, ScopeBreakdown> = budget
            .budgets_by_country
            .iter()
            .map(|(country, allocated)| {
                let spent = spent_by_country
                    .get(country)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                (country.clone(), ScopeBreakdown::new(*allocated, spent))
            })
            .collect();

        let policy = &self.policy;
        let mut alerts = Vec::new();
        alerts.extend(policy.evaluate(AlertScope::Total, total_spent, total_budget));
        alerts.extend(by_category.iter().filter_map(|(category, b)| {
            policy.evaluate(AlertScope::Category(*category), b.spent, b.allocated)
        }));
        alerts.extend(by_country.iter().filter_map(|(country, b)| {
            policy.evaluate(AlertScope::Country(country.clone()), b.spent, b.allocated)
        }));

        debug!(
            cost_items = cost_items.len(),
            %total_spent,
            %total_budget,
            alerts = alerts.len(),
            "Computed budget status"
        );

        BudgetStatus {
            total_budget,
            total_spent,
            total_remaining: total_budget.saturating_sub(total_spent),
            percentage_used: utilization(total_spent, total_budget).round_dp(2),
            by_category,
            by_country,
            alerts,
        }
    }

    /// Seeds a budget from current spend plus a contingency buffer.
    ///
    /// The total and every category and country allocation are the current
    /// spend multiplied by `1 + contingency_pct / 100`, rounded to cents.
    /// A negative contingency is accepted and yields an under-buffered budget.
    /// Amounts too large to represent saturate at `Decimal::MAX`.
    #[must_use]
    pub fn default_allocation<L>(
        cost_items: &[CostItem],
        locations: &L,
        contingency_pct: Decimal,
    ) -> BudgetDefinition
    where
        L: LocationDirectory + ?Sized,
    {
        let multiplier = Decimal::ONE.saturating_add(contingency_pct / Decimal::ONE_HUNDRED);
        let buffered = |amount: Decimal| amount.saturating_mul(multiplier).round_dp(2);

        let total_spent = saturating_sum(cost_items.iter().map(|item| item.amount_usd));

        let budget = BudgetDefinition {
            total_budget_usd: buffered(total_spent),
            budgets_by_category: spend_by_category(cost_items)
                .into_iter()
                .map(|(category, spent)| (category, buffered(spent)))
                .collect(),
            budgets_by_country: spend_by_country(cost_items, locations)
                .into_iter()
                .map(|(country, spent)| (country, buffered(spent)))
                .collect(),
            contingency_pct,
            ..BudgetDefinition::default()
        };

        debug!(
            cost_items = cost_items.len(),
            %contingency_pct,
            total_budget = %budget.total_budget_usd,
            "Seeded default allocation"
        );

        budget
    }
}

/// Sums cost items per category.
fn spend_by_category(cost_items: &[CostItem]) -> BTreeMap<CostCategory, Decimal> {
    let mut totals = BTreeMap::new();
    for item in cost_items {
        let total = totals
            .entry(item.effective_category())
            .or_insert(Decimal::ZERO);
        *total = total.saturating_add(item.amount_usd);
    }
    totals
}

/// Sums cost items per resolved country, skipping items without one.
fn spend_by_country<L>(cost_items: &[CostItem], locations: &L) -> BTreeMap<Country, Decimal>
where
    L: LocationDirectory + ?Sized,
{
    let mut totals = BTreeMap::new();
    for item in cost_items {
        let country = item
            .destination_id
            .as_ref()
            .and_then(|id| locations.resolve_country(id));
        match country {
            Some(country) => {
                let total = totals.entry(country.clone()).or_insert(Decimal::ZERO);
                *total = total.saturating_add(item.amount_usd);
            }
            None => trace!(cost_item = %item.id, "No country for cost item"),
        }
    }
    totals
}

fn saturating_sum(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Computes budget status with the standard alert thresholds.
#[must_use]
pub fn compute_status<L>(
    budget: &BudgetDefinition,
    cost_items: &[CostItem],
    locations: &L,
) -> BudgetStatus
where
    L: LocationDirectory + ?Sized,
{
    AllocationCalculator::default().compute_status(budget, cost_items, locations)
}

/// Seeds a budget from current spend; see [`AllocationCalculator::default_allocation`].
#[must_use]
pub fn default_allocation<L>(
    cost_items: &[CostItem],
    locations: &L,
    contingency_pct: Decimal,
) -> BudgetDefinition
where
    L: LocationDirectory + ?Sized,
{
    AllocationCalculator::default_allocation(cost_items, locations, contingency_pct)
}
