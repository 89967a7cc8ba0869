//! Hand-off of saved budgets to persistence.

use crate::budget::BudgetDefinition;

/// Receives a budget when the editor saves.
///
/// The editor does not learn whether the receiver stored it.
pub trait BudgetSink {
    /// Called with the saved budget.
    fn on_budget_update(&mut self, budget: &BudgetDefinition);
}

impl<F> BudgetSink for F
where
    F: FnMut(&BudgetDefinition),
{
    fn on_budget_update(&mut self, budget: &BudgetDefinition) {
        self(budget);
    }
}
