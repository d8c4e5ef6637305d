//! Read-only views over the snapshot. Aggregates are recomputed on every read.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use uuid::Uuid;

use crate::{
    Budget, Currency, Expense, ExpenseCategory, Money, Pet, Settings, UserCategoryPreference,
    reconcile::selected_categories,
    schedule::month_bounds,
    utilization::{Utilization, normalize},
};

use super::{Snapshot, Store};

/// Utilisation of one budget over the month containing a reference date.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    pub budget_id: Uuid,
    pub monthly_equivalent: Money,
    pub spent: Money,
    pub utilization: Utilization,
}

impl<G> Store<G> {
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.snapshot.settings.as_ref()
    }

    pub fn categories(&self) -> &[ExpenseCategory] {
        &self.snapshot.categories
    }

    pub fn preferences(&self) -> &[UserCategoryPreference] {
        &self.snapshot.preferences
    }

    pub fn pets(&self) -> &[Pet] {
        &self.snapshot.pets
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.snapshot.expenses
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.snapshot.budgets
    }

    pub fn pet(&self, id: Uuid) -> Option<&Pet> {
        self.snapshot.pets.iter().find(|pet| pet.id == id)
    }

    pub fn category(&self, id: Uuid) -> Option<&ExpenseCategory> {
        self.snapshot
            .categories
            .iter()
            .find(|category| category.id == id)
    }

    /// Message of the most recent failed action.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Categories visible in entry forms, in category order.
    pub fn get_user_selected_categories(&self) -> Vec<&ExpenseCategory> {
        selected_categories(&self.snapshot.categories, &self.snapshot.preferences)
    }

    pub fn expenses_for_pet(&self, pet_id: Uuid) -> Vec<&Expense> {
        self.snapshot
            .expenses
            .iter()
            .filter(|expense| expense.pet_id == pet_id)
            .collect()
    }

    /// Sum of every expense, per currency.
    pub fn total_spent(&self) -> BTreeMap<Currency, Money> {
        let mut totals = BTreeMap::new();
        for expense in &self.snapshot.expenses {
            *totals.entry(expense.currency).or_insert(Money::ZERO) += expense.amount;
        }
        totals
    }

    /// Spending per category and currency over the month containing `month`.
    pub fn spending_by_category(&self, month: NaiveDate) -> BTreeMap<(Uuid, Currency), Money> {
        let (first, last) = month_bounds(month);
        let mut totals = BTreeMap::new();
        for expense in self
            .snapshot
            .expenses
            .iter()
            .filter(|expense| first <= expense.date && expense.date <= last)
        {
            *totals
                .entry((expense.category_id, expense.currency))
                .or_insert(Money::ZERO) += expense.amount;
        }
        totals
    }

    /// Spending against `budget_id` in the month containing `reference`,
    /// compared with the budget's monthly equivalent.
    pub fn budget_status(&self, budget_id: Uuid, reference: NaiveDate) -> Option<BudgetStatus> {
        let budget = self
            .snapshot
            .budgets
            .iter()
            .find(|budget| budget.id == budget_id)?;
        Some(self.status_of(budget, reference))
    }

    /// Status of every budget covering `reference`.
    pub fn budget_statuses(&self, reference: NaiveDate) -> Vec<BudgetStatus> {
        self.snapshot
            .budgets
            .iter()
            .filter(|budget| budget.covers(reference))
            .map(|budget| self.status_of(budget, reference))
            .collect()
    }

    fn status_of(&self, budget: &Budget, reference: NaiveDate) -> BudgetStatus {
        let (first, last) = month_bounds(reference);
        let spent: Money = self
            .snapshot
            .expenses
            .iter()
            .filter(|expense| {
                expense.pet_id == budget.pet_id
                    && expense.category_id == budget.category_id
                    && expense.currency == budget.currency
                    && first <= expense.date
                    && expense.date <= last
            })
            .map(|expense| expense.amount)
            .sum();
        let monthly_equivalent = normalize(budget).monthly_equivalent;
        BudgetStatus {
            budget_id: budget.id,
            monthly_equivalent,
            spent,
            utilization: Utilization::new(spent, monthly_equivalent),
        }
    }

    /// Recurring expenses due within `horizon_days` of `today`, soonest first.
    pub fn upcoming_recurring(&self, today: NaiveDate, horizon_days: u64) -> Vec<&Expense> {
        let until = today
            .checked_add_days(Days::new(horizon_days))
            .unwrap_or(NaiveDate::MAX);
        let mut due: Vec<&Expense> = self
            .snapshot
            .expenses
            .iter()
            .filter(|expense| {
                expense
                    .next_due_date
                    .is_some_and(|date| today <= date && date <= until)
            })
            .collect();
        due.sort_by_key(|expense| expense.next_due_date);
        due
    }
}
