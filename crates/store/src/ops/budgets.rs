use uuid::Uuid;

use crate::{
    Budget, BudgetPatch, ExpenseCategory, Gateway, NewBudget, Pet, StoreResult,
    schedule::period_end,
};

use super::{Store, ensure_positive};

impl<G: Gateway> Store<G> {
    pub async fn load_budgets(&mut self) {
        self.load_slice::<Budget>().await;
    }

    /// Create a budget, deriving its end date from start date and period.
    pub async fn add_budget(&mut self, fields: NewBudget) -> StoreResult<Budget> {
        let result = self.insert_budget(fields).await;
        self.settle(result, "failed to add budget")
    }

    async fn insert_budget(&mut self, fields: NewBudget) -> StoreResult<Budget> {
        ensure_positive(fields.amount, "budget")?;
        self.find::<Pet>(fields.pet_id)?;
        self.find::<ExpenseCategory>(fields.category_id)?;

        let fields = NewBudget {
            end_date: period_end(fields.start_date, fields.period),
            ..fields
        };
        self.create_record::<Budget>(fields).await
    }

    pub async fn update_budget(&mut self, id: Uuid, patch: BudgetPatch) {
        let result = self.patch_budget(id, patch).await;
        self.absorb(result, "failed to update budget");
    }

    async fn patch_budget(&mut self, id: Uuid, mut patch: BudgetPatch) -> StoreResult<Budget> {
        let current = self.find::<Budget>(id)?;
        let (start_date, period) = (current.start_date, current.period);

        if let Some(amount) = patch.amount {
            ensure_positive(amount, "budget")?;
        }
        if let Some(pet_id) = patch.pet_id {
            self.find::<Pet>(pet_id)?;
        }
        if let Some(category_id) = patch.category_id {
            self.find::<ExpenseCategory>(category_id)?;
        }

        patch.end_date = if patch.start_date.is_some() || patch.period.is_some() {
            Some(period_end(
                patch.start_date.unwrap_or(start_date),
                patch.period.unwrap_or(period),
            ))
        } else {
            None
        };
        self.update_record::<Budget>(id, patch).await
    }

    pub async fn delete_budget(&mut self, id: Uuid) {
        let result = self.delete_record::<Budget>(id).await;
        self.absorb(result, "failed to delete budget");
    }
}
