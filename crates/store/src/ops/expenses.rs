use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    Expense, ExpenseCategory, ExpensePatch, Gateway, NewExpense, Pet, StoreResult,
    schedule::next_due_date,
};

use super::{Store, Throttled, ensure_positive, optional_text};

impl<G: Gateway> Store<G> {
    pub async fn load_expenses(&mut self) {
        self.load_slice::<Expense>().await;
    }

    /// Create an expense, deriving its next due date. Rate-limited per actor.
    pub async fn add_expense(&mut self, fields: NewExpense) -> StoreResult<Expense> {
        let result = self.insert_expense(fields).await;
        self.settle(result, "failed to add expense")
    }

    async fn insert_expense(&mut self, fields: NewExpense) -> StoreResult<Expense> {
        ensure_positive(fields.amount, "expense")?;
        self.find::<Pet>(fields.pet_id)?;
        self.find::<ExpenseCategory>(fields.category_id)?;

        let fields = NewExpense {
            description: optional_text(fields.description),
            receipt_ref: optional_text(fields.receipt_ref),
            next_due_date: next_due_date(fields.date, fields.recurrence),
            ..fields
        };
        self.admit(Throttled::ExpenseCreation)?;
        self.create_record::<Expense>(fields).await
    }

    /// Update an expense. The next due date is re-derived from the resulting
    /// date and recurrence whenever either of them changes.
    pub async fn update_expense(&mut self, id: Uuid, patch: ExpensePatch) {
        let result = self.patch_expense(id, patch).await;
        self.absorb(result, "failed to update expense");
    }

    async fn patch_expense(&mut self, id: Uuid, mut patch: ExpensePatch) -> StoreResult<Expense> {
        let current = self.find::<Expense>(id)?;
        let (date, recurrence) = (current.date, current.recurrence);

        if let Some(amount) = patch.amount {
            ensure_positive(amount, "expense")?;
        }
        if let Some(pet_id) = patch.pet_id {
            self.find::<Pet>(pet_id)?;
        }
        if let Some(category_id) = patch.category_id {
            self.find::<ExpenseCategory>(category_id)?;
        }

        patch.next_due_date = if patch.date.is_some() || patch.recurrence.is_some() {
            Some(next_due_date(
                patch.date.unwrap_or(date),
                patch.recurrence.unwrap_or(recurrence),
            ))
        } else {
            None
        };
        self.update_record::<Expense>(id, patch).await
    }

    pub async fn delete_expense(&mut self, id: Uuid) {
        let result = self.delete_record::<Expense>(id).await;
        self.absorb(result, "failed to delete expense");
    }

    /// When the current actor may create expenses again, if it is throttled.
    pub fn expense_creation_reset_time(&self) -> Option<Instant> {
        self.expense_limiter.reset_time(&self.actor_key())
    }
}
