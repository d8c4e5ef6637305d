use uuid::Uuid;

use crate::{
    CategoryPatch, ExpenseCategory, Gateway, NewCategory, StoreError, StoreResult,
};

use super::{Store, optional_text, require_text};

impl<G: Gateway> Store<G> {
    pub async fn load_categories(&mut self) {
        self.load_slice::<ExpenseCategory>().await;
    }

    pub async fn add_category(&mut self, fields: NewCategory) -> StoreResult<ExpenseCategory> {
        let result = self.insert_category(fields).await;
        self.settle(result, "failed to add category")
    }

    /// Create a category from a catalog building block, tagged with the block key.
    pub async fn add_category_from_building_block(
        &mut self,
        key: &str,
    ) -> StoreResult<ExpenseCategory> {
        let result = match self.catalog.by_key(key) {
            Some(block) => self.insert_category(block.new_category()).await,
            None => Err(StoreError::NotFound(format!("building block {key}"))),
        };
        self.settle(result, "failed to add category")
    }

    async fn insert_category(&mut self, fields: NewCategory) -> StoreResult<ExpenseCategory> {
        let fields = NewCategory {
            name: require_text(&fields.name, "category name")?,
            color: require_text(&fields.color, "category color")?,
            icon: optional_text(fields.icon),
            builtin_key: fields.builtin_key,
        };
        let category = self.create_record::<ExpenseCategory>(fields).await?;
        if self.catalog.is_default(&category) {
            // Default categories are visible from the start.
            let shown = self.write_visibility(category.id, true).await;
            self.absorb(shown, "failed to show default category");
        }
        Ok(category)
    }

    pub async fn update_category(&mut self, id: Uuid, mut patch: CategoryPatch) {
        let result = async {
            if let Some(name) = patch.name.as_deref() {
                patch.name = Some(require_text(name, "category name")?);
            }
            self.update_record::<ExpenseCategory>(id, patch).await
        }
        .await;
        self.absorb(result, "failed to update category");
    }

    /// Delete a category together with the expenses, budgets and preferences
    /// referencing it.
    pub async fn delete_category(&mut self, id: Uuid) {
        let result = self.remove_category(id).await;
        self.absorb(result, "failed to delete category");
    }

    async fn remove_category(&mut self, id: Uuid) -> StoreResult<()> {
        let dependents = self
            .snapshot
            .expenses
            .iter()
            .filter(|expense| expense.category_id == id)
            .count()
            + self
                .snapshot
                .budgets
                .iter()
                .filter(|budget| budget.category_id == id)
                .count();
        self.ensure_deletable("category", dependents)?;

        self.delete_record::<ExpenseCategory>(id).await?;
        self.snapshot.expenses.retain(|expense| expense.category_id != id);
        self.snapshot.budgets.retain(|budget| budget.category_id != id);

        let before = self.snapshot.preferences.len();
        self.snapshot
            .preferences
            .retain(|preference| preference.category_id != id);
        if self.snapshot.preferences.len() != before {
            self.store_cache();
        }
        tracing::info!(%id, dependents, "category deleted");
        Ok(())
    }
}
