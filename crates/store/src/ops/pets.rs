use tokio::time::Instant;
use uuid::Uuid;

use crate::{Gateway, NewPet, Pet, PetPatch, StoreResult};

use super::{Store, Throttled, optional_text, require_text};

impl<G: Gateway> Store<G> {
    pub async fn load_pets(&mut self) {
        self.load_slice::<Pet>().await;
    }

    /// Create a pet. Rate-limited per actor.
    pub async fn add_pet(&mut self, fields: NewPet) -> StoreResult<Pet> {
        let result = self.insert_pet(fields).await;
        self.settle(result, "failed to add pet")
    }

    async fn insert_pet(&mut self, fields: NewPet) -> StoreResult<Pet> {
        let fields = NewPet {
            name: require_text(&fields.name, "pet name")?,
            breed: optional_text(fields.breed),
            photo_ref: optional_text(fields.photo_ref),
            ..fields
        };
        self.admit(Throttled::PetCreation)?;
        self.create_record::<Pet>(fields).await
    }

    pub async fn update_pet(&mut self, id: Uuid, patch: PetPatch) {
        let result = self.patch_pet(id, patch).await;
        self.absorb(result, "failed to update pet");
    }

    async fn patch_pet(&mut self, id: Uuid, mut patch: PetPatch) -> StoreResult<Pet> {
        if let Some(name) = patch.name.as_deref() {
            patch.name = Some(require_text(name, "pet name")?);
        }
        self.update_record::<Pet>(id, patch).await
    }

    /// Delete a pet together with every expense and budget referencing it.
    pub async fn delete_pet(&mut self, id: Uuid) {
        let result = self.remove_pet(id).await;
        self.absorb(result, "failed to delete pet");
    }

    async fn remove_pet(&mut self, id: Uuid) -> StoreResult<()> {
        let dependents = self
            .snapshot
            .expenses
            .iter()
            .filter(|expense| expense.pet_id == id)
            .count()
            + self
                .snapshot
                .budgets
                .iter()
                .filter(|budget| budget.pet_id == id)
                .count();
        self.ensure_deletable("pet", dependents)?;

        self.delete_record::<Pet>(id).await?;
        self.snapshot.expenses.retain(|expense| expense.pet_id != id);
        self.snapshot.budgets.retain(|budget| budget.pet_id != id);
        tracing::info!(%id, dependents, "pet deleted");
        Ok(())
    }

    /// When the current actor may create pets again, if it is throttled.
    pub fn pet_creation_reset_time(&self) -> Option<Instant> {
        self.pet_limiter.reset_time(&self.actor_key())
    }
}
