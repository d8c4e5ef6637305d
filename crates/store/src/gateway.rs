//! Contract of the remote data gateway consumed by the store.
//!
//! One [`Remote`] shape per entity; a [`Gateway`] serves all six. Rows are
//! scoped to the gateway's user, identity and timestamps are assigned on the
//! remote side.

use uuid::Uuid;

use crate::{
    Budget, Expense, ExpenseCategory, GatewayError, Pet, Settings, UserCategoryPreference,
    record::Record,
};

pub type GatewayResult<T> = Result<T, GatewayError>;

#[allow(async_fn_in_trait)]
pub trait Remote<R: Record> {
    /// Every record of the current user.
    async fn get_all(&self) -> GatewayResult<Vec<R>>;

    async fn get_by_id(&self, id: Uuid) -> GatewayResult<Option<R>>;

    /// Persist a new record; the remote assigns id and timestamps.
    async fn create(&self, fields: R::New) -> GatewayResult<R>;

    /// Apply `patch` and return the stored record. Missing ids are [`GatewayError::NotFound`].
    async fn update(&self, id: Uuid, patch: R::Patch) -> GatewayResult<R>;

    /// Missing ids are [`GatewayError::NotFound`].
    async fn delete(&self, id: Uuid) -> GatewayResult<()>;
}

pub trait Gateway:
    Remote<Pet>
    + Remote<Expense>
    + Remote<ExpenseCategory>
    + Remote<Budget>
    + Remote<Settings>
    + Remote<UserCategoryPreference>
{
    /// User the gateway scopes rows to, when it has a stable identity.
    fn user_id(&self) -> Option<&str>;
}
