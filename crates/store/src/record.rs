//! Shared shape of every entity held by the store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// A persisted entity with server-assigned identity and timestamps.
///
/// `New` carries every field except id/timestamps (the payload of a
/// `create`), `Patch` carries optional replacements (the payload of an
/// `update`). Records serialize with camelCase attribute names.
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned {
    type New: Clone + fmt::Debug + Serialize;
    type Patch: Clone + fmt::Debug + Default + Serialize;

    /// Plural label used in logs and error messages.
    const LABEL: &'static str;

    fn id(&self) -> Uuid;

    /// Build the record a gateway would return for `fields`.
    fn materialize(id: Uuid, at: DateTime<Utc>, fields: Self::New) -> Self;

    /// Overwrite the fields present in `patch` and bump `updated_at`.
    fn apply(&mut self, patch: Self::Patch, at: DateTime<Utc>);
}

/// Replace `slot` with the patched value when present.
pub(crate) fn patch_field<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
