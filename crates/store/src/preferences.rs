//! Category visibility preferences.
//!
//! A preference record is derived state: the reconciler creates and repairs
//! it, users only flip `enabled`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::{Record, patch_field};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCategoryPreference {
    pub id: Uuid,
    pub user_id: String,
    pub category_id: Uuid,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPreference {
    pub user_id: String,
    pub category_id: Uuid,
    pub enabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl Record for UserCategoryPreference {
    type New = NewPreference;
    type Patch = PreferencePatch;

    const LABEL: &'static str = "category preferences";

    fn id(&self) -> Uuid {
        self.id
    }

    fn materialize(id: Uuid, at: DateTime<Utc>, fields: NewPreference) -> Self {
        Self {
            id,
            user_id: fields.user_id,
            category_id: fields.category_id,
            enabled: fields.enabled,
            created_at: at,
            updated_at: at,
        }
    }

    fn apply(&mut self, patch: PreferencePatch, at: DateTime<Utc>) {
        patch_field(&mut self.enabled, patch.enabled);
        self.updated_at = at;
    }
}
