//! Expense categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::{Record, patch_field};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseCategory {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    /// Key of the building block this category was seeded from, `None` for
    /// categories the user created from scratch.
    pub builtin_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub builtin_key: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Option<String>>,
}

impl Record for ExpenseCategory {
    type New = NewCategory;
    type Patch = CategoryPatch;

    const LABEL: &'static str = "categories";

    fn id(&self) -> Uuid {
        self.id
    }

    fn materialize(id: Uuid, at: DateTime<Utc>, fields: NewCategory) -> Self {
        Self {
            id,
            name: fields.name,
            color: fields.color,
            icon: fields.icon,
            builtin_key: fields.builtin_key,
            created_at: at,
            updated_at: at,
        }
    }

    fn apply(&mut self, patch: CategoryPatch, at: DateTime<Utc>) {
        patch_field(&mut self.name, patch.name);
        patch_field(&mut self.color, patch.color);
        patch_field(&mut self.icon, patch.icon);
        self.updated_at = at;
    }
}
