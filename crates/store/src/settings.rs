//! Per-user settings singleton.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency,
    record::{Record, patch_field},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub id: Uuid,
    pub default_currency: Currency,
    pub available_currencies: Vec<Currency>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSettings {
    pub default_currency: Currency,
    pub available_currencies: Vec<Currency>,
}

impl NewSettings {
    /// The singleton bootstrapped for a user with no remote settings.
    pub fn bootstrap(default_currency: Currency) -> Self {
        Self {
            default_currency,
            available_currencies: Currency::ALL.to_vec(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_currencies: Option<Vec<Currency>>,
}

impl Record for Settings {
    type New = NewSettings;
    type Patch = SettingsPatch;

    const LABEL: &'static str = "settings";

    fn id(&self) -> Uuid {
        self.id
    }

    fn materialize(id: Uuid, at: DateTime<Utc>, fields: NewSettings) -> Self {
        Self {
            id,
            default_currency: fields.default_currency,
            available_currencies: fields.available_currencies,
            created_at: at,
            updated_at: at,
        }
    }

    fn apply(&mut self, patch: SettingsPatch, at: DateTime<Utc>) {
        patch_field(&mut self.default_currency, patch.default_currency);
        patch_field(&mut self.available_currencies, patch.available_currencies);
        self.updated_at = at;
    }
}
