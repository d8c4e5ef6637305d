use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::{Currency, LimitConfig};

/// What deleting a pet or category does to the records referencing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Dependents are removed together with their parent.
    #[default]
    Cascade,
    /// Deleting a parent that still has dependents is a conflict.
    Restrict,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Rate-limit key; falls back to the gateway user, then to `anonymous`.
    pub actor: Option<String>,
    /// Currency of the settings singleton bootstrapped for new users.
    pub default_currency: Currency,
    /// Gateway calls slower than this fail as remote-unavailable.
    pub request_timeout_ms: Option<u64>,
    pub pet_limit: LimitConfig,
    pub expense_limit: LimitConfig,
    pub delete_policy: DeletePolicy,
    /// Preference cache file; an in-memory cache is used when unset.
    pub preference_cache: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            actor: None,
            default_currency: Currency::Eur,
            request_timeout_ms: Some(10_000),
            pet_limit: LimitConfig::new(5, 60_000),
            expense_limit: LimitConfig::new(10, 60_000),
            delete_policy: DeletePolicy::Cascade,
            preference_cache: None,
        }
    }
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}
