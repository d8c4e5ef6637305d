use chrono::Utc;
use uuid::Uuid;

use crate::{
    Gateway, NewPreference, PreferenceAction, PreferencePatch, PreferenceSource, Record, Remote,
    StoreError, StoreResult, UserCategoryPreference, reconcile::reconcile,
};

use super::Store;

/// Remote write backing one reconciled preference.
enum Write {
    Enable,
    Create(NewPreference),
}

impl<G: Gateway> Store<G> {
    /// Fetch, reconcile and persist the category preferences of the current user.
    ///
    /// Must run after categories are committed to the snapshot.
    pub async fn load_user_preferences(&mut self) {
        let result = self.reconcile_preferences().await;
        self.absorb(result, "failed to reconcile category preferences");
    }

    pub(super) async fn reconcile_preferences(&mut self) -> StoreResult<()> {
        let user = self.user_key();
        let (persisted, source, reachable) = self.persisted_preferences(&user).await?;

        let plan = reconcile(&persisted, &self.snapshot.categories, &self.catalog);
        tracing::info!(
            ?source,
            persisted = persisted.len(),
            healed = plan.healed(),
            created = plan.created(),
            "reconciled category preferences"
        );

        if source == PreferenceSource::Remote && plan.is_unchanged() {
            self.snapshot.preferences = plan
                .actions
                .into_iter()
                .filter_map(|action| match action {
                    PreferenceAction::Keep(preference) => Some(preference),
                    _ => None,
                })
                .collect();
            self.store_cache();
            return Ok(());
        }

        let mut merged = Vec::with_capacity(plan.actions.len());
        let mut failure: Option<StoreError> = None;
        for action in plan.actions {
            let (local, write) = match action {
                PreferenceAction::Keep(preference) if source == PreferenceSource::Remote => {
                    merged.push(preference);
                    continue;
                }
                PreferenceAction::Heal(preference) if source == PreferenceSource::Remote => {
                    (preference, Write::Enable)
                }
                // Cached records are unknown to the remote store: re-create them.
                PreferenceAction::Keep(preference) | PreferenceAction::Heal(preference) => {
                    let fields = NewPreference {
                        user_id: user.clone(),
                        category_id: preference.category_id,
                        enabled: preference.enabled,
                    };
                    (preference, Write::Create(fields))
                }
                PreferenceAction::Create {
                    category_id,
                    enabled,
                } => {
                    let fields = NewPreference {
                        user_id: user.clone(),
                        category_id,
                        enabled,
                    };
                    let local = UserCategoryPreference::materialize(
                        Uuid::new_v4(),
                        Utc::now(),
                        fields.clone(),
                    );
                    (local, Write::Create(fields))
                }
            };

            if !reachable {
                merged.push(local);
                continue;
            }
            let stored = match write {
                Write::Enable => {
                    let patch = PreferencePatch {
                        enabled: Some(true),
                    };
                    self.remote(<G as Remote<UserCategoryPreference>>::update(
                        &self.gateway,
                        local.id,
                        patch,
                    ))
                    .await
                }
                Write::Create(fields) => {
                    self.remote(<G as Remote<UserCategoryPreference>>::create(
                        &self.gateway,
                        fields,
                    ))
                    .await
                }
            };
            match stored {
                Ok(preference) => merged.push(preference),
                Err(StoreError::Cancelled) => return Err(StoreError::Cancelled),
                Err(err) => {
                    merged.push(local);
                    failure.get_or_insert(err);
                }
            }
        }

        self.snapshot.preferences = merged;
        self.store_cache();

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Persisted preferences of `user`: remote first, local cache when the
    /// remote set is empty or unreachable.
    ///
    /// Also reports whether the remote store answered.
    async fn persisted_preferences(
        &self,
        user: &str,
    ) -> StoreResult<(Vec<UserCategoryPreference>, PreferenceSource, bool)> {
        let reachable = match self
            .remote(<G as Remote<UserCategoryPreference>>::get_all(&self.gateway))
            .await
        {
            Ok(remote) if !remote.is_empty() => {
                return Ok((remote, PreferenceSource::Remote, true));
            }
            Ok(_) => true,
            Err(StoreError::Cancelled) => return Err(StoreError::Cancelled),
            Err(err) => {
                let fallback = StoreError::ReconciliationFallback(err.to_string());
                tracing::warn!("{fallback}");
                false
            }
        };

        let cached: Vec<UserCategoryPreference> = match self.cache.read() {
            Ok(cached) => cached
                .into_iter()
                .filter(|preference| preference.user_id == user)
                .collect(),
            Err(err) => {
                tracing::warn!("failed to read preference cache: {err}");
                Vec::new()
            }
        };

        let source = if cached.is_empty() {
            PreferenceSource::Empty
        } else {
            PreferenceSource::Cache
        };
        Ok((cached, source, reachable))
    }

    /// Show or hide a category in entry forms.
    pub async fn set_category_visibility(&mut self, category_id: Uuid, enabled: bool) {
        let result = self.write_visibility(category_id, enabled).await;
        self.absorb(result, "failed to update category visibility");
    }

    pub(super) async fn write_visibility(
        &mut self,
        category_id: Uuid,
        enabled: bool,
    ) -> StoreResult<()> {
        self.find::<crate::ExpenseCategory>(category_id)?;

        let existing = self
            .snapshot
            .preferences
            .iter()
            .find(|preference| preference.category_id == category_id)
            .map(|preference| preference.id);

        match existing {
            Some(id) => {
                self.update_record::<UserCategoryPreference>(
                    id,
                    PreferencePatch {
                        enabled: Some(enabled),
                    },
                )
                .await?;
            }
            None => {
                let fields = NewPreference {
                    user_id: self.user_key(),
                    category_id,
                    enabled,
                };
                self.create_record::<UserCategoryPreference>(fields).await?;
            }
        }
        self.store_cache();
        Ok(())
    }

    /// Mirror the snapshot's preferences into the local cache.
    pub(super) fn store_cache(&self) {
        if let Err(err) = self.cache.write(&self.snapshot.preferences) {
            tracing::warn!("failed to write preference cache: {err}");
        }
    }
}
