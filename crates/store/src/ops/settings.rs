use crate::{Gateway, NewSettings, Remote, Settings, SettingsPatch, StoreError, StoreResult};

use super::Store;

impl<G: Gateway> Store<G> {
    /// Load the settings singleton, bootstrapping it when the user has none.
    pub async fn load_settings(&mut self) {
        let result = self.fetch_settings().await;
        self.absorb(result, "failed to load settings");
    }

    pub(super) async fn fetch_settings(&mut self) -> StoreResult<()> {
        let existing = self
            .remote(<G as Remote<Settings>>::get_all(&self.gateway))
            .await?;

        let settings = match existing.into_iter().next() {
            Some(settings) => settings,
            None => {
                let currency = self.config.default_currency;
                tracing::info!(%currency, "bootstrapping settings");
                self.remote(<G as Remote<Settings>>::create(
                    &self.gateway,
                    NewSettings::bootstrap(currency),
                ))
                .await?
            }
        };
        self.snapshot.settings = Some(settings);
        Ok(())
    }

    pub async fn update_settings(&mut self, patch: SettingsPatch) {
        let result = self.patch_settings(patch).await;
        self.absorb(result, "failed to update settings");
    }

    async fn patch_settings(&mut self, patch: SettingsPatch) -> StoreResult<()> {
        let current = self
            .snapshot
            .settings
            .as_ref()
            .ok_or_else(|| StoreError::NotFound("settings".to_string()))?;
        let id = current.id;

        let default = patch.default_currency.unwrap_or(current.default_currency);
        let available = patch
            .available_currencies
            .as_ref()
            .unwrap_or(&current.available_currencies);
        if !available.contains(&default) {
            return Err(StoreError::InvalidInput(format!(
                "default currency {default} is not among the available currencies"
            )));
        }

        let updated = self
            .remote(<G as Remote<Settings>>::update(&self.gateway, id, patch))
            .await?;
        self.snapshot.settings = Some(updated);
        Ok(())
    }
}
