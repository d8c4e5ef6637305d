use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    Budget, Catalog, DeletePolicy, Expense, ExpenseCategory, FileCache, Gateway, GatewayResult,
    MemoryCache, Money, Pet, PreferenceCache, RateLimiter, Remote, Settings, StoreConfig,
    StoreError, StoreResult, UserCategoryPreference, limiter::ANONYMOUS, record::Record,
};

mod budgets;
mod categories;
mod expenses;
mod pets;
mod preferences;
mod selectors;
mod settings;

pub use selectors::BudgetStatus;

/// Canonical in-memory copy of every entity of the current user.
///
/// Collections keep insertion order: loads replace a slice wholesale, creates
/// append, updates replace in place.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub settings: Option<Settings>,
    pub categories: Vec<ExpenseCategory>,
    pub preferences: Vec<UserCategoryPreference>,
    pub pets: Vec<Pet>,
    pub expenses: Vec<Expense>,
    pub budgets: Vec<Budget>,
}

/// A snapshot collection holding records of type `Self`.
pub(crate) trait Slice: Record {
    fn slice(snapshot: &Snapshot) -> &Vec<Self>;
    fn slice_mut(snapshot: &mut Snapshot) -> &mut Vec<Self>;
}

macro_rules! slice {
    ($record:ty, $field:ident) => {
        impl Slice for $record {
            fn slice(snapshot: &Snapshot) -> &Vec<Self> {
                &snapshot.$field
            }

            fn slice_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
                &mut snapshot.$field
            }
        }
    };
}

slice!(ExpenseCategory, categories);
slice!(UserCategoryPreference, preferences);
slice!(Pet, pets);
slice!(Expense, expenses);
slice!(Budget, budgets);

/// Create actions guarded by a rate limiter.
#[derive(Debug, Clone, Copy)]
enum Throttled {
    PetCreation,
    ExpenseCreation,
}

/// The reactive store: the only owner of the snapshot.
///
/// Every action follows the same shape: consult the limiter when the action
/// is throttled, call the gateway, and commit to the snapshot only on
/// success. Failures are written to a single advisory error slot. Load,
/// update and delete actions stop there; create actions also return the
/// error because their caller needs the created record.
pub struct Store<G> {
    gateway: G,
    cache: Box<dyn PreferenceCache>,
    catalog: Catalog,
    config: StoreConfig,
    snapshot: Snapshot,
    error: Option<String>,
    pet_limiter: RateLimiter,
    expense_limiter: RateLimiter,
    cancel: CancellationToken,
}

impl<G: Gateway> Store<G> {
    /// Return a builder for `Store`. Help to build the struct.
    pub fn builder(gateway: G) -> StoreBuilder<G> {
        StoreBuilder {
            gateway,
            config: StoreConfig::default(),
            cache: None,
            catalog: Catalog::default(),
        }
    }

    /// Load everything the store holds.
    ///
    /// Settings, categories and preferences load strictly in this order
    /// because reconciliation reads the committed categories. Pets, expenses
    /// and budgets are then fetched concurrently; their failures only reach
    /// the error slot. A failure on settings or categories aborts
    /// initialisation and is returned.
    pub async fn initialize(&mut self) -> StoreResult<()> {
        tracing::info!("initializing store");

        let settings = self.fetch_settings().await;
        self.settle(settings, "failed to load settings")?;
        let categories = self.fetch_slice::<ExpenseCategory>().await;
        self.settle(categories, "failed to load categories")?;
        let preferences = self.reconcile_preferences().await;
        if let Err(StoreError::Cancelled) = preferences {
            return Err(StoreError::Cancelled);
        }
        self.absorb(preferences, "failed to reconcile category preferences");

        let (pets, expenses, budgets) = tokio::join!(
            self.remote(<G as Remote<Pet>>::get_all(&self.gateway)),
            self.remote(<G as Remote<Expense>>::get_all(&self.gateway)),
            self.remote(<G as Remote<Budget>>::get_all(&self.gateway)),
        );
        self.commit_load(pets);
        self.commit_load(expenses);
        self.commit_load(budgets);

        tracing::info!(
            pets = self.snapshot.pets.len(),
            expenses = self.snapshot.expenses.len(),
            budgets = self.snapshot.budgets.len(),
            categories = self.snapshot.categories.len(),
            "store initialized"
        );
        Ok(())
    }

    /// Token cancelling every in-flight and future gateway call of this store.
    ///
    /// A cancelled action returns [`StoreError::Cancelled`] and commits nothing.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Install a fresh token after a cancellation.
    pub fn reset_cancellation(&mut self) {
        self.cancel = CancellationToken::new();
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Await a gateway call, bounded by the request timeout and the cancellation token.
    async fn remote<T>(&self, request: impl Future<Output = GatewayResult<T>>) -> StoreResult<T> {
        let timeout = self.config.request_timeout();
        let bounded = async move {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, request)
                    .await
                    .map_err(|_| {
                        StoreError::RemoteUnavailable(format!(
                            "no response within {}ms",
                            limit.as_millis()
                        ))
                    })?
                    .map_err(StoreError::from),
                None => request.await.map_err(StoreError::from),
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(StoreError::Cancelled),
            result = bounded => result,
        }
    }

    /// Write `err` to the error slot.
    fn record(&mut self, err: &StoreError, context: &str) {
        if matches!(err, StoreError::Cancelled) {
            tracing::debug!("{context}: cancelled");
            return;
        }
        let message = format!("{context}: {err}");
        tracing::warn!("{message}");
        self.error = Some(message);
    }

    /// Record a failure and hand the result back to the caller.
    fn settle<T>(&mut self, result: StoreResult<T>, context: &str) -> StoreResult<T> {
        if let Err(err) = &result {
            self.record(err, context);
        }
        result
    }

    /// Record a failure; the caller only observes it through the error slot.
    fn absorb<T>(&mut self, result: StoreResult<T>, context: &str) {
        if let Err(err) = result {
            self.record(&err, context);
        }
    }

    fn actor_key(&self) -> String {
        self.config
            .actor
            .as_deref()
            .or_else(|| self.gateway.user_id())
            .unwrap_or(ANONYMOUS)
            .to_string()
    }

    /// Owner stamped on preference records.
    fn user_key(&self) -> String {
        self.gateway.user_id().unwrap_or(ANONYMOUS).to_string()
    }

    fn admit(&mut self, action: Throttled) -> StoreResult<()> {
        let key = self.actor_key();
        let limiter = match action {
            Throttled::PetCreation => &mut self.pet_limiter,
            Throttled::ExpenseCreation => &mut self.expense_limiter,
        };
        if limiter.is_allowed(&key) {
            return Ok(());
        }
        let retry_after = limiter.retry_after(&key);
        tracing::debug!(
            ?action,
            %key,
            ?retry_after,
            max_attempts = limiter.config().max_attempts,
            "rate limited"
        );
        Err(StoreError::RateLimited { key, retry_after })
    }

    fn ensure_deletable(&self, what: &str, dependents: usize) -> StoreResult<()> {
        if self.config.delete_policy == DeletePolicy::Restrict && dependents > 0 {
            return Err(StoreError::Conflict(format!(
                "{what} still has {dependents} dependent record(s)"
            )));
        }
        Ok(())
    }

    fn commit_load<R: Slice>(&mut self, result: StoreResult<Vec<R>>) {
        match result {
            Ok(records) => {
                tracing::debug!(count = records.len(), "loaded {}", R::LABEL);
                *R::slice_mut(&mut self.snapshot) = records;
            }
            Err(err) => self.record(&err, &format!("failed to load {}", R::LABEL)),
        }
    }

    async fn fetch_slice<R>(&mut self) -> StoreResult<()>
    where
        R: Slice,
        G: Remote<R>,
    {
        let records = self.remote(<G as Remote<R>>::get_all(&self.gateway)).await?;
        tracing::debug!(count = records.len(), "loaded {}", R::LABEL);
        *R::slice_mut(&mut self.snapshot) = records;
        Ok(())
    }

    async fn load_slice<R>(&mut self)
    where
        R: Slice,
        G: Remote<R>,
    {
        let result = self.remote(<G as Remote<R>>::get_all(&self.gateway)).await;
        self.commit_load(result);
    }

    async fn create_record<R>(&mut self, fields: R::New) -> StoreResult<R>
    where
        R: Slice,
        G: Remote<R>,
    {
        let record = self
            .remote(<G as Remote<R>>::create(&self.gateway, fields))
            .await?;
        tracing::debug!(id = %record.id(), "created record in {}", R::LABEL);
        R::slice_mut(&mut self.snapshot).push(record.clone());
        Ok(record)
    }

    async fn update_record<R>(&mut self, id: Uuid, patch: R::Patch) -> StoreResult<R>
    where
        R: Slice,
        G: Remote<R>,
    {
        let record = self
            .remote(<G as Remote<R>>::update(&self.gateway, id, patch))
            .await?;
        let slice = R::slice_mut(&mut self.snapshot);
        match slice.iter_mut().find(|existing| existing.id() == id) {
            Some(existing) => *existing = record.clone(),
            None => slice.push(record.clone()),
        }
        tracing::debug!(%id, "updated record in {}", R::LABEL);
        Ok(record)
    }

    async fn delete_record<R>(&mut self, id: Uuid) -> StoreResult<()>
    where
        R: Slice,
        G: Remote<R>,
    {
        self.remote(<G as Remote<R>>::delete(&self.gateway, id))
            .await?;
        R::slice_mut(&mut self.snapshot).retain(|existing| existing.id() != id);
        tracing::debug!(%id, "deleted record from {}", R::LABEL);
        Ok(())
    }

    fn find<R: Slice>(&self, id: Uuid) -> StoreResult<&R> {
        R::slice(&self.snapshot)
            .iter()
            .find(|record| record.id() == id)
            .ok_or_else(|| StoreError::NotFound(format!("{} {id}", R::LABEL)))
    }
}

fn ensure_positive(amount: Money, what: &str) -> StoreResult<()> {
    if !amount.is_positive() {
        return Err(StoreError::InvalidInput(format!(
            "{what} amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

fn require_text(value: &str, label: &str) -> StoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Store`
pub struct StoreBuilder<G> {
    gateway: G,
    config: StoreConfig,
    cache: Option<Box<dyn PreferenceCache>>,
    catalog: Catalog,
}

impl<G: Gateway> StoreBuilder<G> {
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the preference cache chosen from the config.
    pub fn cache(mut self, cache: impl PreferenceCache + 'static) -> Self {
        self.cache = Some(Box::new(cache));
        self
    }

    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Construct `Store`
    pub fn build(self) -> Store<G> {
        let cache = self.cache.unwrap_or_else(|| match &self.config.preference_cache {
            Some(path) => {
                let file = FileCache::new(path);
                tracing::debug!(path = %file.path().display(), "caching preferences on disk");
                Box::new(file) as Box<dyn PreferenceCache>
            }
            None => Box::new(MemoryCache::new()),
        });
        Store {
            gateway: self.gateway,
            cache,
            catalog: self.catalog,
            pet_limiter: RateLimiter::new(self.config.pet_limit),
            expense_limiter: RateLimiter::new(self.config.expense_limit),
            config: self.config,
            snapshot: Snapshot::default(),
            error: None,
            cancel: CancellationToken::new(),
        }
    }
}
