//! Client-side data layer of PawLedger.
//!
//! The [`Store`] owns an in-memory snapshot of pets, expenses, categories,
//! budgets, settings and category preferences, keeps it in step with a remote
//! [`Gateway`], and derives recurring schedules, budget utilisation and the
//! user's visible categories from it.

pub use budgets::{Budget, BudgetPatch, BudgetPeriod, NewBudget};
pub use cache::{FileCache, MemoryCache, PreferenceCache};
pub use catalog::{BUILDING_BLOCKS, BuildingBlock, Catalog};
pub use categories::{CategoryPatch, ExpenseCategory, NewCategory};
pub use config::{DeletePolicy, StoreConfig};
pub use currency::Currency;
pub use error::{GatewayError, StoreError};
pub use expenses::{Expense, ExpensePatch, NewExpense, Recurrence};
pub use gateway::{Gateway, GatewayResult, Remote};
pub use limiter::{ANONYMOUS, LimitConfig, RateLimiter};
pub use money::Money;
pub use ops::{BudgetStatus, Snapshot, Store, StoreBuilder};
pub use pets::{NewPet, Pet, PetPatch, Species};
pub use preferences::{NewPreference, PreferencePatch, UserCategoryPreference};
pub use record::Record;
pub use reconcile::{PreferenceAction, PreferenceSource, ReconcilePlan, reconcile};
pub use settings::{NewSettings, Settings, SettingsPatch};
pub use utilization::{NormalizedBudget, Utilization, UtilizationLevel};

mod budgets;
pub mod cache;
pub mod catalog;
mod categories;
mod config;
mod currency;
mod error;
mod expenses;
mod gateway;
pub mod limiter;
mod money;
mod ops;
mod pets;
mod preferences;
mod record;
pub mod reconcile;
pub mod schedule;
mod settings;
pub mod utilization;

pub type StoreResult<T> = Result<T, StoreError>;
