#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::Mutex,
    time::Duration,
};

use chrono::{NaiveDate, Utc};
use store::{
    Budget, Currency, Expense, ExpenseCategory, Gateway, GatewayError, GatewayResult, Money,
    NewCategory, NewExpense, NewPet, Pet, Record, Recurrence, Remote, Settings, Species,
    UserCategoryPreference,
};
use uuid::Uuid;

/// Gateway keeping every table in memory, with failure and latency injection.
#[derive(Default)]
pub struct MemoryGateway {
    user: Option<String>,
    pets: Mutex<Vec<Pet>>,
    expenses: Mutex<Vec<Expense>>,
    categories: Mutex<Vec<ExpenseCategory>>,
    budgets: Mutex<Vec<Budget>>,
    settings: Mutex<Vec<Settings>>,
    preferences: Mutex<Vec<UserCategoryPreference>>,
    failing: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<String>>,
}

pub trait Table<R> {
    fn table(&self) -> &Mutex<Vec<R>>;
}

macro_rules! table {
    ($record:ty, $field:ident) => {
        impl Table<$record> for MemoryGateway {
            fn table(&self) -> &Mutex<Vec<$record>> {
                &self.$field
            }
        }
    };
}

table!(Pet, pets);
table!(Expense, expenses);
table!(ExpenseCategory, categories);
table!(Budget, budgets);
table!(Settings, settings);
table!(UserCategoryPreference, preferences);

impl MemoryGateway {
    pub fn for_user(user: &str) -> Self {
        Self {
            user: Some(user.to_string()),
            ..Self::default()
        }
    }

    /// Make every call on the table of `R` fail.
    pub fn fail<R: Record>(&self) {
        self.failing.lock().unwrap().insert(R::LABEL.to_string());
    }

    /// Make only `op` (`create`, `update`, ...) fail on the table of `R`.
    pub fn fail_op<R: Record>(&self, op: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert(format!("{}.{op}", R::LABEL));
    }

    pub fn recover<R: Record>(&self) {
        self.failing
            .lock()
            .unwrap()
            .retain(|entry| entry != R::LABEL && !entry.starts_with(&format!("{}.", R::LABEL)));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn seed<R: Record>(&self, records: Vec<R>)
    where
        Self: Table<R>,
    {
        self.table().lock().unwrap().extend(records);
    }

    pub fn rows<R: Record>(&self) -> Vec<R>
    where
        Self: Table<R>,
    {
        self.table().lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter<R: Record>(&self, op: &str) -> GatewayResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}.{op}", R::LABEL));
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failing = self.failing.lock().unwrap();
        if failing.contains(R::LABEL) || failing.contains(&format!("{}.{op}", R::LABEL)) {
            return Err(GatewayError::Unavailable(format!("{} offline", R::LABEL)));
        }
        Ok(())
    }
}

impl<R: Record> Remote<R> for MemoryGateway
where
    MemoryGateway: Table<R>,
{
    async fn get_all(&self) -> GatewayResult<Vec<R>> {
        self.enter::<R>("get_all").await?;
        Ok(self.rows())
    }

    async fn get_by_id(&self, id: Uuid) -> GatewayResult<Option<R>> {
        self.enter::<R>("get_by_id").await?;
        Ok(self.rows().into_iter().find(|record: &R| record.id() == id))
    }

    async fn create(&self, fields: R::New) -> GatewayResult<R> {
        self.enter::<R>("create").await?;
        let record = R::materialize(Uuid::new_v4(), Utc::now(), fields);
        self.table().lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: R::Patch) -> GatewayResult<R> {
        self.enter::<R>("update").await?;
        let mut table = self.table().lock().unwrap();
        let record = table
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;
        record.apply(patch, Utc::now());
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> GatewayResult<()> {
        self.enter::<R>("delete").await?;
        let mut table = self.table().lock().unwrap();
        let before = table.len();
        table.retain(|record| record.id() != id);
        if table.len() == before {
            return Err(GatewayError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

impl Gateway for MemoryGateway {
    fn user_id(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn category(name: &str, builtin_key: Option<&str>) -> ExpenseCategory {
    ExpenseCategory::materialize(
        Uuid::new_v4(),
        Utc::now(),
        NewCategory {
            name: name.to_string(),
            color: "#123456".to_string(),
            icon: None,
            builtin_key: builtin_key.map(ToString::to_string),
        },
    )
}

pub fn pet(name: &str) -> Pet {
    Pet::materialize(Uuid::new_v4(), Utc::now(), new_pet(name))
}

pub fn new_pet(name: &str) -> NewPet {
    NewPet {
        name: name.to_string(),
        species: Species::Dog,
        ..NewPet::default()
    }
}

pub fn preference(category: &ExpenseCategory, user: &str, enabled: bool) -> UserCategoryPreference {
    UserCategoryPreference::materialize(
        Uuid::new_v4(),
        Utc::now(),
        store::NewPreference {
            user_id: user.to_string(),
            category_id: category.id,
            enabled,
        },
    )
}

pub fn new_expense(pet: &Pet, category: &ExpenseCategory, cents: i64, on: NaiveDate) -> NewExpense {
    NewExpense {
        pet_id: pet.id,
        category_id: category.id,
        amount: Money::new(cents),
        currency: Currency::Eur,
        description: None,
        date: on,
        receipt_ref: None,
        recurrence: Recurrence::None,
        next_due_date: None,
    }
}

pub fn expense(pet: &Pet, category: &ExpenseCategory, cents: i64, on: NaiveDate) -> Expense {
    Expense::materialize(
        Uuid::new_v4(),
        Utc::now(),
        new_expense(pet, category, cents, on),
    )
}
