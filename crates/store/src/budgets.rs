use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, Money, StoreError,
    record::{Record, patch_field},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    /// Calendar months covered by one period.
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            BudgetPeriod::Monthly => 1,
            BudgetPeriod::Yearly => 12,
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        })
    }
}

impl FromStr for BudgetPeriod {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(StoreError::InvalidInput(format!(
                "unknown budget period: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub category_id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    /// `start_date` plus one period, minus one day.
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Whether `day` falls inside `[start_date, end_date]`.
    #[must_use]
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub pet_id: Uuid,
    pub category_id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    /// Derived by the store; caller values are replaced.
    pub end_date: NaiveDate,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<BudgetPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Record for Budget {
    type New = NewBudget;
    type Patch = BudgetPatch;

    const LABEL: &'static str = "budgets";

    fn id(&self) -> Uuid {
        self.id
    }

    fn materialize(id: Uuid, at: DateTime<Utc>, fields: NewBudget) -> Self {
        Self {
            id,
            pet_id: fields.pet_id,
            category_id: fields.category_id,
            amount: fields.amount,
            currency: fields.currency,
            period: fields.period,
            start_date: fields.start_date,
            end_date: fields.end_date,
            created_at: at,
            updated_at: at,
        }
    }

    fn apply(&mut self, patch: BudgetPatch, at: DateTime<Utc>) {
        patch_field(&mut self.pet_id, patch.pet_id);
        patch_field(&mut self.category_id, patch.category_id);
        patch_field(&mut self.amount, patch.amount);
        patch_field(&mut self.currency, patch.currency);
        patch_field(&mut self.period, patch.period);
        patch_field(&mut self.start_date, patch.start_date);
        patch_field(&mut self.end_date, patch.end_date);
        self.updated_at = at;
    }
}
