use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, Money, StoreError,
    record::{Record, patch_field},
};

/// How often an expense repeats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Monthly,
    Quarterly,
    Yearly,
}

impl Recurrence {
    #[must_use]
    pub const fn is_recurring(self) -> bool {
        !matches!(self, Recurrence::None)
    }

    /// Calendar months between two occurrences, `None` for one-off expenses.
    #[must_use]
    pub const fn months(self) -> Option<u32> {
        match self {
            Recurrence::None => None,
            Recurrence::Monthly => Some(1),
            Recurrence::Quarterly => Some(3),
            Recurrence::Yearly => Some(12),
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Recurrence::None => "none",
            Recurrence::Monthly => "monthly",
            Recurrence::Quarterly => "quarterly",
            Recurrence::Yearly => "yearly",
        })
    }
}

impl FromStr for Recurrence {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Recurrence::None),
            "monthly" => Ok(Recurrence::Monthly),
            "quarterly" => Ok(Recurrence::Quarterly),
            "yearly" => Ok(Recurrence::Yearly),
            other => Err(StoreError::InvalidInput(format!(
                "unknown recurrence: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub category_id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub receipt_ref: Option<String>,
    pub recurrence: Recurrence,
    /// Present iff `recurrence` is not [`Recurrence::None`].
    pub next_due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub pet_id: Uuid,
    pub category_id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub receipt_ref: Option<String>,
    pub recurrence: Recurrence,
    /// Derived by the store from `date` and `recurrence`; caller values are replaced.
    #[serde(default)]
    pub next_due_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_ref: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<Option<NaiveDate>>,
}

impl Record for Expense {
    type New = NewExpense;
    type Patch = ExpensePatch;

    const LABEL: &'static str = "expenses";

    fn id(&self) -> Uuid {
        self.id
    }

    fn materialize(id: Uuid, at: DateTime<Utc>, fields: NewExpense) -> Self {
        Self {
            id,
            pet_id: fields.pet_id,
            category_id: fields.category_id,
            amount: fields.amount,
            currency: fields.currency,
            description: fields.description,
            date: fields.date,
            receipt_ref: fields.receipt_ref,
            recurrence: fields.recurrence,
            next_due_date: fields.next_due_date,
            created_at: at,
            updated_at: at,
        }
    }

    fn apply(&mut self, patch: ExpensePatch, at: DateTime<Utc>) {
        patch_field(&mut self.pet_id, patch.pet_id);
        patch_field(&mut self.category_id, patch.category_id);
        patch_field(&mut self.amount, patch.amount);
        patch_field(&mut self.currency, patch.currency);
        patch_field(&mut self.description, patch.description);
        patch_field(&mut self.date, patch.date);
        patch_field(&mut self.receipt_ref, patch.receipt_ref);
        patch_field(&mut self.recurrence, patch.recurrence);
        patch_field(&mut self.next_due_date, patch.next_due_date);
        self.updated_at = at;
    }
}
