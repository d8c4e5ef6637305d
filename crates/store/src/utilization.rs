//! Budget normalisation and utilisation classification.
//!
//! Budgets come in monthly and yearly periods; spending is always compared
//! against the monthly equivalent.

use serde::Serialize;

use crate::{Budget, BudgetPeriod, Money};

/// Share of a budget at which the status turns from good to warning.
pub const WARNING_THRESHOLD: f64 = 80.0;
/// Share of a budget at which the status turns to exceeded.
pub const EXCEEDED_THRESHOLD: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NormalizedBudget {
    pub monthly_equivalent: Money,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilizationLevel {
    Good,
    Warning,
    Exceeded,
}

impl UtilizationLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            UtilizationLevel::Good => "good",
            UtilizationLevel::Warning => "warning",
            UtilizationLevel::Exceeded => "exceeded",
        }
    }
}

/// Utilisation of a budget for one month.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Utilization {
    /// Uncapped percentage, for status text.
    pub percent: f64,
    /// Percentage capped at 100, for progress bars.
    pub progress: f64,
    pub level: UtilizationLevel,
}

impl Utilization {
    #[must_use]
    pub fn new(actual_spend: Money, monthly_equivalent: Money) -> Self {
        let percent = utilization_percent(actual_spend, monthly_equivalent);
        Self {
            percent,
            progress: percent.min(EXCEEDED_THRESHOLD),
            level: classify(percent),
        }
    }
}

#[must_use]
pub fn monthly_equivalent(amount: Money, period: BudgetPeriod) -> Money {
    match period {
        BudgetPeriod::Monthly => amount,
        BudgetPeriod::Yearly => Money::new((amount.as_f64() / 12.0).round() as i64),
    }
}

#[must_use]
pub fn normalize(budget: &Budget) -> NormalizedBudget {
    NormalizedBudget {
        monthly_equivalent: monthly_equivalent(budget.amount, budget.period),
    }
}

/// `actual / monthly * 100`, or `0` when the monthly amount is not positive.
#[must_use]
pub fn utilization_percent(actual_spend: Money, monthly_equivalent: Money) -> f64 {
    if !monthly_equivalent.is_positive() {
        return 0.0;
    }
    actual_spend.as_f64() / monthly_equivalent.as_f64() * 100.0
}

#[must_use]
pub fn classify(percent: f64) -> UtilizationLevel {
    if percent >= EXCEEDED_THRESHOLD {
        UtilizationLevel::Exceeded
    } else if percent >= WARNING_THRESHOLD {
        UtilizationLevel::Warning
    } else {
        UtilizationLevel::Good
    }
}
