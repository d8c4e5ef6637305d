//! Calendar arithmetic for recurring expenses and budget periods.
//!
//! Month arithmetic clamps to the last valid day of the target month:
//! `2024-01-31 + 1 month = 2024-02-29`, `2024-02-29 + 1 year = 2025-02-28`.
//! Due dates are always derived from the anchor date, never chained from a
//! previously derived due date, so clamping cannot accumulate.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::{BudgetPeriod, Recurrence};

/// Next due date of an expense anchored on `anchor` with recurrence `kind`.
///
/// Returns `None` for [`Recurrence::None`] (and for the unreachable case of a
/// date beyond chrono's range).
#[must_use]
pub fn next_due_date(anchor: NaiveDate, kind: Recurrence) -> Option<NaiveDate> {
    let months = kind.months()?;
    anchor.checked_add_months(Months::new(months))
}

/// Last day covered by a budget starting on `start`: one period later, minus a day.
#[must_use]
pub fn period_end(start: NaiveDate, period: BudgetPeriod) -> NaiveDate {
    start
        .checked_add_months(Months::new(period.months()))
        .and_then(|next| next.checked_sub_days(Days::new(1)))
        .unwrap_or(NaiveDate::MAX)
}

/// First and last day of the calendar month containing `day`.
#[must_use]
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = day.with_day0(0).unwrap_or(day);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.checked_sub_days(Days::new(1)))
        .unwrap_or(NaiveDate::MAX);
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn one_off_has_no_due_date() {
        assert_eq!(next_due_date(date(2024, 1, 31), Recurrence::None), None);
    }

    #[test]
    fn monthly_clamps_to_end_of_february() {
        assert_eq!(
            next_due_date(date(2024, 1, 31), Recurrence::Monthly),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            next_due_date(date(2023, 1, 31), Recurrence::Monthly),
            Some(date(2023, 2, 28))
        );
    }

    #[test]
    fn quarterly_and_yearly() {
        assert_eq!(
            next_due_date(date(2023, 11, 30), Recurrence::Quarterly),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            next_due_date(date(2024, 1, 31), Recurrence::Yearly),
            Some(date(2025, 1, 31))
        );
        assert_eq!(
            next_due_date(date(2024, 2, 29), Recurrence::Yearly),
            Some(date(2025, 2, 28))
        );
    }

    #[test]
    fn recomputing_from_same_anchor_is_stable() {
        let anchor = date(2024, 1, 31);
        for kind in [Recurrence::Monthly, Recurrence::Quarterly, Recurrence::Yearly] {
            assert_eq!(next_due_date(anchor, kind), next_due_date(anchor, kind));
        }
    }

    #[test]
    fn budget_period_end() {
        assert_eq!(
            period_end(date(2024, 1, 1), BudgetPeriod::Monthly),
            date(2024, 1, 31)
        );
        assert_eq!(
            period_end(date(2024, 3, 15), BudgetPeriod::Yearly),
            date(2025, 3, 14)
        );
        assert_eq!(
            period_end(date(2024, 1, 31), BudgetPeriod::Monthly),
            date(2024, 2, 28)
        );
    }

    #[test]
    fn month_bounds_cover_leap_february() {
        assert_eq!(
            month_bounds(date(2024, 2, 10)),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
    }
}
