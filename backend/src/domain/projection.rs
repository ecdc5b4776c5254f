//! Goal completion forecasting.
//!
//! The forecast extrapolates from the arithmetic mean of monthly
//! contributions over months that actually saw activity; quiet months are
//! never synthesized as zeroes and so never dilute the average.

use chrono::{Datelike, Months, NaiveDate};
use shared::GoalMonthlyContribution;

use crate::domain::models::transaction::Transaction;

/// Completion forecast for a goal.
#[derive(Debug, Clone, PartialEq)]
pub enum GoalProjection {
    /// The saved amount already meets or exceeds the target.
    Achieved,
    /// Nothing to extrapolate from: no contribution history, or a
    /// non-positive monthly average.
    InsufficientData { remaining: f64 },
    Projected {
        date: NaiveDate,
        months_remaining: u32,
        avg_monthly: f64,
        remaining: f64,
    },
}

/// Chronological per-month contribution totals for one goal. Only months
/// with at least one linked contribution appear.
pub fn monthly_contributions(
    transactions: &[Transaction],
    goal_id: &str,
) -> Vec<GoalMonthlyContribution> {
    let mut buckets: Vec<GoalMonthlyContribution> = Vec::new();

    for t in transactions
        .iter()
        .filter(|t| t.is_savings() && t.goal_id.as_deref() == Some(goal_id))
    {
        let (year, month) = (t.date.year(), t.date.month());
        match buckets
            .iter_mut()
            .find(|b| b.year == year && b.month == month)
        {
            Some(bucket) => bucket.total += t.amount,
            None => buckets.push(GoalMonthlyContribution {
                year,
                month,
                total: t.amount,
            }),
        }
    }

    buckets.sort_by_key(|b| (b.year, b.month));
    buckets
}

/// Forecast when a goal will be reached.
///
/// `today` is injected so callers decide the reference date; services pass
/// the current local date. Advancing by N months uses ordinary
/// calendar-month arithmetic, which may clamp the day-of-month at month-end.
pub fn project_completion(
    target_amount: f64,
    current_amount: f64,
    contributions: &[GoalMonthlyContribution],
    today: NaiveDate,
) -> GoalProjection {
    let remaining = target_amount - current_amount;
    if remaining <= 0.0 {
        return GoalProjection::Achieved;
    }

    if contributions.is_empty() {
        return GoalProjection::InsufficientData { remaining };
    }

    let total_saved: f64 = contributions.iter().map(|c| c.total).sum();
    let avg_monthly = total_saved / contributions.len() as f64;
    if avg_monthly <= 0.0 {
        return GoalProjection::InsufficientData { remaining };
    }

    let months_remaining = (remaining / avg_monthly).ceil() as u32;
    let date = today
        .checked_add_months(Months::new(months_remaining))
        .unwrap_or(NaiveDate::MAX);

    GoalProjection::Projected {
        date,
        months_remaining,
        avg_monthly,
        remaining,
    }
}
