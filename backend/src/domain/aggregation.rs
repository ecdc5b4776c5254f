//! Pure aggregation over transaction lists.
//!
//! Everything here is recomputed from the full transaction set on each call
//! rather than maintained incrementally, so derived figures can never drift
//! from the stored rows. All sums are plain f64 addition with no rounding;
//! display rounding is a presentation concern.

use chrono::{Datelike, NaiveDate};
use shared::{CategoryTotal, ExpenseCategory, MonthlyRollup, TransactionType};

use crate::domain::models::transaction::Transaction;

/// Sum of amounts over transactions of the given type. Empty input is 0.
pub fn sum_by_type(transactions: &[Transaction], transaction_type: TransactionType) -> f64 {
    transactions
        .iter()
        .filter(|t| t.transaction_type == transaction_type)
        .map(|t| t.amount)
        .sum()
}

/// Expense totals per category, in enum order, with zero-total categories
/// left out entirely. Expense rows without a category are counted under
/// `Other`.
pub fn category_totals(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals = [0.0f64; ExpenseCategory::ALL.len()];

    for t in transactions.iter().filter(|t| t.is_expense()) {
        let category = t.category.unwrap_or(ExpenseCategory::Other);
        let index = ExpenseCategory::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap_or(ExpenseCategory::ALL.len() - 1);
        totals[index] += t.amount;
    }

    ExpenseCategory::ALL
        .iter()
        .zip(totals)
        .filter(|(_, total)| *total > 0.0)
        .map(|(category, total)| CategoryTotal {
            category: *category,
            total,
        })
        .collect()
}

/// Per-month income/expense/savings totals for one calendar year.
///
/// Always returns exactly 12 entries (months 1..=12), all-zero when no
/// transaction falls in a month. A transaction belongs to the month of its
/// `date`, not its `created_at`.
pub fn monthly_rollup(transactions: &[Transaction], year: i32) -> Vec<MonthlyRollup> {
    let mut months: Vec<MonthlyRollup> = (1..=12)
        .map(|month| MonthlyRollup {
            month,
            income: 0.0,
            expenses: 0.0,
            savings: 0.0,
            balance: 0.0,
        })
        .collect();

    for t in transactions {
        if t.date.year() != year {
            continue;
        }
        let entry = &mut months[t.date.month0() as usize];
        match t.transaction_type {
            TransactionType::Income => entry.income += t.amount,
            TransactionType::Expense => entry.expenses += t.amount,
            TransactionType::Savings => entry.savings += t.amount,
        }
    }

    for entry in &mut months {
        entry.balance = entry.income - entry.expenses - entry.savings;
    }

    months
}

/// Amount saved toward one goal: the sum over savings transactions linked to
/// it. Unlinked savings never count toward any goal.
pub fn goal_progress(transactions: &[Transaction], goal_id: &str) -> f64 {
    transactions
        .iter()
        .filter(|t| t.is_savings() && t.goal_id.as_deref() == Some(goal_id))
        .map(|t| t.amount)
        .sum()
}

/// Sum of expenses in the fixed-obligation categories (bills, loans,
/// installments). Feeds the "income minus fixed obligations minus savings"
/// figure on the dashboard.
pub fn fixed_expense_total(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|t| t.is_expense() && t.category.is_some_and(|c| c.is_fixed()))
        .map(|t| t.amount)
        .sum()
}

/// Composable transaction filter. Every populated bound must pass; the date
/// range is inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub person: Option<String>,
    pub category: Option<ExpenseCategory>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(person) = &self.person {
            if &transaction.person != person {
                return false;
            }
        }
        if let Some(category) = self.category {
            if transaction.category != Some(category) {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if transaction.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if transaction.date > end {
                return false;
            }
        }
        true
    }

    /// Keep only the transactions passing every populated bound.
    pub fn apply(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        transactions
            .into_iter()
            .filter(|t| self.matches(t))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == TransactionFilter::default()
    }
}
