//! Analytics rollups and the AI narrative flow.
//!
//! Everything is recomputed from the full transaction set on each request;
//! nothing here keeps running totals.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Datelike;
use tracing::info;

use shared::{AnalyticsSummary, FinanceAnalysis, MonthlyRollup, TransactionType};

use crate::clients::traits::{NarrativeApi, NarrativeRequest};
use crate::domain::aggregation;
use crate::domain::commands::analytics::{SummaryQuery, SummaryResult};
use crate::domain::models::transaction::Transaction;
use crate::storage::{Connection, TransactionStorage};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Service producing dashboard and analytics aggregates.
#[derive(Clone)]
pub struct AnalyticsService<C: Connection, N: NarrativeApi + Clone> {
    transaction_repository: C::TransactionRepository,
    narrative: N,
}

fn validate_months(months: &[u32]) -> Result<()> {
    if months.is_empty() {
        return Err(anyhow!("Select at least one month"));
    }
    if let Some(bad) = months.iter().find(|m| **m < 1 || **m > 12) {
        return Err(anyhow!("Invalid month: {bad}"));
    }
    Ok(())
}

impl<C: Connection, N: NarrativeApi + Clone> AnalyticsService<C, N> {
    pub fn new(connection: Arc<C>, narrative: N) -> Self {
        Self {
            transaction_repository: connection.create_transaction_repository(),
            narrative,
        }
    }

    /// All twelve monthly rollups for one year.
    pub async fn yearly_rollup(&self, year: i32) -> Result<Vec<MonthlyRollup>> {
        let transactions = self.transaction_repository.list_transactions().await?;
        Ok(aggregation::monthly_rollup(&transactions, year))
    }

    /// Rollups, category breakdown and totals over a selected set of months
    /// of one year.
    pub async fn summary(&self, query: SummaryQuery) -> Result<SummaryResult> {
        validate_months(&query.months)?;
        let mut selected_months = query.months.clone();
        selected_months.sort_unstable();
        selected_months.dedup();

        let transactions = self.transaction_repository.list_transactions().await?;
        let all_rollups = aggregation::monthly_rollup(&transactions, query.year);

        let rollups: Vec<MonthlyRollup> = all_rollups
            .into_iter()
            .filter(|m| selected_months.contains(&m.month))
            .collect();

        let selected_transactions: Vec<Transaction> = transactions
            .into_iter()
            .filter(|t| {
                t.date.year() == query.year && selected_months.contains(&t.date.month())
            })
            .collect();

        let category_totals = aggregation::category_totals(&selected_transactions);

        let total_income: f64 = rollups.iter().map(|m| m.income).sum();
        let total_expenses: f64 = rollups.iter().map(|m| m.expenses).sum();
        let total_savings: f64 = rollups.iter().map(|m| m.savings).sum();
        let month_count = rollups.len().max(1) as f64;
        let fixed_expenses = aggregation::fixed_expense_total(&selected_transactions);

        let summary = AnalyticsSummary {
            total_income,
            total_expenses,
            total_savings,
            total_balance: total_income - total_expenses - total_savings,
            avg_monthly_income: total_income / month_count,
            avg_monthly_expense: total_expenses / month_count,
            fixed_expenses,
            after_fixed: total_income - fixed_expenses - total_savings,
        };

        Ok(SummaryResult {
            year: query.year,
            selected_months,
            rollups,
            category_totals,
            summary,
        })
    }

    /// Build the aggregates for the selected months and hand them to the
    /// narrative collaborator.
    pub async fn analyze(&self, query: SummaryQuery) -> Result<FinanceAnalysis> {
        let result = self.summary(query).await?;

        let month_labels = result
            .rollups
            .iter()
            .map(|m| {
                format!(
                    "{} {}",
                    MONTH_NAMES[(m.month - 1) as usize],
                    result.year
                )
            })
            .collect();

        let request = NarrativeRequest {
            month_labels,
            monthly: result.rollups,
            categories: result.category_totals,
            total_income: result.summary.total_income,
            total_expenses: result.summary.total_expenses,
            total_savings: result.summary.total_savings,
        };

        info!(
            "Requesting narrative analysis for {} months of {}",
            request.monthly.len(),
            result.year
        );
        self.narrative.analyze(&request).await
    }

    /// Sums by type over all transactions, for the dashboard header.
    pub async fn totals_by_type(&self) -> Result<(f64, f64, f64)> {
        let transactions = self.transaction_repository.list_transactions().await?;
        Ok((
            aggregation::sum_by_type(&transactions, TransactionType::Income),
            aggregation::sum_by_type(&transactions, TransactionType::Expense),
            aggregation::sum_by_type(&transactions, TransactionType::Savings),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::transactions::CreateTransactionCommand;
    use crate::domain::transaction_service::TransactionService;
    use crate::storage::DbConnection;
    use async_trait::async_trait;
    use shared::ExpenseCategory;

    /// Narrative double that replays a canned analysis and records the
    /// request it got.
    #[derive(Clone, Default)]
    struct FakeNarrative {
        seen: Arc<tokio::sync::Mutex<Option<NarrativeRequest>>>,
    }

    #[async_trait]
    impl NarrativeApi for FakeNarrative {
        async fn analyze(&self, request: &NarrativeRequest) -> Result<FinanceAnalysis> {
            *self.seen.lock().await = Some(request.clone());
            Ok(FinanceAnalysis {
                trend_analysis: "stable".to_string(),
                top_insights: vec!["a".into(), "b".into(), "c".into()],
                suggestions: vec!["x".into(), "y".into(), "z".into()],
                risk_level: shared::RiskLevel::Low,
                savings_rate: "10%".to_string(),
                biggest_expense_category: "food".to_string(),
                monthly_trend: shared::MonthlyTrend::Stable,
            })
        }
    }

    async fn create_test_service() -> (
        AnalyticsService<DbConnection, FakeNarrative>,
        TransactionService<DbConnection>,
        FakeNarrative,
    ) {
        let connection = Arc::new(DbConnection::init_test().await.unwrap());
        let narrative = FakeNarrative::default();
        (
            AnalyticsService::new(connection.clone(), narrative.clone()),
            TransactionService::new(connection, vec![]),
            narrative,
        )
    }

    async fn record(
        transactions: &TransactionService<DbConnection>,
        transaction_type: TransactionType,
        amount: f64,
        category: Option<ExpenseCategory>,
        date: &str,
    ) {
        transactions
            .create_transaction(CreateTransactionCommand {
                transaction_type,
                amount,
                currency: None,
                category,
                sub_category: None,
                person: "Alex".to_string(),
                date: date.parse().unwrap(),
                note: None,
                goal_id: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_yearly_rollup_has_twelve_months() {
        let (analytics, transactions, _) = create_test_service().await;
        record(&transactions, TransactionType::Income, 5000.0, None, "2026-01-05").await;

        let rollup = analytics.yearly_rollup(2026).await.unwrap();
        assert_eq!(rollup.len(), 12);
        assert_eq!(rollup[0].income, 5000.0);
        assert!(rollup[1..].iter().all(|m| m.income == 0.0));
    }

    #[tokio::test]
    async fn test_summary_selected_months() {
        let (analytics, transactions, _) = create_test_service().await;
        record(&transactions, TransactionType::Income, 6000.0, None, "2026-01-05").await;
        record(
            &transactions,
            TransactionType::Expense,
            1000.0,
            Some(ExpenseCategory::Bills),
            "2026-01-10",
        )
        .await;
        record(
            &transactions,
            TransactionType::Expense,
            400.0,
            Some(ExpenseCategory::Food),
            "2026-02-10",
        )
        .await;
        record(&transactions, TransactionType::Savings, 500.0, None, "2026-02-15").await;
        // Outside the selection; must not leak in.
        record(&transactions, TransactionType::Income, 9999.0, None, "2026-03-01").await;

        let result = analytics
            .summary(SummaryQuery {
                year: 2026,
                months: vec![1, 2],
            })
            .await
            .unwrap();

        assert_eq!(result.rollups.len(), 2);
        assert_eq!(result.summary.total_income, 6000.0);
        assert_eq!(result.summary.total_expenses, 1400.0);
        assert_eq!(result.summary.total_savings, 500.0);
        assert_eq!(result.summary.total_balance, 4100.0);
        assert_eq!(result.summary.avg_monthly_income, 3000.0);
        assert_eq!(result.summary.fixed_expenses, 1000.0);
        assert_eq!(result.summary.after_fixed, 4500.0);

        // Only the two active categories appear.
        assert_eq!(result.category_totals.len(), 2);
    }

    #[tokio::test]
    async fn test_summary_validates_months() {
        let (analytics, _, _) = create_test_service().await;
        assert!(analytics
            .summary(SummaryQuery {
                year: 2026,
                months: vec![],
            })
            .await
            .is_err());
        assert!(analytics
            .summary(SummaryQuery {
                year: 2026,
                months: vec![13],
            })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_analyze_builds_labels_and_totals() {
        let (analytics, transactions, narrative) = create_test_service().await;
        record(&transactions, TransactionType::Income, 5000.0, None, "2026-03-05").await;

        let analysis = analytics
            .analyze(SummaryQuery {
                year: 2026,
                months: vec![3],
            })
            .await
            .unwrap();
        assert_eq!(analysis.risk_level, shared::RiskLevel::Low);

        let seen = narrative.seen.lock().await.clone().unwrap();
        assert_eq!(seen.month_labels, vec!["March 2026"]);
        assert_eq!(seen.total_income, 5000.0);
    }
}
