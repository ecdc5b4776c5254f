//! Transaction service domain logic for the finance tracker.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{Months, NaiveDate, Utc};
use tracing::info;

use shared::TransactionType;

use crate::domain::aggregation::TransactionFilter;
use crate::domain::commands::transactions::{
    CreateTransactionCommand, SplitSavingsCommand, TransactionListQuery, UpdateTransactionCommand,
};
use crate::domain::models::transaction::Transaction;
use crate::storage::{Connection, GoalStorage, TransactionStorage};

/// Service for transaction CRUD and listing.
#[derive(Clone)]
pub struct TransactionService<C: Connection> {
    transaction_repository: C::TransactionRepository,
    goal_repository: C::GoalRepository,
    /// Household members allowed on the `person` field; empty means any.
    household: Vec<String>,
}

/// Inclusive first..last day window of one calendar month.
pub fn month_window(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("Invalid month: {year}-{month}"))?;
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| anyhow!("Invalid month: {year}-{month}"))?;
    Ok((start, end))
}

impl<C: Connection> TransactionService<C> {
    pub fn new(connection: Arc<C>, household: Vec<String>) -> Self {
        Self {
            transaction_repository: connection.create_transaction_repository(),
            goal_repository: connection.create_goal_repository(),
            household,
        }
    }

    fn validate_person(&self, person: &str) -> Result<()> {
        if person.trim().is_empty() {
            return Err(anyhow!("Person cannot be empty"));
        }
        if !self.household.is_empty() && !self.household.iter().any(|p| p == person) {
            return Err(anyhow!("Unknown household member: {person}"));
        }
        Ok(())
    }

    pub async fn create_transaction(&self, command: CreateTransactionCommand) -> Result<Transaction> {
        if command.amount <= 0.0 {
            return Err(anyhow!("Transaction amount must be positive"));
        }
        self.validate_person(&command.person)?;
        if command.transaction_type == TransactionType::Expense && command.category.is_none() {
            return Err(anyhow!("Expense transactions require a category"));
        }

        let transaction = Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            transaction_type: command.transaction_type,
            amount: command.amount,
            currency: command
                .currency
                .unwrap_or_else(|| shared::DEFAULT_CURRENCY.to_string()),
            category: command.category,
            sub_category: command.sub_category,
            person: command.person,
            date: command.date,
            note: command.note,
            goal_id: command.goal_id,
            created_at: Utc::now().to_rfc3339(),
        }
        .normalized();

        self.transaction_repository
            .store_transaction(&transaction)
            .await?;

        info!(
            "Created {} transaction {} of {:.2} {}",
            transaction.transaction_type.as_str(),
            transaction.id,
            transaction.amount,
            transaction.currency
        );

        Ok(transaction)
    }

    pub async fn update_transaction(
        &self,
        transaction_id: &str,
        command: UpdateTransactionCommand,
    ) -> Result<Transaction> {
        let mut transaction = self
            .transaction_repository
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| anyhow!("Transaction not found: {transaction_id}"))?;

        if let Some(amount) = command.amount {
            if amount <= 0.0 {
                return Err(anyhow!("Transaction amount must be positive"));
            }
            transaction.amount = amount;
        }
        if let Some(person) = command.person {
            self.validate_person(&person)?;
            transaction.person = person;
        }
        if let Some(category) = command.category {
            transaction.category = Some(category);
        }
        if let Some(sub_category) = command.sub_category {
            transaction.sub_category = Some(sub_category);
        }
        if let Some(date) = command.date {
            transaction.date = date;
        }
        if let Some(note) = command.note {
            transaction.note = Some(note);
        }
        if let Some(goal_id) = command.goal_id {
            transaction.goal_id = Some(goal_id);
        }

        let transaction = transaction.normalized();
        self.transaction_repository
            .update_transaction(&transaction)
            .await?;

        info!("Updated transaction {}", transaction.id);
        Ok(transaction)
    }

    pub async fn delete_transaction(&self, transaction_id: &str) -> Result<()> {
        let deleted = self
            .transaction_repository
            .delete_transaction(transaction_id)
            .await?;
        if !deleted {
            return Err(anyhow!("Transaction not found: {transaction_id}"));
        }
        info!("Deleted transaction {transaction_id}");
        Ok(())
    }

    /// List transactions, most recent first. A `month`/`year` pair narrows
    /// the fetch to that calendar month; the remaining filters intersect
    /// in memory.
    pub async fn list_transactions(&self, query: TransactionListQuery) -> Result<Vec<Transaction>> {
        let transactions = match (query.month, query.year) {
            (Some(month), Some(year)) => {
                let (start, end) = month_window(year, month)?;
                self.transaction_repository
                    .list_transactions_in_range(start, end)
                    .await?
            }
            (None, None) => self.transaction_repository.list_transactions().await?,
            _ => return Err(anyhow!("Month filtering requires both month and year")),
        };

        let filter = TransactionFilter {
            person: query.person,
            category: query.category,
            start_date: query.start_date,
            end_date: query.end_date,
        };
        if filter.is_empty() {
            return Ok(transactions);
        }
        Ok(filter.apply(transactions))
    }

    /// Savings transactions currently linked to a goal.
    pub async fn list_goal_savings(&self) -> Result<Vec<Transaction>> {
        self.transaction_repository.list_goal_savings().await
    }

    /// Convenience policy: split one savings amount evenly across every
    /// existing goal, recording one independently well-formed contribution
    /// per goal. Not a core invariant, just a shortcut for the entry form.
    pub async fn create_split_savings(
        &self,
        command: SplitSavingsCommand,
    ) -> Result<Vec<Transaction>> {
        if command.amount <= 0.0 {
            return Err(anyhow!("Transaction amount must be positive"));
        }
        self.validate_person(&command.person)?;

        let goals = self.goal_repository.list_goals().await?;
        if goals.is_empty() {
            return Err(anyhow!("No goals to split the savings across"));
        }

        let share = command.amount / goals.len() as f64;
        let mut created = Vec::with_capacity(goals.len());

        for goal in goals {
            let note = match &command.note {
                Some(note) => Some(format!("{note} ({})", goal.name)),
                None => Some(goal.name.clone()),
            };
            let transaction = self
                .create_transaction(CreateTransactionCommand {
                    transaction_type: TransactionType::Savings,
                    amount: share,
                    currency: Some(goal.currency.clone()),
                    category: None,
                    sub_category: None,
                    person: command.person.clone(),
                    date: command.date,
                    note,
                    goal_id: Some(goal.id.clone()),
                })
                .await?;
            created.push(transaction);
        }

        info!(
            "Split savings of {:.2} across {} goals",
            command.amount,
            created.len()
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::goal::Goal;
    use crate::storage::DbConnection;
    use shared::ExpenseCategory;

    async fn create_test_service() -> (TransactionService<DbConnection>, Arc<DbConnection>) {
        let connection = Arc::new(DbConnection::init_test().await.unwrap());
        let service = TransactionService::new(
            connection.clone(),
            vec!["Alex".to_string(), "Sam".to_string()],
        );
        (service, connection)
    }

    fn create_command(
        transaction_type: TransactionType,
        amount: f64,
        person: &str,
    ) -> CreateTransactionCommand {
        CreateTransactionCommand {
            transaction_type,
            amount,
            currency: None,
            category: if transaction_type == TransactionType::Expense {
                Some(ExpenseCategory::Food)
            } else {
                None
            },
            sub_category: None,
            person: person.to_string(),
            date: "2026-04-10".parse().unwrap(),
            note: None,
            goal_id: None,
        }
    }

    async fn store_goal(connection: &Arc<DbConnection>, id: &str, created_at: &str) {
        connection
            .create_goal_repository()
            .store_goal(&Goal {
                id: id.to_string(),
                name: format!("Goal {id}"),
                target_amount: 5000.0,
                currency: shared::DEFAULT_CURRENCY.to_string(),
                created_at: created_at.to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_transaction_assigns_id_and_defaults() {
        let (service, _) = create_test_service().await;

        let tx = service
            .create_transaction(create_command(TransactionType::Income, 5000.0, "Alex"))
            .await
            .unwrap();

        assert!(!tx.id.is_empty());
        assert_eq!(tx.currency, "PLN");
        assert!(!tx.created_at.is_empty());
    }

    #[tokio::test]
    async fn test_create_transaction_validation() {
        let (service, _) = create_test_service().await;

        let result = service
            .create_transaction(create_command(TransactionType::Income, 0.0, "Alex"))
            .await;
        assert!(result.unwrap_err().to_string().contains("must be positive"));

        let result = service
            .create_transaction(create_command(TransactionType::Income, 10.0, "Nobody"))
            .await;
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown household member"));

        let mut command = create_command(TransactionType::Expense, 10.0, "Alex");
        command.category = None;
        let result = service.create_transaction(command).await;
        assert!(result.unwrap_err().to_string().contains("require a category"));
    }

    #[tokio::test]
    async fn test_create_transaction_normalizes_conditional_fields() {
        let (service, _) = create_test_service().await;

        let mut command = create_command(TransactionType::Income, 100.0, "Alex");
        command.category = Some(ExpenseCategory::Bills);
        command.goal_id = Some("g1".to_string());
        let tx = service.create_transaction(command).await.unwrap();

        assert_eq!(tx.category, None);
        assert_eq!(tx.goal_id, None);
    }

    #[tokio::test]
    async fn test_update_transaction_partial() {
        let (service, _) = create_test_service().await;
        let tx = service
            .create_transaction(create_command(TransactionType::Expense, 200.0, "Alex"))
            .await
            .unwrap();

        let updated = service
            .update_transaction(
                &tx.id,
                UpdateTransactionCommand {
                    amount: Some(250.0),
                    person: Some("Sam".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.amount, 250.0);
        assert_eq!(updated.person, "Sam");
        assert_eq!(updated.category, tx.category);

        let result = service
            .update_transaction("missing", UpdateTransactionCommand::default())
            .await;
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_list_with_month_window_and_filters() {
        let (service, _) = create_test_service().await;

        let mut in_march = create_command(TransactionType::Expense, 100.0, "Alex");
        in_march.date = "2026-03-15".parse().unwrap();
        service.create_transaction(in_march).await.unwrap();

        let mut in_april = create_command(TransactionType::Expense, 200.0, "Sam");
        in_april.date = "2026-04-02".parse().unwrap();
        service.create_transaction(in_april).await.unwrap();

        let march = service
            .list_transactions(TransactionListQuery {
                month: Some(3),
                year: Some(2026),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(march.len(), 1);
        assert_eq!(march[0].amount, 100.0);

        let sam_only = service
            .list_transactions(TransactionListQuery {
                person: Some("Sam".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(sam_only.len(), 1);
        assert_eq!(sam_only[0].amount, 200.0);

        let result = service
            .list_transactions(TransactionListQuery {
                month: Some(3),
                ..Default::default()
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_split_savings_even_across_goals() {
        let (service, connection) = create_test_service().await;
        store_goal(&connection, "g1", "2026-01-01T00:00:00Z").await;
        store_goal(&connection, "g2", "2026-01-02T00:00:00Z").await;
        store_goal(&connection, "g3", "2026-01-03T00:00:00Z").await;

        let created = service
            .create_split_savings(SplitSavingsCommand {
                amount: 900.0,
                person: "Alex".to_string(),
                date: "2026-04-10".parse().unwrap(),
                note: Some("monthly".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(created.len(), 3);
        let total: f64 = created.iter().map(|t| t.amount).sum();
        assert_eq!(total, 900.0);

        let mut goal_ids: Vec<String> = created.iter().filter_map(|t| t.goal_id.clone()).collect();
        goal_ids.sort();
        assert_eq!(goal_ids, vec!["g1", "g2", "g3"]);
        assert!(created
            .iter()
            .all(|t| t.transaction_type == TransactionType::Savings));
    }

    #[tokio::test]
    async fn test_split_savings_requires_goals() {
        let (service, _) = create_test_service().await;
        let result = service
            .create_split_savings(SplitSavingsCommand {
                amount: 900.0,
                person: "Alex".to_string(),
                date: "2026-04-10".parse().unwrap(),
                note: None,
            })
            .await;
        assert!(result.unwrap_err().to_string().contains("No goals"));
    }

    #[test]
    fn test_month_window_bounds() {
        let (start, end) = month_window(2026, 2).unwrap();
        assert_eq!(start.to_string(), "2026-02-01");
        assert_eq!(end.to_string(), "2026-02-28");

        let (start, end) = month_window(2024, 2).unwrap();
        assert_eq!(start.to_string(), "2024-02-01");
        assert_eq!(end.to_string(), "2024-02-29");

        assert!(month_window(2026, 13).is_err());
    }
}
