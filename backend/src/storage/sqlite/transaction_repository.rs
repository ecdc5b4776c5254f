//! SQLite-backed transaction repository.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row};

use shared::{ExpenseCategory, TransactionType};

use crate::domain::models::transaction::Transaction;
use crate::storage::traits::TransactionStorage;

use super::connection::DbConnection;

/// Repository for transaction rows.
#[derive(Clone)]
pub struct TransactionRepository {
    db: DbConnection,
}

impl TransactionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
    let type_str: String = row.get("type");
    let transaction_type =
        TransactionType::parse(&type_str).context("invalid transaction type in storage")?;

    let category: Option<ExpenseCategory> = match row.get::<Option<String>, _>("category") {
        Some(value) => Some(ExpenseCategory::parse(&value).context("invalid category in storage")?),
        None => None,
    };

    let date_str: String = row.get("date");
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .context("invalid transaction date in storage")?;

    Ok(Transaction {
        id: row.get("id"),
        transaction_type,
        amount: row.get("amount"),
        currency: row.get("currency"),
        category,
        sub_category: row.get("sub_category"),
        person: row.get("person"),
        date,
        note: row.get("note"),
        goal_id: row.get("goal_id"),
        created_at: row.get("created_at"),
    })
}

const SELECT_COLUMNS: &str = "id, type, amount, currency, category, sub_category, person, date, note, goal_id, created_at";

#[async_trait]
impl TransactionStorage for TransactionRepository {
    async fn store_transaction(&self, transaction: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, type, amount, currency, category, sub_category, person, date, note, goal_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&transaction.id)
        .bind(transaction.transaction_type.as_str())
        .bind(transaction.amount)
        .bind(&transaction.currency)
        .bind(transaction.category.map(|c| c.as_str()))
        .bind(&transaction.sub_category)
        .bind(&transaction.person)
        .bind(transaction.date.to_string())
        .bind(&transaction.note)
        .bind(&transaction.goal_id)
        .bind(&transaction.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions WHERE id = ?"
        ))
        .bind(transaction_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(row_to_transaction).transpose()
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions ORDER BY date DESC, created_at DESC"
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_transaction).collect()
    }

    async fn list_transactions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        // ISO dates compare correctly as text, so the window is a plain
        // string comparison, inclusive on both ends.
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions WHERE date >= ? AND date <= ? ORDER BY date DESC, created_at DESC"
        ))
        .bind(start.to_string())
        .bind(end.to_string())
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_transaction).collect()
    }

    async fn list_goal_savings(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions WHERE type = 'savings' AND goal_id IS NOT NULL ORDER BY date DESC, created_at DESC"
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_transaction).collect()
    }

    async fn update_transaction(&self, transaction: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE transactions
            SET type = ?, amount = ?, currency = ?, category = ?, sub_category = ?, person = ?, date = ?, note = ?, goal_id = ?
            WHERE id = ?
            "#,
        )
        .bind(transaction.transaction_type.as_str())
        .bind(transaction.amount)
        .bind(&transaction.currency)
        .bind(transaction.category.map(|c| c.as_str()))
        .bind(&transaction.sub_category)
        .bind(&transaction.person)
        .bind(transaction.date.to_string())
        .bind(&transaction.note)
        .bind(&transaction.goal_id)
        .bind(&transaction.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_transaction(&self, transaction_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(transaction_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_goal_links(&self, goal_id: &str) -> Result<u32> {
        let result = sqlx::query("UPDATE transactions SET goal_id = NULL WHERE goal_id = ?")
            .bind(goal_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() as u32)
    }
}
