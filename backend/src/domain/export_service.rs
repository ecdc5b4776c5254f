//! CSV export of the transaction history.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::info;

use crate::storage::{Connection, TransactionStorage};

/// Service rendering the full transaction history as CSV.
#[derive(Clone)]
pub struct ExportService<C: Connection> {
    transaction_repository: C::TransactionRepository,
}

impl<C: Connection> ExportService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            transaction_repository: connection.create_transaction_repository(),
        }
    }

    /// All transactions as CSV, oldest first.
    pub async fn export_transactions_csv(&self) -> Result<String> {
        let mut transactions = self.transaction_repository.list_transactions().await?;
        if transactions.is_empty() {
            return Err(anyhow!("No transactions to export"));
        }

        // Exports read chronologically, unlike the UI listing.
        transactions.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "date",
            "type",
            "amount",
            "currency",
            "category",
            "sub_category",
            "person",
            "note",
            "goal_id",
        ])?;

        for t in &transactions {
            writer.write_record([
                t.date.to_string().as_str(),
                t.transaction_type.as_str(),
                &t.amount.to_string(),
                &t.currency,
                t.category.map(|c| c.as_str()).unwrap_or(""),
                t.sub_category.as_deref().unwrap_or(""),
                &t.person,
                t.note.as_deref().unwrap_or(""),
                t.goal_id.as_deref().unwrap_or(""),
            ])?;
        }

        let bytes = writer.into_inner()?;
        let content = String::from_utf8(bytes)?;
        info!("Exported {} transactions as CSV", transactions.len());
        Ok(content)
    }
}
