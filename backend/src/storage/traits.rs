//! # Storage Traits
//!
//! Abstraction over the backing relational store. The domain layer only
//! talks to these traits, so the concrete store (SQLite here, a hosted
//! database elsewhere) can be swapped without touching business logic.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::models::{goal::Goal, transaction::Transaction};

/// Storage operations for transactions.
#[async_trait]
pub trait TransactionStorage: Send + Sync {
    /// Store a new transaction
    async fn store_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Retrieve a specific transaction by ID
    async fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>>;

    /// List all transactions ordered by date descending (most recent first)
    async fn list_transactions(&self) -> Result<Vec<Transaction>>;

    /// List transactions inside an inclusive date window, date descending
    async fn list_transactions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>>;

    /// List savings transactions that are linked to a goal
    async fn list_goal_savings(&self) -> Result<Vec<Transaction>>;

    /// Replace an existing transaction row
    async fn update_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Delete a transaction. Returns true if a row was removed
    async fn delete_transaction(&self, transaction_id: &str) -> Result<bool>;

    /// Null out the goal link on every transaction referencing the goal.
    /// Returns the number of rows unlinked. The rows themselves survive.
    async fn clear_goal_links(&self, goal_id: &str) -> Result<u32>;
}

/// Storage operations for goals.
#[async_trait]
pub trait GoalStorage: Send + Sync {
    /// Store a new goal
    async fn store_goal(&self, goal: &Goal) -> Result<()>;

    /// Retrieve a specific goal by ID
    async fn get_goal(&self, goal_id: &str) -> Result<Option<Goal>>;

    /// List all goals ordered by creation time ascending (oldest first)
    async fn list_goals(&self) -> Result<Vec<Goal>>;

    /// Delete a goal. Returns true if a row was removed
    async fn delete_goal(&self, goal_id: &str) -> Result<bool>;
}

/// Storage operations for the whitelist role assignments.
#[async_trait]
pub trait UserRoleStorage: Send + Sync {
    /// Insert a role row for a user; existing rows are left untouched
    async fn upsert_role(&self, user_id: &str, role: &str) -> Result<()>;

    /// Direct lookup of a user's role row
    async fn get_role(&self, user_id: &str) -> Result<Option<String>>;

    /// Dedicated membership check: does any role row exist for the user
    async fn membership_exists(&self, user_id: &str) -> Result<bool>;
}

/// Factory for repositories bound to one storage connection.
///
/// Services hold repositories created through this trait, which keeps them
/// generic over the storage backend.
pub trait Connection: Send + Sync + Clone {
    type TransactionRepository: TransactionStorage + Clone;
    type GoalRepository: GoalStorage + Clone;
    type UserRoleRepository: UserRoleStorage + Clone;

    fn create_transaction_repository(&self) -> Self::TransactionRepository;
    fn create_goal_repository(&self) -> Self::GoalRepository;
    fn create_user_role_repository(&self) -> Self::UserRoleRepository;
}
