//! SQLite connection management and schema setup.

use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

use crate::storage::traits::Connection;

use super::{GoalRepository, TransactionRepository, UserRoleRepository};

/// DbConnection manages the SQLite pool shared by all repositories.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection, creating the database and schema
    /// when missing.
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?;
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize an in-memory database with a unique name, so parallel
    /// tests never share state.
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);
        Self::new(&url).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                type TEXT NOT NULL,
                amount REAL NOT NULL,
                currency TEXT NOT NULL,
                category TEXT,
                sub_category TEXT,
                person TEXT NOT NULL,
                date TEXT NOT NULL,
                note TEXT,
                goal_id TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_date
            ON transactions(date DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_goal_id
            ON transactions(goal_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS goals (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                target_amount REAL NOT NULL,
                currency TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_roles (
                user_id TEXT PRIMARY KEY,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

impl Connection for DbConnection {
    type TransactionRepository = TransactionRepository;
    type GoalRepository = GoalRepository;
    type UserRoleRepository = UserRoleRepository;

    fn create_transaction_repository(&self) -> TransactionRepository {
        TransactionRepository::new(self.clone())
    }

    fn create_goal_repository(&self) -> GoalRepository {
        GoalRepository::new(self.clone())
    }

    fn create_user_role_repository(&self) -> UserRoleRepository {
        UserRoleRepository::new(self.clone())
    }
}
