//! SQLite-backed goal repository.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use crate::domain::models::goal::Goal;
use crate::storage::traits::GoalStorage;

use super::connection::DbConnection;

/// Repository for goal rows.
#[derive(Clone)]
pub struct GoalRepository {
    db: DbConnection,
}

impl GoalRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

fn row_to_goal(row: &SqliteRow) -> Goal {
    Goal {
        id: row.get("id"),
        name: row.get("name"),
        target_amount: row.get("target_amount"),
        currency: row.get("currency"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl GoalStorage for GoalRepository {
    async fn store_goal(&self, goal: &Goal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO goals (id, name, target_amount, currency, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&goal.id)
        .bind(&goal.name)
        .bind(goal.target_amount)
        .bind(&goal.currency)
        .bind(&goal.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_goal(&self, goal_id: &str) -> Result<Option<Goal>> {
        let row = sqlx::query(
            "SELECT id, name, target_amount, currency, created_at FROM goals WHERE id = ?",
        )
        .bind(goal_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(row_to_goal))
    }

    async fn list_goals(&self) -> Result<Vec<Goal>> {
        let rows = sqlx::query(
            "SELECT id, name, target_amount, currency, created_at FROM goals ORDER BY created_at ASC",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(row_to_goal).collect())
    }

    async fn delete_goal(&self, goal_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM goals WHERE id = ?")
            .bind(goal_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::Connection;

    fn test_goal(id: &str, created_at: &str) -> Goal {
        Goal {
            id: id.to_string(),
            name: format!("Goal {id}"),
            target_amount: 10000.0,
            currency: shared::DEFAULT_CURRENCY.to_string(),
            created_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_and_get_round_trip() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = db.create_goal_repository();

        let goal = test_goal("g1", "2026-01-01T10:00:00Z");
        repo.store_goal(&goal).await.unwrap();

        assert_eq!(repo.get_goal("g1").await.unwrap().unwrap(), goal);
        assert!(repo.get_goal("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_ordered_oldest_first() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = db.create_goal_repository();

        repo.store_goal(&test_goal("newer", "2026-03-01T10:00:00Z"))
            .await
            .unwrap();
        repo.store_goal(&test_goal("older", "2026-01-01T10:00:00Z"))
            .await
            .unwrap();

        let goals = repo.list_goals().await.unwrap();
        let ids: Vec<&str> = goals.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["older", "newer"]);
    }

    #[tokio::test]
    async fn test_delete_goal() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = db.create_goal_repository();

        repo.store_goal(&test_goal("g1", "2026-01-01T10:00:00Z"))
            .await
            .unwrap();

        assert!(repo.delete_goal("g1").await.unwrap());
        assert!(!repo.delete_goal("g1").await.unwrap());
    }
}
