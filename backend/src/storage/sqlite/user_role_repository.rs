//! SQLite-backed repository for whitelist role assignments.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::storage::traits::UserRoleStorage;

use super::connection::DbConnection;

/// Repository for the `user_roles` whitelist table.
#[derive(Clone)]
pub struct UserRoleRepository {
    db: DbConnection,
}

impl UserRoleRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRoleStorage for UserRoleRepository {
    async fn upsert_role(&self, user_id: &str, role: &str) -> Result<()> {
        // Existing assignments are authoritative; re-provisioning is a no-op.
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role)
        .bind(Utc::now().to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_role(&self, user_id: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT role FROM user_roles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|r| r.get("role")))
    }

    async fn membership_exists(&self, user_id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM user_roles WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await?;

        let count: i64 = row.get("n");
        Ok(count > 0)
    }
}
