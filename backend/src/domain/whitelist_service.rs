//! Whitelist provisioning and membership checks.
//!
//! Access beyond authentication is gated on a role row keyed by user id.
//! A configured email allow-list can auto-provision that row on first
//! sign-in; the provisioning step is best-effort and its failures never
//! block the membership check itself.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::domain::models::session::AuthUser;
use crate::storage::{Connection, UserRoleStorage};

/// One allow-list entry: an email and the role it provisions.
#[derive(Debug, Clone, PartialEq)]
pub struct AllowListEntry {
    pub email: String,
    pub role: String,
}

/// Service resolving whether an authenticated user may use the app.
#[derive(Clone)]
pub struct WhitelistService<C: Connection> {
    role_repository: C::UserRoleRepository,
    allow_list: Vec<AllowListEntry>,
}

impl<C: Connection> WhitelistService<C> {
    pub fn new(connection: Arc<C>, allow_list: Vec<AllowListEntry>) -> Self {
        Self {
            role_repository: connection.create_user_role_repository(),
            allow_list,
        }
    }

    /// Provision a role row when the user's email is on the allow-list.
    /// A miss is not an error; unknown emails simply stay unwhitelisted.
    pub async fn ensure_membership(&self, user: &AuthUser) -> Result<()> {
        let email = user.email.to_lowercase();
        let Some(entry) = self.allow_list.iter().find(|e| e.email.to_lowercase() == email)
        else {
            return Ok(());
        };

        self.role_repository
            .upsert_role(&user.id, &entry.role)
            .await?;
        info!("Provisioned whitelist role '{}' for {}", entry.role, user.id);
        Ok(())
    }

    /// Dedicated membership check.
    pub async fn membership_exists(&self, user_id: &str) -> Result<bool> {
        self.role_repository.membership_exists(user_id).await
    }

    /// Direct role-row lookup, used as the fallback path when the dedicated
    /// check errors.
    pub async fn lookup_role(&self, user_id: &str) -> Result<Option<String>> {
        self.role_repository.get_role(user_id).await
    }
}
