//! # Client Traits
//!
//! Seams for the hosted collaborators the tracker talks to over HTTP: the
//! auth service and the AI narrative gateway. The domain layer only depends
//! on these traits; tests swap in local doubles.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;

use shared::{CategoryTotal, FinanceAnalysis, MonthlyRollup};

use crate::domain::models::session::Session;

/// Session lifecycle event published by the auth collaborator.
///
/// Events mirror what the hosted auth SDK would emit client-side; the auth
/// service's listener funnels every one of them through the same
/// session-application routine.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    /// Session established through a password-recovery link. Forces the
    /// recovery flag regardless of what the generic handling concludes.
    PasswordRecovery(Session),
    SignedOut,
}

/// Operations exposed by the hosted auth service.
///
/// Every call can fail with a human-readable message; callers must treat a
/// failure as leaving their own state untouched.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Password sign-in; emits `SignedIn` on success
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Account creation. Returns `None` when the service requires email
    /// confirmation before a session exists
    async fn sign_up(&self, email: &str, password: &str, redirect_to: &str)
        -> Result<Option<Session>>;

    /// Ask the service to email a password-reset link
    async fn request_password_reset(&self, email: &str, redirect_to: &str) -> Result<()>;

    /// Establish a session from recovery tokens; emits `PasswordRecovery`
    async fn set_session_from_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Session>;

    /// Change the current user's password
    async fn update_password(&self, new_password: &str) -> Result<()>;

    /// Any persisted session, without side effects
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Terminate the session; emits `SignedOut`
    async fn sign_out(&self) -> Result<()>;

    /// Subscribe to session lifecycle events
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// Input handed to the narrative gateway: the aggregates the user selected.
#[derive(Debug, Clone)]
pub struct NarrativeRequest {
    /// Human-readable labels for the selected months, e.g. "March 2026"
    pub month_labels: Vec<String>,
    pub monthly: Vec<MonthlyRollup>,
    pub categories: Vec<CategoryTotal>,
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_savings: f64,
}

/// The AI text-generation collaborator, treated as a black box: structured
/// aggregates in, structured narrative out.
#[async_trait]
pub trait NarrativeApi: Send + Sync {
    async fn analyze(&self, request: &NarrativeRequest) -> Result<FinanceAnalysis>;
}
