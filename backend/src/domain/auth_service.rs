//! Auth/session state machine.
//!
//! Process-wide session state fed from two directions: a one-shot bootstrap
//! at startup (which may consume recovery tokens carried by the landing
//! URL) and a live subscription to the auth collaborator's events. Both
//! funnel through the same session-application routine, so either may fire
//! first and observing the same session twice is harmless.
//!
//! Failure semantics: every auth call can fail with a human-readable
//! message, and no failure moves the machine. A failed password update
//! leaves the user in recovery; a failed sign-in leaves them signed out.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::{broadcast::error::RecvError, RwLock};
use tracing::{error, info, warn};

use shared::{AuthStage, MIN_PASSWORD_LEN};

use crate::clients::traits::{AuthApi, AuthEvent};
use crate::domain::models::session::{AuthUser, RecoveryTokens, Session, SessionState};
use crate::domain::whitelist_service::WhitelistService;
use crate::storage::Connection;

/// Result of attempting to consume recovery tokens from a URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryOutcome {
    pub consumed: bool,
    /// URL with the token parameters stripped, for history replacement
    pub scrubbed_url: Option<String>,
}

/// Point-in-time view of the session for the interface layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub stage: AuthStage,
    pub user_email: Option<String>,
    pub is_whitelisted: bool,
    pub is_password_recovery: bool,
}

/// Extract recovery tokens from a URL fragment or query string.
///
/// Both carriers require the full triple: `access_token`, `refresh_token`
/// and the `type=recovery` marker. Returns `None` otherwise, which makes a
/// second consumption attempt on an already-scrubbed URL a no-op.
pub fn parse_recovery_tokens(url: &str) -> Option<RecoveryTokens> {
    let fragment = url.split_once('#').map(|(_, f)| f);
    let query = url
        .split_once('?')
        .map(|(_, q)| q.split('#').next().unwrap_or(q));

    for source in [fragment, query].into_iter().flatten() {
        let params: Vec<(&str, &str)> = source
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .collect();
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| *v)
                .filter(|v| !v.is_empty())
        };

        if get("type") != Some("recovery") {
            continue;
        }
        if let (Some(access_token), Some(refresh_token)) =
            (get("access_token"), get("refresh_token"))
        {
            return Some(RecoveryTokens {
                access_token: access_token.to_string(),
                refresh_token: refresh_token.to_string(),
            });
        }
    }
    None
}

/// The URL with query string and fragment removed.
pub fn strip_recovery_params(url: &str) -> String {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url[..end].to_string()
}

/// Service owning the auth/session state machine.
#[derive(Clone)]
pub struct AuthService<A, C>
where
    A: AuthApi + Clone + 'static,
    C: Connection + 'static,
{
    client: A,
    whitelist: WhitelistService<C>,
    state: Arc<RwLock<SessionState>>,
    signup_redirect: String,
    reset_redirect: String,
}

impl<A, C> AuthService<A, C>
where
    A: AuthApi + Clone + 'static,
    C: Connection + 'static,
{
    pub fn new(client: A, whitelist: WhitelistService<C>, app_origin: &str) -> Self {
        let origin = app_origin.trim_end_matches('/');
        Self {
            client,
            whitelist,
            state: Arc::new(RwLock::new(SessionState {
                is_loading: true,
                ..Default::default()
            })),
            signup_redirect: origin.to_string(),
            reset_redirect: format!("{origin}/reset-password"),
        }
    }

    /// Drain the auth collaborator's event stream for the rest of the
    /// process lifetime.
    pub fn spawn_listener(&self) {
        let service = self.clone();
        let mut events = self.client.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => service.apply_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("auth event listener lagged, skipped {skipped} events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    /// App-start sequence: consume recovery tokens from the landing URL if
    /// present, then read any persisted session. Either this or the live
    /// listener may observe the resulting session first.
    pub async fn bootstrap(&self, initial_url: Option<&str>) -> Result<RecoveryOutcome> {
        let mut outcome = RecoveryOutcome {
            consumed: false,
            scrubbed_url: None,
        };

        if let Some(url) = initial_url {
            match self.consume_recovery_url(url).await {
                Ok(consumed) => outcome = consumed,
                // An expired link is reported, not fatal to startup.
                Err(e) => warn!("recovery token consumption failed: {e:#}"),
            }
        }

        match self.client.current_session().await {
            Ok(session) => self.apply_session(session).await,
            Err(e) => {
                warn!("could not read persisted session: {e:#}");
                self.state.write().await.is_loading = false;
            }
        }

        Ok(outcome)
    }

    /// Consume recovery tokens carried by a URL, forcing the machine into
    /// `PasswordRecovery` so the link never lands in a normal authenticated
    /// view. Idempotent: a URL without the token triple is a no-op.
    pub async fn consume_recovery_url(&self, url: &str) -> Result<RecoveryOutcome> {
        let Some(tokens) = parse_recovery_tokens(url) else {
            return Ok(RecoveryOutcome {
                consumed: false,
                scrubbed_url: None,
            });
        };

        let session = self
            .client
            .set_session_from_tokens(&tokens.access_token, &tokens.refresh_token)
            .await?;

        // Forced regardless of what the generic session handling concludes.
        self.state.write().await.is_password_recovery = true;
        self.apply_session(Some(session)).await;

        info!("Recovery session established");
        Ok(RecoveryOutcome {
            consumed: true,
            scrubbed_url: Some(strip_recovery_params(url)),
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(anyhow!("Email and password are required"));
        }

        let session = self.client.sign_in(email, password).await?;
        info!("Signed in {}", session.user.email);
        self.apply_session(Some(session)).await;
        Ok(())
    }

    /// Create an account. Depending on the auth service, a session may
    /// exist immediately or only after email confirmation; both outcomes
    /// are handled without erroring.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<String> {
        if email.trim().is_empty() {
            return Err(anyhow!("Email is required"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(anyhow!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }

        match self
            .client
            .sign_up(email, password, &self.signup_redirect)
            .await?
        {
            Some(session) => {
                info!("Signed up {} with immediate session", session.user.email);
                self.apply_session(Some(session)).await;
                Ok("Account created".to_string())
            }
            None => Ok("Check your inbox to confirm the account".to_string()),
        }
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(anyhow!("Email is required"));
        }
        self.client
            .request_password_reset(email, &self.reset_redirect)
            .await
    }

    /// Change the password. Success ends the recovery flow; failure leaves
    /// the machine exactly where it was.
    pub async fn update_password(&self, new_password: &str) -> Result<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(anyhow!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }

        self.client.update_password(new_password).await?;
        self.state.write().await.is_password_recovery = false;
        info!("Password updated");
        Ok(())
    }

    pub async fn sign_out(&self) {
        if let Err(e) = self.client.sign_out().await {
            warn!("sign-out call failed: {e:#}");
        }
        *self.state.write().await = SessionState::default();
        info!("Signed out");
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            stage: state.stage(),
            user_email: state.user.as_ref().map(|u| u.email.clone()),
            is_whitelisted: state.is_whitelisted,
            is_password_recovery: state.is_password_recovery,
        }
    }

    async fn apply_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::PasswordRecovery(session) => {
                self.state.write().await.is_password_recovery = true;
                self.apply_session(Some(session)).await;
            }
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => {
                self.apply_session(Some(session)).await;
            }
            AuthEvent::SignedOut => {
                {
                    let mut state = self.state.write().await;
                    state.is_password_recovery = false;
                }
                self.apply_session(None).await;
            }
        }
    }

    /// The single routine every session change funnels through. Stores the
    /// session, then re-derives the whitelist flag for its user.
    async fn apply_session(&self, session: Option<Session>) {
        match session {
            Some(session) => {
                let user = session.user.clone();
                {
                    let mut state = self.state.write().await;
                    state.user = Some(user.clone());
                    state.session = Some(session);
                    state.whitelist_pending = true;
                    state.is_loading = false;
                }

                let whitelisted = self.resolve_whitelist(&user).await;

                let mut state = self.state.write().await;
                // The session may have changed while the check ran; a stale
                // result must not clobber the newer user's state.
                if state.user.as_ref().map(|u| &u.id) == Some(&user.id) {
                    state.is_whitelisted = whitelisted;
                    state.whitelist_pending = false;
                }
            }
            None => {
                let mut state = self.state.write().await;
                state.user = None;
                state.session = None;
                state.is_whitelisted = false;
                state.whitelist_pending = false;
                state.is_loading = false;
            }
        }
    }

    /// Whitelist resolution: best-effort auto-provisioning, then the
    /// dedicated membership check, then the direct row lookup as fallback.
    /// Absence of a role row by either path means not whitelisted.
    async fn resolve_whitelist(&self, user: &AuthUser) -> bool {
        if let Err(e) = self.whitelist.ensure_membership(user).await {
            warn!("whitelist auto-provisioning failed (ignored): {e:#}");
        }

        match self.whitelist.membership_exists(&user.id).await {
            Ok(member) => member,
            Err(e) => {
                warn!("whitelist check failed, falling back to direct lookup: {e:#}");
                match self.whitelist.lookup_role(&user.id).await {
                    Ok(role) => role.is_some(),
                    Err(e) => {
                        error!("whitelist fallback lookup failed: {e:#}");
                        false
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::whitelist_service::AllowListEntry;
    use crate::storage::DbConnection;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::broadcast;

    const OWNER_EMAIL: &str = "owner@example.com";

    /// Auth collaborator double. Sessions are derived from the email so
    /// user ids are stable across calls.
    #[derive(Clone)]
    struct FakeAuthClient {
        stored: Arc<RwLock<Option<Session>>>,
        events: broadcast::Sender<AuthEvent>,
        fail_update_password: Arc<AtomicBool>,
        confirmation_required: bool,
    }

    impl FakeAuthClient {
        fn new() -> Self {
            let (events, _) = broadcast::channel(16);
            Self {
                stored: Arc::new(RwLock::new(None)),
                events,
                fail_update_password: Arc::new(AtomicBool::new(false)),
                confirmation_required: false,
            }
        }

        fn session_for(email: &str) -> Session {
            Session {
                access_token: format!("access-{email}"),
                refresh_token: format!("refresh-{email}"),
                user: AuthUser {
                    id: format!("user-{email}"),
                    email: email.to_string(),
                },
            }
        }
    }

    #[async_trait]
    impl AuthApi for FakeAuthClient {
        async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
            if password == "wrong" {
                return Err(anyhow!("Invalid login credentials"));
            }
            let session = Self::session_for(email);
            *self.stored.write().await = Some(session.clone());
            let _ = self.events.send(AuthEvent::SignedIn(session.clone()));
            Ok(session)
        }

        async fn sign_up(
            &self,
            email: &str,
            _password: &str,
            _redirect_to: &str,
        ) -> Result<Option<Session>> {
            if self.confirmation_required {
                return Ok(None);
            }
            let session = Self::session_for(email);
            *self.stored.write().await = Some(session.clone());
            Ok(Some(session))
        }

        async fn request_password_reset(&self, _email: &str, _redirect_to: &str) -> Result<()> {
            Ok(())
        }

        async fn set_session_from_tokens(
            &self,
            access_token: &str,
            _refresh_token: &str,
        ) -> Result<Session> {
            if access_token == "expired" {
                return Err(anyhow!("Recovery link is invalid or has expired"));
            }
            let session = Self::session_for(OWNER_EMAIL);
            *self.stored.write().await = Some(session.clone());
            let _ = self
                .events
                .send(AuthEvent::PasswordRecovery(session.clone()));
            Ok(session)
        }

        async fn update_password(&self, _new_password: &str) -> Result<()> {
            if self.fail_update_password.load(Ordering::SeqCst) {
                return Err(anyhow!("Auth session missing"));
            }
            Ok(())
        }

        async fn current_session(&self) -> Result<Option<Session>> {
            Ok(self.stored.read().await.clone())
        }

        async fn sign_out(&self) -> Result<()> {
            *self.stored.write().await = None;
            let _ = self.events.send(AuthEvent::SignedOut);
            Ok(())
        }

        fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
            self.events.subscribe()
        }
    }

    async fn create_test_service() -> (AuthService<FakeAuthClient, DbConnection>, FakeAuthClient)
    {
        let connection = Arc::new(DbConnection::init_test().await.unwrap());
        let whitelist = WhitelistService::new(
            connection,
            vec![AllowListEntry {
                email: OWNER_EMAIL.to_string(),
                role: "owner".to_string(),
            }],
        );
        let client = FakeAuthClient::new();
        let service = AuthService::new(client.clone(), whitelist, "http://localhost:8080");
        (service, client)
    }

    const RECOVERY_URL: &str =
        "http://localhost:8080/#access_token=tok&refresh_token=ref&type=recovery";

    #[test]
    fn test_parse_recovery_tokens_from_fragment() {
        let tokens = parse_recovery_tokens(RECOVERY_URL).unwrap();
        assert_eq!(tokens.access_token, "tok");
        assert_eq!(tokens.refresh_token, "ref");
    }

    #[test]
    fn test_parse_recovery_tokens_from_query() {
        let url = "http://localhost:8080/?access_token=tok&refresh_token=ref&type=recovery";
        assert!(parse_recovery_tokens(url).is_some());
    }

    #[test]
    fn test_parse_recovery_tokens_requires_marker() {
        let url = "http://localhost:8080/#access_token=tok&refresh_token=ref&type=signup";
        assert!(parse_recovery_tokens(url).is_none());
        let url = "http://localhost:8080/#access_token=tok&type=recovery";
        assert!(parse_recovery_tokens(url).is_none());
        assert!(parse_recovery_tokens("http://localhost:8080/").is_none());
    }

    #[test]
    fn test_strip_recovery_params() {
        assert_eq!(strip_recovery_params(RECOVERY_URL), "http://localhost:8080/");
        assert_eq!(
            strip_recovery_params("http://x/?a=1#b=2"),
            "http://x/"
        );
        assert_eq!(strip_recovery_params("http://x/app"), "http://x/app");
    }

    #[tokio::test]
    async fn test_bootstrap_without_session() {
        let (service, _) = create_test_service().await;
        assert_eq!(service.snapshot().await.stage, AuthStage::Authenticating);

        let outcome = service.bootstrap(None).await.unwrap();
        assert!(!outcome.consumed);
        assert_eq!(service.snapshot().await.stage, AuthStage::Unauthenticated);
    }

    #[tokio::test]
    async fn test_recovery_url_forces_recovery_even_when_whitelisted() {
        let (service, _) = create_test_service().await;

        let outcome = service.bootstrap(Some(RECOVERY_URL)).await.unwrap();
        assert!(outcome.consumed);
        assert_eq!(
            outcome.scrubbed_url.as_deref(),
            Some("http://localhost:8080/")
        );

        // The owner email auto-provisions onto the whitelist, yet the stage
        // must still be recovery.
        let snapshot = service.snapshot().await;
        assert!(snapshot.is_whitelisted);
        assert!(snapshot.is_password_recovery);
        assert_eq!(snapshot.stage, AuthStage::PasswordRecovery);
    }

    #[tokio::test]
    async fn test_recovery_consumption_is_idempotent() {
        let (service, _) = create_test_service().await;

        let first = service.consume_recovery_url(RECOVERY_URL).await.unwrap();
        assert!(first.consumed);

        // After scrubbing, a second attempt sees no tokens and is a no-op.
        let scrubbed = first.scrubbed_url.unwrap();
        let second = service.consume_recovery_url(&scrubbed).await.unwrap();
        assert!(!second.consumed);
        assert!(service.snapshot().await.is_password_recovery);
    }

    #[tokio::test]
    async fn test_expired_recovery_link_reports_error_without_state_change() {
        let (service, _) = create_test_service().await;
        let url = "http://x/#access_token=expired&refresh_token=ref&type=recovery";

        let result = service.consume_recovery_url(url).await;
        assert!(result.unwrap_err().to_string().contains("expired"));

        let snapshot = service.snapshot().await;
        assert!(!snapshot.is_password_recovery);
        assert!(snapshot.user_email.is_none());
    }

    #[tokio::test]
    async fn test_sign_in_whitelisted_flow() {
        let (service, _) = create_test_service().await;
        service.bootstrap(None).await.unwrap();

        service.sign_in(OWNER_EMAIL, "secret123").await.unwrap();
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.stage, AuthStage::Whitelisted);
        assert_eq!(snapshot.user_email.as_deref(), Some(OWNER_EMAIL));
    }

    #[tokio::test]
    async fn test_sign_in_not_whitelisted() {
        let (service, _) = create_test_service().await;
        service.bootstrap(None).await.unwrap();

        service
            .sign_in("stranger@example.com", "secret123")
            .await
            .unwrap();
        assert_eq!(service.snapshot().await.stage, AuthStage::NotWhitelisted);
    }

    #[tokio::test]
    async fn test_sign_in_failure_leaves_state_unchanged() {
        let (service, _) = create_test_service().await;
        service.bootstrap(None).await.unwrap();

        let result = service.sign_in(OWNER_EMAIL, "wrong").await;
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid login credentials"));
        assert_eq!(service.snapshot().await.stage, AuthStage::Unauthenticated);
    }

    #[tokio::test]
    async fn test_update_password_failure_keeps_recovery_state() {
        let (service, client) = create_test_service().await;
        service.bootstrap(Some(RECOVERY_URL)).await.unwrap();
        assert!(service.snapshot().await.is_password_recovery);

        client.fail_update_password.store(true, Ordering::SeqCst);
        let result = service.update_password("newsecret").await;
        assert!(result.is_err());

        // Still in recovery, not silently logged out.
        let snapshot = service.snapshot().await;
        assert!(snapshot.is_password_recovery);
        assert_eq!(snapshot.stage, AuthStage::PasswordRecovery);
    }

    #[tokio::test]
    async fn test_update_password_success_clears_recovery() {
        let (service, _) = create_test_service().await;
        service.bootstrap(Some(RECOVERY_URL)).await.unwrap();

        service.update_password("newsecret").await.unwrap();
        let snapshot = service.snapshot().await;
        assert!(!snapshot.is_password_recovery);
        assert_eq!(snapshot.stage, AuthStage::Whitelisted);
    }

    #[tokio::test]
    async fn test_update_password_validates_length() {
        let (service, _) = create_test_service().await;
        service.bootstrap(Some(RECOVERY_URL)).await.unwrap();

        let result = service.update_password("abc").await;
        assert!(result.unwrap_err().to_string().contains("at least"));
        assert!(service.snapshot().await.is_password_recovery);
    }

    #[tokio::test]
    async fn test_sign_out_clears_everything() {
        let (service, _) = create_test_service().await;
        service.bootstrap(Some(RECOVERY_URL)).await.unwrap();

        service.sign_out().await;
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.stage, AuthStage::Unauthenticated);
        assert!(!snapshot.is_whitelisted);
        assert!(!snapshot.is_password_recovery);
        assert!(snapshot.user_email.is_none());
    }

    #[tokio::test]
    async fn test_sign_up_without_immediate_session() {
        let (service, _) = create_test_service().await;
        service.bootstrap(None).await.unwrap();

        let mut client = FakeAuthClient::new();
        client.confirmation_required = true;
        let connection = Arc::new(DbConnection::init_test().await.unwrap());
        let service = AuthService::new(
            client,
            WhitelistService::new(connection, vec![]),
            "http://localhost:8080",
        );
        service.bootstrap(None).await.unwrap();

        let message = service.sign_up(OWNER_EMAIL, "secret123").await.unwrap();
        assert!(message.contains("confirm"));
        assert_eq!(service.snapshot().await.stage, AuthStage::Unauthenticated);
    }

    #[tokio::test]
    async fn test_sign_up_validates_password_length() {
        let (service, _) = create_test_service().await;
        let result = service.sign_up(OWNER_EMAIL, "abc").await;
        assert!(result.unwrap_err().to_string().contains("at least"));
    }

    #[tokio::test]
    async fn test_listener_applies_recovery_event() {
        let (service, client) = create_test_service().await;
        service.bootstrap(None).await.unwrap();

        // A recovery event from the collaborator forces the flag even
        // though this process never saw the URL.
        service
            .apply_event(AuthEvent::PasswordRecovery(FakeAuthClient::session_for(
                OWNER_EMAIL,
            )))
            .await;
        assert_eq!(service.snapshot().await.stage, AuthStage::PasswordRecovery);

        // And a signed-out event resets the machine.
        service.apply_event(AuthEvent::SignedOut).await;
        assert_eq!(service.snapshot().await.stage, AuthStage::Unauthenticated);
        drop(client);
    }

    #[tokio::test]
    async fn test_spawned_listener_receives_events() {
        let (service, client) = create_test_service().await;
        service.bootstrap(None).await.unwrap();
        service.spawn_listener();

        // The client emits SignedIn on its own successful call; the spawned
        // listener applies it. Direct call also applies it, so either
        // ordering converges on the same state.
        service.sign_in(OWNER_EMAIL, "secret123").await.unwrap();
        tokio::task::yield_now().await;
        assert_eq!(service.snapshot().await.stage, AuthStage::Whitelisted);
        drop(client);
    }
}
