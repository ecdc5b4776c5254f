//! HTTP client for the hosted auth service.
//!
//! Talks to a GoTrue-style REST API and mirrors the hosted SDK's behavior:
//! the session credential pair is kept client-side, and lifecycle events are
//! published on a broadcast channel as operations succeed.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{broadcast, RwLock};
use tracing::warn;

use crate::domain::models::session::{AuthUser, Session};

use super::traits::{AuthApi, AuthEvent};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Wire shape of a token grant response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: String,
}

/// Wire shape of a sign-up response. The service returns tokens only when
/// email confirmation is disabled.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<UserResponse>,
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

/// Auth collaborator backed by a hosted GoTrue-style service.
#[derive(Clone)]
pub struct HttpAuthClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
    session: Arc<RwLock<Option<Session>>>,
    events: broadcast::Sender<AuthEvent>,
}

impl HttpAuthClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            session: Arc::new(RwLock::new(None)),
            events,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success response into a readable error message.
    async fn error_from(response: reqwest::Response) -> anyhow::Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error_description.or(e.msg).or(e.message))
            .unwrap_or_else(|| format!("auth service returned {status}"));
        anyhow!(message)
    }

    fn session_from(token: TokenResponse) -> Session {
        Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user: AuthUser {
                id: token.user.id,
                email: token.user.email,
            },
        }
    }

    async fn store_and_emit(&self, session: Session, event: fn(Session) -> AuthEvent) -> Session {
        *self.session.write().await = Some(session.clone());
        if self.events.send(event(session.clone())).is_err() {
            warn!("no auth event subscribers; dropping event");
        }
        session
    }
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .http
            .post(self.endpoint("/token?grant_type=password"))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let token: TokenResponse = response.json().await?;
        let session = Self::session_from(token);
        Ok(self.store_and_emit(session, AuthEvent::SignedIn).await)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<Option<Session>> {
        let response = self
            .http
            .post(self.endpoint("/signup"))
            .header("apikey", &self.api_key)
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: SignUpResponse = response.json().await?;
        match (body.access_token, body.refresh_token) {
            (Some(access_token), Some(refresh_token)) => {
                let user = body
                    .user
                    .map(|u| AuthUser {
                        id: u.id,
                        email: u.email,
                    })
                    .or_else(|| {
                        body.id.map(|id| AuthUser {
                            id,
                            email: body.email.clone().unwrap_or_default(),
                        })
                    })
                    .ok_or_else(|| anyhow!("sign-up response carried tokens but no user"))?;
                let session = Session {
                    access_token,
                    refresh_token,
                    user,
                };
                Ok(Some(self.store_and_emit(session, AuthEvent::SignedIn).await))
            }
            // Email confirmation pending: no session until the user confirms.
            _ => Ok(None),
        }
    }

    async fn request_password_reset(&self, email: &str, redirect_to: &str) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint("/recover"))
            .header("apikey", &self.api_key)
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }

    async fn set_session_from_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Session> {
        // Validate the access token by fetching the user it belongs to.
        let response = self
            .http
            .get(self.endpoint("/user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let user: UserResponse = response.json().await?;
        let session = Session {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            user: AuthUser {
                id: user.id,
                email: user.email,
            },
        };
        Ok(self
            .store_and_emit(session, AuthEvent::PasswordRecovery)
            .await)
    }

    async fn update_password(&self, new_password: &str) -> Result<()> {
        let access_token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or_else(|| anyhow!("no active session"))?;

        let response = self
            .http
            .put(self.endpoint("/user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(&json!({ "password": new_password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.session.read().await.clone())
    }

    async fn sign_out(&self) -> Result<()> {
        let access_token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone());

        // Clear locally first; the server call is best-effort revocation.
        *self.session.write().await = None;
        let _ = self.events.send(AuthEvent::SignedOut);

        if let Some(token) = access_token {
            let response = self
                .http
                .post(self.endpoint("/logout"))
                .header("apikey", &self.api_key)
                .bearer_auth(token)
                .send()
                .await?;
            if !response.status().is_success() {
                warn!("logout revocation failed with {}", response.status());
            }
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
