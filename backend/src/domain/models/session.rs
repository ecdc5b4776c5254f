//! Domain models for the auth/session state machine.

use shared::AuthStage;

/// Identity of an authenticated user as reported by the auth collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// Credential pair for an established session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

/// Recovery tokens extracted from a password-reset link.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Process-wide session state. Lives for the whole app runtime behind the
/// auth service; `is_whitelisted` is re-derived on every session change.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub user: Option<AuthUser>,
    pub session: Option<Session>,
    pub is_whitelisted: bool,
    /// Set when the session came from a password-recovery link; cleared only
    /// by a successful password update or a sign-out.
    pub is_password_recovery: bool,
    /// True until the initial bootstrap has settled.
    pub is_loading: bool,
    /// True while the whitelist check for the current user is in flight.
    pub whitelist_pending: bool,
}

impl SessionState {
    /// Observable stage of the machine. Recovery takes priority over the
    /// whitelist gate so a recovery link always reaches the reset flow.
    pub fn stage(&self) -> AuthStage {
        if self.is_loading {
            return AuthStage::Authenticating;
        }
        match &self.user {
            None => AuthStage::Unauthenticated,
            Some(_) if self.is_password_recovery => AuthStage::PasswordRecovery,
            Some(_) if self.whitelist_pending => AuthStage::Unverified,
            Some(_) if self.is_whitelisted => AuthStage::Whitelisted,
            Some(_) => AuthStage::NotWhitelisted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in_state() -> SessionState {
        SessionState {
            user: Some(AuthUser {
                id: "u1".to_string(),
                email: "a@example.com".to_string(),
            }),
            session: None,
            is_whitelisted: false,
            is_password_recovery: false,
            is_loading: false,
            whitelist_pending: false,
        }
    }

    #[test]
    fn test_stage_unauthenticated_by_default() {
        assert_eq!(SessionState::default().stage(), AuthStage::Unauthenticated);
    }

    #[test]
    fn test_stage_loading_wins() {
        let state = SessionState {
            is_loading: true,
            ..signed_in_state()
        };
        assert_eq!(state.stage(), AuthStage::Authenticating);
    }

    #[test]
    fn test_stage_recovery_overrides_whitelist() {
        let state = SessionState {
            is_password_recovery: true,
            is_whitelisted: true,
            ..signed_in_state()
        };
        assert_eq!(state.stage(), AuthStage::PasswordRecovery);
    }

    #[test]
    fn test_stage_whitelist_resolution() {
        let mut state = signed_in_state();
        state.whitelist_pending = true;
        assert_eq!(state.stage(), AuthStage::Unverified);

        state.whitelist_pending = false;
        assert_eq!(state.stage(), AuthStage::NotWhitelisted);

        state.is_whitelisted = true;
        assert_eq!(state.stage(), AuthStage::Whitelisted);
    }
}
