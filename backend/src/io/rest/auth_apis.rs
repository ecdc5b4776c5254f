//! # REST API for Auth and Session
//!
//! Thin surface over the auth/session state machine: sign-in/up, password
//! reset and recovery, and the session snapshot the view layer gates on.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use tracing::{error, info};

use shared::{
    MessageResponse, RecoveryRequest, RecoveryResponse, ResetPasswordRequest, SessionResponse,
    SignInRequest, SignUpRequest, UpdatePasswordRequest,
};

use crate::domain::auth_service::SessionSnapshot;
use crate::AppState;

/// Create a router for auth related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", get(session))
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/reset", post(reset_password))
        .route("/password", put(update_password))
        .route("/recovery", post(consume_recovery))
        .route("/logout", post(logout))
}

fn to_session_response(snapshot: SessionSnapshot) -> SessionResponse {
    SessionResponse {
        stage: snapshot.stage,
        user_email: snapshot.user_email,
        is_whitelisted: snapshot.is_whitelisted,
        is_password_recovery: snapshot.is_password_recovery,
    }
}

pub async fn session(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.auth_service.snapshot().await;
    (StatusCode::OK, Json(to_session_response(snapshot))).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> impl IntoResponse {
    info!("POST /api/auth/login for {}", request.email);

    match state
        .auth_service
        .sign_in(&request.email, &request.password)
        .await
    {
        Ok(()) => {
            let snapshot = state.auth_service.snapshot().await;
            (StatusCode::OK, Json(to_session_response(snapshot))).into_response()
        }
        Err(e) => {
            error!("Sign-in failed: {}", e);
            (StatusCode::UNAUTHORIZED, e.to_string()).into_response()
        }
    }
}

pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> impl IntoResponse {
    info!("POST /api/auth/signup for {}", request.email);

    match state
        .auth_service
        .sign_up(&request.email, &request.password)
        .await
    {
        Ok(message) => (StatusCode::OK, Json(MessageResponse { message })).into_response(),
        Err(e) => {
            error!("Sign-up failed: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> impl IntoResponse {
    info!("POST /api/auth/reset for {}", request.email);

    match state.auth_service.request_password_reset(&request.email).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Password reset link sent".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Password reset request failed: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

pub async fn update_password(
    State(state): State<AppState>,
    Json(request): Json<UpdatePasswordRequest>,
) -> impl IntoResponse {
    info!("PUT /api/auth/password");

    match state.auth_service.update_password(&request.password).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Password updated".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            // The machine stays where it was, recovery state included.
            error!("Password update failed: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

pub async fn consume_recovery(
    State(state): State<AppState>,
    Json(request): Json<RecoveryRequest>,
) -> impl IntoResponse {
    info!("POST /api/auth/recovery");

    match state.auth_service.consume_recovery_url(&request.url).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(RecoveryResponse {
                consumed: outcome.consumed,
                scrubbed_url: outcome.scrubbed_url,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Recovery token consumption failed: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/auth/logout");
    state.auth_service.sign_out().await;
    let snapshot = state.auth_service.snapshot().await;
    (StatusCode::OK, Json(to_session_response(snapshot))).into_response()
}
