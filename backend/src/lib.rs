//! # Finance Tracker Backend
//!
//! Household finance tracking: income, expenses and savings-goal
//! contributions with monthly rollups, goal completion forecasts, an AI
//! narrative analysis flow, and a whitelist-gated auth/session machine.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! IO Layer (REST API)
//!     ↓
//! Domain Layer (services, pure engines)
//!     ↓
//! Storage Layer (SQLite) + Clients (hosted auth, AI gateway)
//! ```

pub mod clients;
pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::clients::{HttpAuthClient, HttpNarrativeClient};
use crate::config::Config;
use crate::domain::whitelist_service::AllowListEntry;
use crate::domain::{
    AnalyticsService, AuthService, ExportService, GoalService, TransactionService,
    WhitelistService,
};
use crate::storage::DbConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub transaction_service: TransactionService<DbConnection>,
    pub goal_service: GoalService<DbConnection>,
    pub analytics_service: AnalyticsService<DbConnection, HttpNarrativeClient>,
    pub export_service: ExportService<DbConnection>,
    pub auth_service: AuthService<HttpAuthClient, DbConnection>,
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Setting up database");
    let connection = Arc::new(DbConnection::new(&config.database_url).await?);

    info!("Setting up collaborator clients");
    let auth_client = HttpAuthClient::new(&config.auth_base_url, &config.auth_api_key);
    let narrative_client =
        HttpNarrativeClient::new(&config.ai_gateway_url, &config.ai_api_key, &config.ai_model);

    info!("Setting up domain services");
    let whitelist_service = WhitelistService::new(
        connection.clone(),
        config
            .whitelist
            .iter()
            .map(|(email, role)| AllowListEntry {
                email: email.clone(),
                role: role.clone(),
            })
            .collect(),
    );
    let auth_service = AuthService::new(auth_client, whitelist_service, &config.app_origin);

    let app_state = AppState {
        transaction_service: TransactionService::new(
            connection.clone(),
            config.household.clone(),
        ),
        goal_service: GoalService::new(connection.clone()),
        analytics_service: AnalyticsService::new(connection.clone(), narrative_client),
        export_service: ExportService::new(connection),
        auth_service,
    };

    // The live subscription and the one-shot bootstrap may observe the same
    // session in either order; both funnel through the same routine.
    app_state.auth_service.spawn_listener();
    app_state.auth_service.bootstrap(None).await?;

    Ok(app_state)
}

/// Create the Axum router with all routes configured
pub fn create_router(config: &Config, app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .allowed_origin
                .parse::<HeaderValue>()
                .expect("invalid allowed origin"),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/transactions", io::rest::transaction_apis::router())
        .nest("/goals", io::rest::goal_apis::router())
        .nest("/analytics", io::rest::analytics_apis::router())
        .nest("/auth", io::rest::auth_apis::router())
        .nest("/export", io::rest::export_apis::router());

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
