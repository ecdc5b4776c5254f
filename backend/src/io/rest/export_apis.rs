//! # REST API for CSV Export

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::{error, info};

use crate::AppState;

/// Create a router for export related APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/transactions.csv", get(export_transactions))
}

pub async fn export_transactions(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/export/transactions.csv");

    match state.export_service.export_transactions_csv().await {
        Ok(content) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"transactions.csv\"",
                ),
            ],
            content,
        )
            .into_response(),
        Err(e) => {
            error!("Export failed: {}", e);
            let status = if e.to_string().contains("No transactions") {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, e.to_string()).into_response()
        }
    }
}
