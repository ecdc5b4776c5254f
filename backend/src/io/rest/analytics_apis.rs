//! # REST API for Analytics
//!
//! Yearly rollups, selected-month summaries and the AI narrative analysis.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::{error, info};

use shared::{AnalyticsSummaryResponse, AnalyzeRequest, YearlyAnalyticsResponse};

use crate::domain::commands::analytics::SummaryQuery;
use crate::AppState;

/// Create a router for analytics related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/yearly", get(yearly))
        .route("/summary", get(summary))
        .route("/analyze", post(analyze))
}

fn error_status(message: &str) -> StatusCode {
    if message.contains("Invalid month") || message.contains("at least one month") {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Debug, Deserialize)]
pub struct YearlyParams {
    pub year: i32,
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    pub year: i32,
    /// Comma-separated calendar months, e.g. "1,2,3"
    pub months: String,
}

fn parse_months(raw: &str) -> Result<Vec<u32>, String> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| format!("Invalid month: {part}"))
        })
        .collect()
}

pub async fn yearly(
    State(state): State<AppState>,
    Query(params): Query<YearlyParams>,
) -> impl IntoResponse {
    info!("GET /api/analytics/yearly?year={}", params.year);

    match state.analytics_service.yearly_rollup(params.year).await {
        Ok(months) => (
            StatusCode::OK,
            Json(YearlyAnalyticsResponse {
                year: params.year,
                months,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to build yearly rollup: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error building rollup").into_response()
        }
    }
}

pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> impl IntoResponse {
    info!(
        "GET /api/analytics/summary?year={}&months={}",
        params.year, params.months
    );

    let months = match parse_months(&params.months) {
        Ok(months) => months,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let query = SummaryQuery {
        year: params.year,
        months,
    };

    match state.analytics_service.summary(query).await {
        Ok(result) => (
            StatusCode::OK,
            Json(AnalyticsSummaryResponse {
                year: result.year,
                selected_months: result.selected_months,
                rollups: result.rollups,
                category_totals: result.category_totals,
                summary: result.summary,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to build summary: {}", e);
            (error_status(&e.to_string()), e.to_string()).into_response()
        }
    }
}

pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    info!("POST /api/analytics/analyze - request: {:?}", request);

    let query = SummaryQuery {
        year: request.year,
        months: request.months,
    };

    match state.analytics_service.analyze(query).await {
        Ok(analysis) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e) => {
            error!("Narrative analysis failed: {}", e);
            (error_status(&e.to_string()), e.to_string()).into_response()
        }
    }
}
