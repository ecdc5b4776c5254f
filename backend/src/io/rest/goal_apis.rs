//! # REST API for Goal Management
//!
//! Endpoints for creating, listing, inspecting and deleting goals. The
//! detail endpoint includes the monthly contribution series and the
//! completion forecast.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use shared::CreateGoalRequest;

use crate::domain::commands::goals::CreateGoalCommand;
use crate::io::rest::mappers::goal_mapper::GoalMapper;
use crate::AppState;

/// Create a router for goal related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_goals).post(create_goal))
        .route("/:id", axum::routing::delete(delete_goal))
        .route("/:id/detail", get(goal_detail))
}

fn error_status(message: &str) -> StatusCode {
    if message.contains("not found") {
        StatusCode::NOT_FOUND
    } else if message.contains("cannot be empty")
        || message.contains("must be positive")
        || message.contains("cannot exceed")
    {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub async fn list_goals(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/goals");

    match state.goal_service.list_goals().await {
        Ok(result) => (StatusCode::OK, Json(GoalMapper::to_list_response(result))).into_response(),
        Err(e) => {
            error!("Failed to list goals: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving goals").into_response()
        }
    }
}

pub async fn create_goal(
    State(state): State<AppState>,
    Json(request): Json<CreateGoalRequest>,
) -> impl IntoResponse {
    info!("POST /api/goals - request: {:?}", request);

    let command = CreateGoalCommand {
        name: request.name,
        target_amount: request.target_amount,
        currency: request.currency,
    };

    match state.goal_service.create_goal(command).await {
        Ok(goal) => (StatusCode::CREATED, Json(GoalMapper::to_dto(goal))).into_response(),
        Err(e) => {
            error!("Failed to create goal: {}", e);
            (error_status(&e.to_string()), e.to_string()).into_response()
        }
    }
}

pub async fn goal_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/goals/{id}/detail");

    match state.goal_service.goal_detail_now(&id).await {
        Ok(result) => {
            (StatusCode::OK, Json(GoalMapper::to_detail_response(result))).into_response()
        }
        Err(e) => {
            error!("Failed to get goal detail for {id}: {}", e);
            (error_status(&e.to_string()), e.to_string()).into_response()
        }
    }
}

pub async fn delete_goal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/goals/{id}");

    match state.goal_service.delete_goal(&id).await {
        Ok(result) => {
            (StatusCode::OK, Json(GoalMapper::to_delete_response(result))).into_response()
        }
        Err(e) => {
            error!("Failed to delete goal {id}: {}", e);
            (error_status(&e.to_string()), e.to_string()).into_response()
        }
    }
}
