//! # REST API for Transactions
//!
//! Endpoints for creating, listing, updating and deleting transactions,
//! plus the split-savings convenience.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{error, info};

use shared::{
    CreateTransactionRequest, DeleteTransactionResponse, ExpenseCategory, SplitSavingsRequest,
    SplitSavingsResponse, TransactionListResponse, UpdateTransactionRequest,
};

use crate::domain::commands::transactions::{SplitSavingsCommand, TransactionListQuery};
use crate::io::rest::mappers::transaction_mapper::TransactionMapper;
use crate::AppState;

/// Create a router for transaction related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route("/:id", axum::routing::put(update_transaction).delete(delete_transaction))
        .route("/savings-split", axum::routing::post(split_savings))
}

fn error_status(message: &str) -> StatusCode {
    if message.contains("not found") {
        StatusCode::NOT_FOUND
    } else if message.contains("must be positive")
        || message.contains("require a category")
        || message.contains("cannot be empty")
        || message.contains("Unknown household member")
        || message.contains("Invalid month")
        || message.contains("requires both month and year")
        || message.contains("No goals")
    {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Debug, Deserialize)]
pub struct TransactionListParams {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub person: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<TransactionListParams>,
) -> impl IntoResponse {
    info!("GET /api/transactions");

    let category = match params.category.as_deref().map(ExpenseCategory::parse) {
        Some(Ok(category)) => Some(category),
        Some(Err(e)) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        None => None,
    };

    let query = TransactionListQuery {
        month: params.month,
        year: params.year,
        person: params.person,
        category,
        start_date: params.start_date,
        end_date: params.end_date,
    };

    match state.transaction_service.list_transactions(query).await {
        Ok(transactions) => {
            let response = TransactionListResponse {
                transactions: transactions
                    .into_iter()
                    .map(TransactionMapper::to_dto)
                    .collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list transactions: {}", e);
            (error_status(&e.to_string()), e.to_string()).into_response()
        }
    }
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    info!("POST /api/transactions - request: {:?}", request);

    let command = TransactionMapper::to_create_command(request);
    match state.transaction_service.create_transaction(command).await {
        Ok(transaction) => {
            (StatusCode::CREATED, Json(TransactionMapper::to_dto(transaction))).into_response()
        }
        Err(e) => {
            error!("Failed to create transaction: {}", e);
            (error_status(&e.to_string()), e.to_string()).into_response()
        }
    }
}

pub async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTransactionRequest>,
) -> impl IntoResponse {
    info!("PUT /api/transactions/{id}");

    let command = TransactionMapper::to_update_command(request);
    match state
        .transaction_service
        .update_transaction(&id, command)
        .await
    {
        Ok(transaction) => {
            (StatusCode::OK, Json(TransactionMapper::to_dto(transaction))).into_response()
        }
        Err(e) => {
            error!("Failed to update transaction {id}: {}", e);
            (error_status(&e.to_string()), e.to_string()).into_response()
        }
    }
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/transactions/{id}");

    match state.transaction_service.delete_transaction(&id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(DeleteTransactionResponse {
                success_message: "Transaction deleted".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to delete transaction {id}: {}", e);
            (error_status(&e.to_string()), e.to_string()).into_response()
        }
    }
}

pub async fn split_savings(
    State(state): State<AppState>,
    Json(request): Json<SplitSavingsRequest>,
) -> impl IntoResponse {
    info!("POST /api/transactions/savings-split - request: {:?}", request);

    let command = SplitSavingsCommand {
        amount: request.amount,
        person: request.person,
        date: request.date,
        note: request.note,
    };

    match state.transaction_service.create_split_savings(command).await {
        Ok(transactions) => {
            let count = transactions.len();
            let response = SplitSavingsResponse {
                transactions: transactions
                    .into_iter()
                    .map(TransactionMapper::to_dto)
                    .collect(),
                success_message: format!("Savings split across {count} goals"),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to split savings: {}", e);
            (error_status(&e.to_string()), e.to_string()).into_response()
        }
    }
}
