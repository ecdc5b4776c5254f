//! # Domain Module
//!
//! Business logic for the finance tracker, independent of the HTTP surface
//! and the storage backend.
//!
//! ## Module Organization
//!
//! - **aggregation**: pure rollups over transaction lists (per-type sums,
//!   category totals, monthly rollups, goal progress, filters)
//! - **projection**: goal completion forecasting
//! - **transaction_service**: transaction CRUD and listing
//! - **goal_service**: goal CRUD, derived progress, unlink-then-delete
//! - **analytics_service**: yearly/selected-month summaries and the AI
//!   narrative flow
//! - **auth_service**: the auth/session state machine and whitelist gate
//! - **whitelist_service**: allow-list provisioning and membership checks
//! - **export_service**: CSV export of the transaction history
//! - **commands**: internal command/query types the REST layer maps onto
//! - **models**: domain entities

pub mod aggregation;
pub mod analytics_service;
pub mod auth_service;
pub mod commands;
pub mod export_service;
pub mod goal_service;
pub mod models;
pub mod projection;
pub mod transaction_service;
pub mod whitelist_service;

pub use analytics_service::AnalyticsService;
pub use auth_service::AuthService;
pub use export_service::ExportService;
pub use goal_service::GoalService;
pub use transaction_service::TransactionService;
pub use whitelist_service::WhitelistService;
