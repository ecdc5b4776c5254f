//! # REST API Interface Layer
//!
//! HTTP endpoints for the finance tracker. This layer handles request and
//! response serialization, translates domain error messages into HTTP
//! status codes, and logs every request. No business logic lives here.

pub mod analytics_apis;
pub mod auth_apis;
pub mod export_apis;
pub mod goal_apis;
pub mod mappers;
pub mod transaction_apis;
