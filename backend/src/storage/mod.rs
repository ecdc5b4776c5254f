//! # Storage Module
//!
//! Persistence for the finance tracker: the abstraction traits and the
//! SQLite implementation used both in production and (in-memory) in tests.

pub mod sqlite;
pub mod traits;

pub use sqlite::DbConnection;
pub use traits::*;
