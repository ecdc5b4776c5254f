//! SQLite storage backend built on sqlx.

pub mod connection;
pub mod goal_repository;
pub mod transaction_repository;
pub mod user_role_repository;

pub use connection::DbConnection;
pub use goal_repository::GoalRepository;
pub use transaction_repository::TransactionRepository;
pub use user_role_repository::UserRoleRepository;
