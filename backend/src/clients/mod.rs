//! Outbound HTTP collaborators: the hosted auth service and the AI
//! narrative gateway, each behind a trait so tests can substitute doubles.

pub mod auth_client;
pub mod narrative_client;
pub mod traits;

pub use auth_client::HttpAuthClient;
pub use narrative_client::HttpNarrativeClient;
pub use traits::*;
