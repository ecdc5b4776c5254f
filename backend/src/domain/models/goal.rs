//! Domain model for savings goals.

/// A named savings target. The amount saved toward it is derived from
/// linked savings transactions on every read, never stored on the goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    pub currency: String,
    pub created_at: String,
}
