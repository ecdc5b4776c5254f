//! Goal service domain logic for the finance tracker.
//!
//! Goals only store their target; the amount saved toward one is derived
//! from linked savings transactions on every read. Deleting a goal keeps
//! its contribution history: the linked rows are unlinked, never removed.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate, Utc};
use tracing::info;

use crate::domain::aggregation;
use crate::domain::commands::goals::{
    CreateGoalCommand, DeleteGoalResult, GoalDetailResult, GoalListResult, GoalWithProgressResult,
};
use crate::domain::models::goal::Goal;
use crate::domain::projection;
use crate::storage::{Connection, GoalStorage, TransactionStorage};

const MAX_NAME_LEN: usize = 256;

/// Service for goal management and goal-related calculations.
#[derive(Clone)]
pub struct GoalService<C: Connection> {
    goal_repository: C::GoalRepository,
    transaction_repository: C::TransactionRepository,
}

impl<C: Connection> GoalService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            goal_repository: connection.create_goal_repository(),
            transaction_repository: connection.create_transaction_repository(),
        }
    }

    pub async fn create_goal(&self, command: CreateGoalCommand) -> Result<Goal> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Goal name cannot be empty"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(anyhow!("Goal name cannot exceed {MAX_NAME_LEN} characters"));
        }
        if command.target_amount <= 0.0 {
            return Err(anyhow!("Goal target amount must be positive"));
        }

        let goal = Goal {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            target_amount: command.target_amount,
            currency: command
                .currency
                .unwrap_or_else(|| shared::DEFAULT_CURRENCY.to_string()),
            created_at: Utc::now().to_rfc3339(),
        };

        self.goal_repository.store_goal(&goal).await?;
        info!("Created goal {} ({})", goal.id, goal.name);
        Ok(goal)
    }

    /// All goals, oldest first, each with its derived progress.
    pub async fn list_goals(&self) -> Result<GoalListResult> {
        let goals = self.goal_repository.list_goals().await?;
        let savings = self.transaction_repository.list_goal_savings().await?;

        let total_saved = savings.iter().map(|t| t.amount).sum();
        let goals = goals
            .into_iter()
            .map(|goal| {
                let current_amount = aggregation::goal_progress(&savings, &goal.id);
                GoalWithProgressResult {
                    goal,
                    current_amount,
                }
            })
            .collect();

        Ok(GoalListResult { goals, total_saved })
    }

    /// Progress, monthly contribution history and completion forecast for
    /// one goal.
    pub async fn goal_detail(&self, goal_id: &str, today: NaiveDate) -> Result<GoalDetailResult> {
        let goal = self
            .goal_repository
            .get_goal(goal_id)
            .await?
            .ok_or_else(|| anyhow!("Goal not found: {goal_id}"))?;

        let savings = self.transaction_repository.list_goal_savings().await?;
        let current_amount = aggregation::goal_progress(&savings, goal_id);
        let monthly_contributions = projection::monthly_contributions(&savings, goal_id);
        let projection = projection::project_completion(
            goal.target_amount,
            current_amount,
            &monthly_contributions,
            today,
        );

        Ok(GoalDetailResult {
            goal,
            current_amount,
            monthly_contributions,
            projection,
        })
    }

    /// Goal detail relative to the current local date.
    pub async fn goal_detail_now(&self, goal_id: &str) -> Result<GoalDetailResult> {
        self.goal_detail(goal_id, Local::now().date_naive()).await
    }

    /// Delete a goal, preserving its contribution history as unlinked
    /// savings rows.
    ///
    /// Two sequential storage calls with no rollback: if the delete fails
    /// after the unlink, the transactions stay unlinked and the goal row
    /// remains. Callers re-check state after a failure.
    pub async fn delete_goal(&self, goal_id: &str) -> Result<DeleteGoalResult> {
        if self.goal_repository.get_goal(goal_id).await?.is_none() {
            return Err(anyhow!("Goal not found: {goal_id}"));
        }

        let unlinked = self.transaction_repository.clear_goal_links(goal_id).await?;
        info!("Unlinked {unlinked} savings transactions from goal {goal_id}");

        let deleted = self.goal_repository.delete_goal(goal_id).await?;
        if !deleted {
            return Err(anyhow!("Goal not found: {goal_id}"));
        }

        info!("Deleted goal {goal_id}");
        Ok(DeleteGoalResult {
            unlinked_transactions: unlinked,
            success_message: "Goal deleted; contribution history kept".to_string(),
        })
    }
}
