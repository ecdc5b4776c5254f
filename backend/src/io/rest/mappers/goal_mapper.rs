//! Mapping between domain goal results and the shared DTOs.

use crate::domain::commands::goals::{DeleteGoalResult, GoalDetailResult, GoalListResult};
use crate::domain::models::goal::Goal as DomainGoal;
use crate::domain::projection::GoalProjection as DomainProjection;
use shared::{
    DeleteGoalResponse, Goal, GoalDetailResponse, GoalListResponse, GoalProjection,
    GoalWithProgress,
};

pub struct GoalMapper;

impl GoalMapper {
    pub fn to_dto(goal: DomainGoal) -> Goal {
        Goal {
            id: goal.id,
            name: goal.name,
            target_amount: goal.target_amount,
            currency: goal.currency,
            created_at: goal.created_at,
        }
    }

    pub fn to_projection_dto(projection: DomainProjection) -> GoalProjection {
        match projection {
            DomainProjection::Achieved => GoalProjection::Achieved,
            DomainProjection::InsufficientData { remaining } => {
                GoalProjection::InsufficientData { remaining }
            }
            DomainProjection::Projected {
                date,
                months_remaining,
                avg_monthly,
                remaining,
            } => GoalProjection::Projected {
                date,
                months_remaining,
                avg_monthly,
                remaining,
            },
        }
    }

    pub fn to_list_response(result: GoalListResult) -> GoalListResponse {
        GoalListResponse {
            goals: result
                .goals
                .into_iter()
                .map(|entry| {
                    let percent = if entry.goal.target_amount > 0.0 {
                        (entry.current_amount / entry.goal.target_amount * 100.0).min(100.0)
                    } else {
                        0.0
                    };
                    GoalWithProgress {
                        goal: Self::to_dto(entry.goal),
                        current_amount: entry.current_amount,
                        percent,
                    }
                })
                .collect(),
            total_saved: result.total_saved,
        }
    }

    pub fn to_detail_response(result: GoalDetailResult) -> GoalDetailResponse {
        GoalDetailResponse {
            goal: Self::to_dto(result.goal),
            current_amount: result.current_amount,
            monthly_contributions: result.monthly_contributions,
            projection: Self::to_projection_dto(result.projection),
        }
    }

    pub fn to_delete_response(result: DeleteGoalResult) -> DeleteGoalResponse {
        DeleteGoalResponse {
            unlinked_transactions: result.unlinked_transactions,
            success_message: result.success_message,
        }
    }
}
