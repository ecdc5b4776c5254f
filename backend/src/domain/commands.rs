//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping
//! the public DTOs defined in the `shared` crate to these internal types.

pub mod transactions {
    use chrono::NaiveDate;
    use shared::{ExpenseCategory, TransactionType};

    /// Input for creating a new transaction.
    #[derive(Debug, Clone)]
    pub struct CreateTransactionCommand {
        pub transaction_type: TransactionType,
        pub amount: f64,
        pub currency: Option<String>,
        pub category: Option<ExpenseCategory>,
        pub sub_category: Option<String>,
        pub person: String,
        pub date: NaiveDate,
        pub note: Option<String>,
        pub goal_id: Option<String>,
    }

    /// Partial update of an existing transaction.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateTransactionCommand {
        pub amount: Option<f64>,
        pub category: Option<ExpenseCategory>,
        pub sub_category: Option<String>,
        pub person: Option<String>,
        pub date: Option<NaiveDate>,
        pub note: Option<String>,
        pub goal_id: Option<String>,
    }

    /// Query parameters for listing transactions. A month window and the
    /// explicit filters compose; every populated bound must pass.
    #[derive(Debug, Clone, Default)]
    pub struct TransactionListQuery {
        pub month: Option<u32>,
        pub year: Option<i32>,
        pub person: Option<String>,
        pub category: Option<ExpenseCategory>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    /// Input for splitting one savings amount evenly across all goals.
    #[derive(Debug, Clone)]
    pub struct SplitSavingsCommand {
        pub amount: f64,
        pub person: String,
        pub date: NaiveDate,
        pub note: Option<String>,
    }
}

pub mod goals {
    use crate::domain::models::goal::Goal;
    use crate::domain::projection::GoalProjection;
    use shared::GoalMonthlyContribution;

    /// Input for creating a new goal.
    #[derive(Debug, Clone)]
    pub struct CreateGoalCommand {
        pub name: String,
        pub target_amount: f64,
        pub currency: Option<String>,
    }

    /// A goal with its derived progress.
    #[derive(Debug, Clone)]
    pub struct GoalWithProgressResult {
        pub goal: Goal,
        pub current_amount: f64,
    }

    /// Result of listing goals.
    #[derive(Debug, Clone)]
    pub struct GoalListResult {
        pub goals: Vec<GoalWithProgressResult>,
        pub total_saved: f64,
    }

    /// Result of deleting a goal.
    #[derive(Debug, Clone)]
    pub struct DeleteGoalResult {
        pub unlinked_transactions: u32,
        pub success_message: String,
    }

    /// Full detail view of one goal.
    #[derive(Debug, Clone)]
    pub struct GoalDetailResult {
        pub goal: Goal,
        pub current_amount: f64,
        pub monthly_contributions: Vec<GoalMonthlyContribution>,
        pub projection: GoalProjection,
    }
}

pub mod analytics {
    use shared::{AnalyticsSummary, CategoryTotal, MonthlyRollup};

    /// Query for a selected-months summary within one year.
    #[derive(Debug, Clone)]
    pub struct SummaryQuery {
        pub year: i32,
        /// Calendar months (1..=12) to include
        pub months: Vec<u32>,
    }

    /// Result of the selected-months summary.
    #[derive(Debug, Clone)]
    pub struct SummaryResult {
        pub year: i32,
        pub selected_months: Vec<u32>,
        pub rollups: Vec<MonthlyRollup>,
        pub category_totals: Vec<CategoryTotal>,
        pub summary: AnalyticsSummary,
    }
}
