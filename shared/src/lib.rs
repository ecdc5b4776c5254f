use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency used throughout the household ledger.
pub const DEFAULT_CURRENCY: &str = "PLN";

/// Minimum accepted password length for sign-up and password updates.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Kind of money movement a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming into the household
    Income,
    /// Money spent
    Expense,
    /// Money put aside, optionally linked to a goal
    Savings,
}

impl TransactionType {
    pub const ALL: [TransactionType; 3] = [
        TransactionType::Income,
        TransactionType::Expense,
        TransactionType::Savings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Savings => "savings",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ParseTransactionTypeError> {
        match value {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            "savings" => Ok(TransactionType::Savings),
            other => Err(ParseTransactionTypeError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown transaction type: {0}")]
pub struct ParseTransactionTypeError(pub String);

/// Expense category. Only meaningful for `TransactionType::Expense` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Bills,
    Loans,
    Installments,
    Food,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Bills,
        ExpenseCategory::Loans,
        ExpenseCategory::Installments,
        ExpenseCategory::Food,
        ExpenseCategory::Other,
    ];

    /// Categories treated as fixed monthly obligations.
    pub const FIXED: [ExpenseCategory; 3] = [
        ExpenseCategory::Bills,
        ExpenseCategory::Loans,
        ExpenseCategory::Installments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Bills => "bills",
            ExpenseCategory::Loans => "loans",
            ExpenseCategory::Installments => "installments",
            ExpenseCategory::Food => "food",
            ExpenseCategory::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ParseExpenseCategoryError> {
        match value {
            "bills" => Ok(ExpenseCategory::Bills),
            "loans" => Ok(ExpenseCategory::Loans),
            "installments" => Ok(ExpenseCategory::Installments),
            "food" => Ok(ExpenseCategory::Food),
            "other" => Ok(ExpenseCategory::Other),
            other => Err(ParseExpenseCategoryError(other.to_string())),
        }
    }

    /// Whether the category is part of the fixed-obligation subset.
    pub fn is_fixed(&self) -> bool {
        Self::FIXED.contains(self)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown expense category: {0}")]
pub struct ParseExpenseCategoryError(pub String);

/// A single recorded money movement.
///
/// `category`/`sub_category` are meaningful only for expenses; `goal_id` only
/// for savings. Rows carrying stray values in those fields are tolerated but
/// ignored by the aggregation logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub currency: String,
    pub category: Option<ExpenseCategory>,
    pub sub_category: Option<String>,
    pub person: String,
    /// Calendar date the movement happened (distinct from `created_at`)
    pub date: NaiveDate,
    pub note: Option<String>,
    /// Weak reference to a goal; nulled out when the goal is deleted
    pub goal_id: Option<String>,
    /// Record-creation timestamp (RFC 3339), assigned by the backend
    pub created_at: String,
}

/// A named savings target. Its current amount is always derived from linked
/// savings transactions, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    pub currency: String,
    pub created_at: String,
}

/// Request for creating a new transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
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

/// Partial update of an existing transaction; unset fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    pub amount: Option<f64>,
    pub category: Option<ExpenseCategory>,
    pub sub_category: Option<String>,
    pub person: Option<String>,
    pub date: Option<NaiveDate>,
    pub note: Option<String>,
    pub goal_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<Transaction>,
}

/// Request to split one savings amount evenly across all existing goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSavingsRequest {
    pub amount: f64,
    pub person: String,
    pub date: NaiveDate,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSavingsResponse {
    pub transactions: Vec<Transaction>,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteTransactionResponse {
    pub success_message: String,
}

/// Request for creating a new goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGoalRequest {
    pub name: String,
    pub target_amount: f64,
    pub currency: Option<String>,
}

/// A goal together with its derived progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalWithProgress {
    pub goal: Goal,
    pub current_amount: f64,
    /// Progress toward the target, capped at 100
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalListResponse {
    pub goals: Vec<GoalWithProgress>,
    /// Sum over all goal-linked savings transactions
    pub total_saved: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteGoalResponse {
    /// Savings transactions whose goal link was cleared before the delete
    pub unlinked_transactions: u32,
    pub success_message: String,
}

/// Contribution total for one calendar month with at least one linked payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalMonthlyContribution {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

/// Completion forecast for a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GoalProjection {
    /// Saved amount already meets or exceeds the target
    Achieved,
    /// No usable contribution history to extrapolate from
    InsufficientData { remaining: f64 },
    /// Forecast from the average monthly contribution over active months
    Projected {
        date: NaiveDate,
        months_remaining: u32,
        avg_monthly: f64,
        remaining: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalDetailResponse {
    pub goal: Goal,
    pub current_amount: f64,
    pub monthly_contributions: Vec<GoalMonthlyContribution>,
    pub projection: GoalProjection,
}

/// Per-month totals for one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRollup {
    /// Calendar month, 1 through 12
    pub month: u32,
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
    /// income - expenses - savings
    pub balance: f64,
}

/// Expense total for one category; zero-total categories are never reported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyAnalyticsResponse {
    pub year: i32,
    pub months: Vec<MonthlyRollup>,
}

/// Totals and averages over a selected set of months
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_savings: f64,
    pub total_balance: f64,
    pub avg_monthly_income: f64,
    pub avg_monthly_expense: f64,
    /// Expenses in the fixed-obligation categories
    pub fixed_expenses: f64,
    /// income - fixed obligations - savings
    pub after_fixed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummaryResponse {
    pub year: i32,
    pub selected_months: Vec<u32>,
    pub rollups: Vec<MonthlyRollup>,
    pub category_totals: Vec<CategoryTotal>,
    pub summary: AnalyticsSummary,
}

/// Request for an AI narrative analysis over selected months of a year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub year: i32,
    pub months: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthlyTrend {
    Rising,
    Falling,
    Stable,
}

/// Narrative analysis produced by the AI collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceAnalysis {
    pub trend_analysis: String,
    pub top_insights: Vec<String>,
    pub suggestions: Vec<String>,
    pub risk_level: RiskLevel,
    pub savings_rate: String,
    pub biggest_expense_category: String,
    pub monthly_trend: MonthlyTrend,
}

/// Observable state of the auth/session machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStage {
    Unauthenticated,
    Authenticating,
    /// Signed in, whitelist check still pending
    Unverified,
    Whitelisted,
    NotWhitelisted,
    PasswordRecovery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

/// Request to consume password-recovery tokens carried by a URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryRequest {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryResponse {
    /// Whether recovery tokens were present and consumed
    pub consumed: bool,
    /// The URL with recovery parameters stripped, for history replacement
    pub scrubbed_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub stage: AuthStage,
    pub user_email: Option<String>,
    pub is_whitelisted: bool,
    pub is_password_recovery: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_round_trip() {
        for tt in TransactionType::ALL {
            assert_eq!(TransactionType::parse(tt.as_str()).unwrap(), tt);
        }
        assert!(TransactionType::parse("transfer").is_err());
    }

    #[test]
    fn test_expense_category_round_trip() {
        for cat in ExpenseCategory::ALL {
            assert_eq!(ExpenseCategory::parse(cat.as_str()).unwrap(), cat);
        }
        assert!(ExpenseCategory::parse("groceries").is_err());
    }

    #[test]
    fn test_fixed_category_subset() {
        assert!(ExpenseCategory::Bills.is_fixed());
        assert!(ExpenseCategory::Loans.is_fixed());
        assert!(ExpenseCategory::Installments.is_fixed());
        assert!(!ExpenseCategory::Food.is_fixed());
        assert!(!ExpenseCategory::Other.is_fixed());
    }

    #[test]
    fn test_transaction_type_serde_form() {
        let json = serde_json::to_string(&TransactionType::Savings).unwrap();
        assert_eq!(json, "\"savings\"");
        let back: TransactionType = serde_json::from_str("\"expense\"").unwrap();
        assert_eq!(back, TransactionType::Expense);
    }

    #[test]
    fn test_goal_projection_tagged_serde() {
        let projected = GoalProjection::Projected {
            date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            months_remaining: 6,
            avg_monthly: 1000.0,
            remaining: 6000.0,
        };
        let json = serde_json::to_value(&projected).unwrap();
        assert_eq!(json["status"], "projected");
        assert_eq!(json["months_remaining"], 6);

        let achieved = serde_json::to_value(GoalProjection::Achieved).unwrap();
        assert_eq!(achieved["status"], "achieved");
    }

    #[test]
    fn test_transaction_serde_uses_type_field() {
        let tx = Transaction {
            id: "t1".to_string(),
            transaction_type: TransactionType::Expense,
            amount: 120.0,
            currency: DEFAULT_CURRENCY.to_string(),
            category: Some(ExpenseCategory::Food),
            sub_category: None,
            person: "Alex".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            note: None,
            goal_id: None,
            created_at: "2026-03-14T12:00:00Z".to_string(),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["category"], "food");
        assert_eq!(json["date"], "2026-03-14");
    }
}
