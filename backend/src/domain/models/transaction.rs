//! Domain model for money movements.

use chrono::NaiveDate;
use shared::{ExpenseCategory, TransactionType};

/// A single recorded money movement inside the domain layer.
///
/// The REST layer maps this to/from the `shared::Transaction` DTO.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub currency: String,
    pub category: Option<ExpenseCategory>,
    pub sub_category: Option<String>,
    pub person: String,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub goal_id: Option<String>,
    pub created_at: String,
}

impl Transaction {
    /// Force the conditional fields into shape: category and sub-category
    /// only carry meaning on expenses, the goal link only on savings.
    pub fn normalized(mut self) -> Self {
        if self.transaction_type != TransactionType::Expense {
            self.category = None;
            self.sub_category = None;
        }
        if self.transaction_type != TransactionType::Savings {
            self.goal_id = None;
        }
        self
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    pub fn is_savings(&self) -> bool {
        self.transaction_type == TransactionType::Savings
    }
}
