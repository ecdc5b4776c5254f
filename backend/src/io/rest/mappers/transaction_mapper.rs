//! Mapping between domain transactions and the shared DTOs.

use crate::domain::commands::transactions::{CreateTransactionCommand, UpdateTransactionCommand};
use crate::domain::models::transaction::Transaction as DomainTransaction;
use shared::{CreateTransactionRequest, Transaction, UpdateTransactionRequest};

pub struct TransactionMapper;

impl TransactionMapper {
    pub fn to_dto(transaction: DomainTransaction) -> Transaction {
        Transaction {
            id: transaction.id,
            transaction_type: transaction.transaction_type,
            amount: transaction.amount,
            currency: transaction.currency,
            category: transaction.category,
            sub_category: transaction.sub_category,
            person: transaction.person,
            date: transaction.date,
            note: transaction.note,
            goal_id: transaction.goal_id,
            created_at: transaction.created_at,
        }
    }

    pub fn to_create_command(request: CreateTransactionRequest) -> CreateTransactionCommand {
        CreateTransactionCommand {
            transaction_type: request.transaction_type,
            amount: request.amount,
            currency: request.currency,
            category: request.category,
            sub_category: request.sub_category,
            person: request.person,
            date: request.date,
            note: request.note,
            goal_id: request.goal_id,
        }
    }

    pub fn to_update_command(request: UpdateTransactionRequest) -> UpdateTransactionCommand {
        UpdateTransactionCommand {
            amount: request.amount,
            category: request.category,
            sub_category: request.sub_category,
            person: request.person,
            date: request.date,
            note: request.note,
            goal_id: request.goal_id,
        }
    }
}
