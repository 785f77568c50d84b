use thiserror::Error;

use crate::db_types::{Escrow, Order, OrderId, Transaction, User, Wallet};

/// Read-only access to the marketplace settlement records.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Fetches the order with the given external order id, or `None` if no such order exists.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, AccountApiError>;

    /// Fetches the wallet belonging to the given user. Every marketplace user has exactly one wallet.
    async fn fetch_wallet_for_user(&self, user_id: i64) -> Result<Option<Wallet>, AccountApiError>;

    /// Fetches the escrow record mirroring the given order.
    async fn fetch_escrow_for_order(&self, order_id: &OrderId) -> Result<Option<Escrow>, AccountApiError>;

    /// Fetches the transaction log entries for the given user, most recent first.
    async fn fetch_transactions_for_user(&self, user_id: i64) -> Result<Vec<Transaction>, AccountApiError>;

    /// Fetches the transaction log entries whose metadata references the given order.
    async fn fetch_transactions_for_order(&self, order_id: &OrderId) -> Result<Vec<Transaction>, AccountApiError>;

    /// Fetches a user directory record.
    async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, AccountApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}
