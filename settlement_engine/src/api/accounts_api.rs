use crate::{
    db_types::{Escrow, Order, OrderId, Transaction, User, Wallet},
    traits::{AccountApiError, AccountManagement},
};

/// Read-only API for wallet balances, order lookups and transaction history.
pub struct AccountApi<B> {
    db: B,
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, AccountApiError> {
        self.db.fetch_order_by_order_id(order_id).await
    }

    pub async fn wallet_for_user(&self, user_id: i64) -> Result<Option<Wallet>, AccountApiError> {
        self.db.fetch_wallet_for_user(user_id).await
    }

    pub async fn escrow_for_order(&self, order_id: &OrderId) -> Result<Option<Escrow>, AccountApiError> {
        self.db.fetch_escrow_for_order(order_id).await
    }

    pub async fn history_for_user(&self, user_id: i64) -> Result<Vec<Transaction>, AccountApiError> {
        self.db.fetch_transactions_for_user(user_id).await
    }

    pub async fn transactions_for_order(&self, order_id: &OrderId) -> Result<Vec<Transaction>, AccountApiError> {
        self.db.fetch_transactions_for_order(order_id).await
    }

    pub async fn user_by_id(&self, user_id: i64) -> Result<Option<User>, AccountApiError> {
        self.db.fetch_user_by_id(user_id).await
    }
}
