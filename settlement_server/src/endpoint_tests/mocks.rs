use mockall::mock;
use settlement_engine::{
    db_types::{Escrow, NewOrder, Order, OrderId, Transaction, User, Wallet},
    traits::{
        AccountApiError,
        AccountManagement,
        CancelledOrder,
        DisputedOrder,
        SettlementDatabase,
        SettlementError,
        SettlementOutcome,
    },
};

mock! {
    pub SettlementDb {}
    impl SettlementDatabase for SettlementDb {
        fn url(&self) -> &str;
        async fn place_order_in_escrow(&self, order: NewOrder) -> Result<Order, SettlementError>;
        async fn confirm_order_completion(&self, order_id: &OrderId, acting_user: i64) -> Result<SettlementOutcome, SettlementError>;
        async fn cancel_order(&self, order_id: &OrderId, acting_user: i64, reason: &str) -> Result<CancelledOrder, SettlementError>;
        async fn open_dispute(&self, order_id: &OrderId, acting_user: i64, reason: &str) -> Result<DisputedOrder, SettlementError>;
        async fn close(&mut self) -> Result<(), SettlementError>;
    }
    impl AccountManagement for SettlementDb {
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, AccountApiError>;
        async fn fetch_wallet_for_user(&self, user_id: i64) -> Result<Option<Wallet>, AccountApiError>;
        async fn fetch_escrow_for_order(&self, order_id: &OrderId) -> Result<Option<Escrow>, AccountApiError>;
        async fn fetch_transactions_for_user(&self, user_id: i64) -> Result<Vec<Transaction>, AccountApiError>;
        async fn fetch_transactions_for_order(&self, order_id: &OrderId) -> Result<Vec<Transaction>, AccountApiError>;
        async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, AccountApiError>;
    }
}
