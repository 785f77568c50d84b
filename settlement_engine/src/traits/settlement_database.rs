use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    traits::{
        data_objects::{CancelledOrder, DisputedOrder, SettlementOutcome},
        AccountApiError,
        AccountManagement,
    },
};

/// This trait defines the behaviour a storage backend must provide to support the escrow settlement flows.
///
/// Every mutating method runs as a single atomic unit: either all of its writes commit, or none do. Two concurrent
/// calls against the same order must serialize such that the fund release fires exactly once; the
/// [`crate::SettlementApi`] additionally holds a per-order lock across each call, so backends only need per-call
/// transactionality, not their own cross-call coordination.
#[allow(async_fn_in_trait)]
pub trait SettlementDatabase: AccountManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Creates a new order in `InEscrow` status together with its `Held` escrow record, in one transaction.
    ///
    /// In production this is driven by the payment gateway once the buyer's funds have been captured. The engine owns
    /// the write so that the one-escrow-per-order invariant holds by construction.
    ///
    /// Fails with [`SettlementError::OrderAlreadyExists`] if an order with the same order id exists.
    async fn place_order_in_escrow(&self, order: NewOrder) -> Result<Order, SettlementError>;

    /// Records that `acting_user` confirms completion of the order, and releases the escrowed funds to the seller if
    /// the counterparty has already confirmed.
    ///
    /// Preconditions, each its own failure mode:
    /// * the order exists ([`SettlementError::OrderNotFound`]),
    /// * the order is in `InEscrow` status ([`SettlementError::InvalidOrderState`]),
    /// * `acting_user` is the buyer or the seller ([`SettlementError::NotAParty`]).
    ///
    /// Setting an already-set confirmation flag is a harmless no-op, so callers may retry freely.
    ///
    /// When the join condition (both flags set) is met, the following happen in the same transaction as the flag
    /// write: the seller's wallet is credited with the order amount, the order is marked `Completed`, the escrow is
    /// marked `Released`, and a `TransferIn` transaction is appended. A missing seller, wallet or escrow record at
    /// this point is a [`SettlementError::DataIntegrity`] error and aborts the whole operation.
    async fn confirm_order_completion(
        &self,
        order_id: &OrderId,
        acting_user: i64,
    ) -> Result<SettlementOutcome, SettlementError>;

    /// Cancels an in-escrow order and refunds the held funds to the buyer's wallet.
    ///
    /// Same preconditions as [`Self::confirm_order_completion`]. In one transaction: the order is marked `Cancelled`,
    /// the escrow `Refunded`, the buyer's wallet credited, and a `TransferIn` refund transaction appended.
    async fn cancel_order(
        &self,
        order_id: &OrderId,
        acting_user: i64,
        reason: &str,
    ) -> Result<CancelledOrder, SettlementError>;

    /// Marks an in-escrow order as disputed. The escrow stays `Held` and no funds move.
    ///
    /// Same preconditions as [`Self::confirm_order_completion`]. Dispute resolution is handled out of band.
    async fn open_dispute(
        &self,
        order_id: &OrderId,
        acting_user: i64,
        reason: &str,
    ) -> Result<DisputedOrder, SettlementError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), SettlementError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    #[error("We have an internal database error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {order_id} is not awaiting confirmation (status is {status})")]
    InvalidOrderState { order_id: OrderId, status: OrderStatusType },
    #[error("User #{user_id} is neither the buyer nor the seller of order {order_id}")]
    NotAParty { order_id: OrderId, user_id: i64 },
    #[error("Cannot insert order, since it already exists: {0}")]
    OrderAlreadyExists(OrderId),
    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),
}

impl From<sqlx::Error> for SettlementError {
    fn from(e: sqlx::Error) -> Self {
        SettlementError::DatabaseError(e.to_string())
    }
}

impl From<AccountApiError> for SettlementError {
    fn from(e: AccountApiError) -> Self {
        SettlementError::DatabaseError(e.to_string())
    }
}
