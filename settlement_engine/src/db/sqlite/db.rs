use std::fmt::Debug;

use chrono::Utc;
use log::{debug, trace};
use sqlx::SqlitePool;

use crate::{
    db::sqlite::{db_url, escrows, new_pool, orders, transactions, users, wallets, SqliteDatabaseError},
    db_types::{
        NewOrder,
        NewTransaction,
        Order,
        OrderId,
        OrderStatusType,
        TransactionStatus,
        TransactionType,
        User,
    },
    helpers::new_transaction_reference,
    traits::{
        AccountApiError,
        AccountManagement,
        CancelledOrder,
        CompletedOrder,
        DisputedOrder,
        PendingConfirmation,
        SettlementDatabase,
        SettlementError,
        SettlementOutcome,
    },
};

const RELEASE_REFERENCE_PREFIX: &str = "esc";
const REFUND_REFERENCE_PREFIX: &str = "rfd";

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
    write_pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the `MES_DATABASE_URL` environment variable.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("Creating new database connection pools with url {url}");
        let pool = new_pool(url, max_connections).await?;
        // All mutating transactions run on a single connection. The settlement transactions read before they write,
        // and under WAL a deferred read-then-write transaction on a second connection aborts with SQLITE_BUSY
        // (snapshot conflict, which the busy timeout never retries) instead of queueing. One writer makes them
        // queue; readers on the main pool are never blocked by it.
        let write_pool = new_pool(url, 1).await?;
        let url = url.to_string();
        Ok(Self { url, pool, write_pool })
    }

    /// Returns a reference to the read connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns a reference to the single-connection pool that all mutating transactions run on.
    pub fn write_pool(&self) -> &SqlitePool {
        &self.write_pool
    }
}

impl SettlementDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn place_order_in_escrow(&self, order: NewOrder) -> Result<Order, SettlementError> {
        let mut tx = self.write_pool.begin().await?;
        if orders::order_exists(&order.order_id, &mut tx).await?.is_some() {
            return Err(SettlementError::OrderAlreadyExists(order.order_id));
        }
        let order_id = order.order_id.clone();
        let id = orders::insert_order(order, &mut tx).await?;
        escrows::insert_escrow(&order_id, &mut tx).await?;
        let order = orders::fetch_order_by_order_id(&order_id, &mut tx)
            .await?
            .ok_or_else(|| SettlementError::DataIntegrity(format!("Order {order_id} vanished after insert")))?;
        tx.commit().await?;
        debug!("🗃️📦️ Order {order_id} saved with id {id}. {} now held in escrow.", order.amount);
        Ok(order)
    }

    async fn confirm_order_completion(
        &self,
        order_id: &OrderId,
        acting_user: i64,
    ) -> Result<SettlementOutcome, SettlementError> {
        let mut tx = self.write_pool.begin().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| SettlementError::OrderNotFound(order_id.clone()))?;
        if order.status != OrderStatusType::InEscrow {
            return Err(SettlementError::InvalidOrderState { order_id: order_id.clone(), status: order.status });
        }
        let party = order
            .party_of(acting_user)
            .ok_or_else(|| SettlementError::NotAParty { order_id: order_id.clone(), user_id: acting_user })?;
        let newly_confirmed = orders::set_confirmation_flag(order.id, party, &mut tx).await?;
        // Re-read so the join check runs against the post-update view
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| SettlementError::DataIntegrity(format!("Order {order_id} vanished mid-confirmation")))?;
        let seller = users::fetch_user_by_id(order.seller_id, &mut tx).await?.ok_or_else(|| {
            SettlementError::DataIntegrity(format!("Seller #{} of order {order_id} has no user record", order.seller_id))
        })?;

        if !order.is_fully_confirmed() {
            tx.commit().await?;
            if newly_confirmed {
                debug!("🗃️🤝️ {party} confirmed completion of order {order_id}. Awaiting the {}.", party.counterpart());
            } else {
                debug!("🗃️🤝️ {party} re-confirmed completion of order {order_id}. Nothing changed.");
            }
            let counterparty_id = order.user_for(party.counterpart());
            return Ok(SettlementOutcome::AwaitingCounterparty(PendingConfirmation {
                order,
                confirmed_by: party,
                counterparty_id,
                newly_confirmed,
            }));
        }

        // Join condition met. Credit the seller, close the order and escrow, and append the audit record, all inside
        // the same transaction as the flag write.
        let wallet = wallets::fetch_wallet_for_user(order.seller_id, &mut tx).await?.ok_or_else(|| {
            SettlementError::DataIntegrity(format!("Seller #{} of order {order_id} has no wallet", order.seller_id))
        })?;
        wallets::update_balance(wallet.id, wallet.balance + order.amount, &mut tx).await?;
        let completed_at = Utc::now();
        if !orders::mark_completed(order.id, completed_at, &mut tx).await? {
            // The status was re-checked inside this transaction, so a failed guard means something else is rewriting
            // order rows out from under us.
            return Err(SettlementError::DataIntegrity(format!(
                "Order {order_id} changed state mid-settlement. Aborting the release."
            )));
        }
        if !escrows::release(order_id, completed_at, &mut tx).await? {
            return Err(SettlementError::DataIntegrity(format!(
                "No held escrow record found for order {order_id}. The funds release has been aborted."
            )));
        }
        let txn = NewTransaction {
            user_id: seller.id,
            wallet_id: wallet.id,
            txn_type: TransactionType::TransferIn,
            amount: order.amount,
            status: TransactionStatus::Success,
            reference: new_transaction_reference(RELEASE_REFERENCE_PREFIX),
            description: format!("Escrow release for order {order_id}"),
            metadata: serde_json::json!({
                "order_id": order.order_id.as_str(),
                "product_ids": order.product_ids.0,
                "seller_id": seller.id,
                "seller_name": seller.name,
            }),
        };
        let transaction = transactions::insert(txn, &mut tx).await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| SettlementError::DataIntegrity(format!("Order {order_id} vanished mid-settlement")))?;
        tx.commit().await?;
        debug!(
            "🗃️💰️ Order {order_id} settled. {} released to seller #{} with reference [{}].",
            order.amount, seller.id, transaction.reference
        );
        Ok(SettlementOutcome::Completed(CompletedOrder { order, seller, transaction }))
    }

    async fn cancel_order(
        &self,
        order_id: &OrderId,
        acting_user: i64,
        reason: &str,
    ) -> Result<CancelledOrder, SettlementError> {
        let mut tx = self.write_pool.begin().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| SettlementError::OrderNotFound(order_id.clone()))?;
        if order.status != OrderStatusType::InEscrow {
            return Err(SettlementError::InvalidOrderState { order_id: order_id.clone(), status: order.status });
        }
        let party = order
            .party_of(acting_user)
            .ok_or_else(|| SettlementError::NotAParty { order_id: order_id.clone(), user_id: acting_user })?;
        let buyer = users::fetch_user_by_id(order.buyer_id, &mut tx).await?.ok_or_else(|| {
            SettlementError::DataIntegrity(format!("Buyer #{} of order {order_id} has no user record", order.buyer_id))
        })?;
        let wallet = wallets::fetch_wallet_for_user(order.buyer_id, &mut tx).await?.ok_or_else(|| {
            SettlementError::DataIntegrity(format!("Buyer #{} of order {order_id} has no wallet", order.buyer_id))
        })?;
        wallets::update_balance(wallet.id, wallet.balance + order.amount, &mut tx).await?;
        if !orders::mark_terminal(order.id, OrderStatusType::Cancelled, &mut tx).await? {
            return Err(SettlementError::DataIntegrity(format!(
                "Order {order_id} changed state mid-cancellation. Aborting the refund."
            )));
        }
        if !escrows::refund(order_id, &mut tx).await? {
            return Err(SettlementError::DataIntegrity(format!(
                "No held escrow record found for order {order_id}. The refund has been aborted."
            )));
        }
        let txn = NewTransaction {
            user_id: buyer.id,
            wallet_id: wallet.id,
            txn_type: TransactionType::TransferIn,
            amount: order.amount,
            status: TransactionStatus::Success,
            reference: new_transaction_reference(REFUND_REFERENCE_PREFIX),
            description: format!("Refund for cancelled order {order_id}"),
            metadata: serde_json::json!({
                "order_id": order.order_id.as_str(),
                "product_ids": order.product_ids.0,
                "buyer_id": buyer.id,
                "buyer_name": buyer.name,
                "cancelled_by": party,
                "reason": reason,
            }),
        };
        let refund = transactions::insert(txn, &mut tx).await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| SettlementError::DataIntegrity(format!("Order {order_id} vanished mid-cancellation")))?;
        tx.commit().await?;
        debug!(
            "🗃️❌️ Order {order_id} cancelled by the {party}. {} refunded to buyer #{}.",
            order.amount, buyer.id
        );
        Ok(CancelledOrder { order, buyer, refund, cancelled_by: party })
    }

    async fn open_dispute(
        &self,
        order_id: &OrderId,
        acting_user: i64,
        reason: &str,
    ) -> Result<DisputedOrder, SettlementError> {
        let mut tx = self.write_pool.begin().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| SettlementError::OrderNotFound(order_id.clone()))?;
        if order.status != OrderStatusType::InEscrow {
            return Err(SettlementError::InvalidOrderState { order_id: order_id.clone(), status: order.status });
        }
        let party = order
            .party_of(acting_user)
            .ok_or_else(|| SettlementError::NotAParty { order_id: order_id.clone(), user_id: acting_user })?;
        if !orders::mark_terminal(order.id, OrderStatusType::Disputed, &mut tx).await? {
            return Err(SettlementError::DataIntegrity(format!(
                "Order {order_id} changed state while the dispute was being opened."
            )));
        }
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| SettlementError::DataIntegrity(format!("Order {order_id} vanished mid-dispute")))?;
        tx.commit().await?;
        debug!("🗃️⚖️ Dispute opened on order {order_id} by the {party}. Reason: {reason}. Funds stay held.");
        let counterparty_id = order.user_for(party.counterpart());
        Ok(DisputedOrder { order, opened_by: party, counterparty_id })
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_wallet_for_user(&self, user_id: i64) -> Result<Option<crate::db_types::Wallet>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let wallet = wallets::fetch_wallet_for_user(user_id, &mut conn).await?;
        Ok(wallet)
    }

    async fn fetch_escrow_for_order(&self, order_id: &OrderId) -> Result<Option<crate::db_types::Escrow>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let escrow = escrows::fetch_escrow_for_order(order_id, &mut conn).await?;
        Ok(escrow)
    }

    async fn fetch_transactions_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<crate::db_types::Transaction>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let txns = transactions::fetch_for_user(user_id, &mut conn).await?;
        Ok(txns)
    }

    async fn fetch_transactions_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<crate::db_types::Transaction>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let txns = transactions::fetch_for_order(order_id, &mut conn).await?;
        Ok(txns)
    }

    async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_id(user_id, &mut conn).await?;
        Ok(user)
    }
}
