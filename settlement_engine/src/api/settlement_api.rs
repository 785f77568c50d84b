use std::{collections::HashMap, sync::Arc};

use log::*;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    api::settlement_objects::{ConfirmationResult, ConfirmationStatus},
    db_types::{NewOrder, Order, OrderId},
    events::{EventProducers, NotificationEvent, NotificationType, OrderSettledEvent},
    traits::{CancelledOrder, CompletedOrder, DisputedOrder, PendingConfirmation, SettlementDatabase, SettlementError, SettlementOutcome},
};

/// Per-order mutual exclusion for settlement flows.
///
/// The backend's status guards already make a double release impossible, but without this lock two racing
/// confirmations could both reach the release branch and one would fail with a [`SettlementError::DataIntegrity`]
/// error instead of a clean "waiting" result. Serializing per order keeps both outcomes well-formed.
#[derive(Clone, Default)]
pub struct OrderLocks {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl OrderLocks {
    pub async fn acquire(&self, order_id: &OrderId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.locks.lock().await;
            map.entry(order_id.as_str().to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
        };
        lock.lock_owned().await
    }

    /// Drops the map entry for `order_id` if no-one else holds a handle to it. Terminal orders never get locked
    /// again, so this keeps the map from growing without bound.
    pub async fn prune(&self, order_id: &OrderId) {
        let mut map = self.locks.lock().await;
        if let Some(lock) = map.get(order_id.as_str()) {
            if Arc::strong_count(lock) == 1 {
                map.remove(order_id.as_str());
            }
        }
    }
}

/// The primary API for the escrow settlement flows.
///
/// `SettlementApi` wraps a [`SettlementDatabase`] backend and adds the two concerns that do not belong in storage:
/// per-order locking (see [`OrderLocks`]) and event publication. All state changes happen in the backend; events fire
/// only after the backend has committed, so a subscriber never observes an event for a rolled-back change.
pub struct SettlementApi<B> {
    db: B,
    producers: EventProducers,
    locks: OrderLocks,
}

impl<B> SettlementApi<B>
where B: SettlementDatabase
{
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, locks: OrderLocks::default() }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Places a new order into escrow. Driven by the payment gateway once the buyer's funds are captured.
    pub async fn place_order_in_escrow(&self, order: NewOrder) -> Result<Order, SettlementError> {
        let guard = self.locks.acquire(&order.order_id).await;
        let order_id = order.order_id.clone();
        let result = self.db.place_order_in_escrow(order).await;
        drop(guard);
        self.locks.prune(&order_id).await;
        result
    }

    /// Records `acting_user`'s completion confirmation on the order, releasing the escrowed funds to the seller when
    /// both parties have confirmed.
    pub async fn confirm_order_completion(
        &self,
        order_id: &OrderId,
        acting_user: i64,
    ) -> Result<ConfirmationResult, SettlementError> {
        let guard = self.locks.acquire(order_id).await;
        let result = self.db.confirm_order_completion(order_id, acting_user).await;
        drop(guard);
        self.locks.prune(order_id).await;
        match result? {
            SettlementOutcome::Completed(completed) => {
                info!("💰️ Order {order_id} fully confirmed. Escrow released to seller #{}.", completed.seller.id);
                self.announce_settlement(&completed).await;
                Ok(ConfirmationResult { status: ConfirmationStatus::Completed, order: completed.order })
            },
            SettlementOutcome::AwaitingCounterparty(pending) => {
                info!("🤝️ Order {order_id}: {} confirmed, awaiting the {}.", pending.confirmed_by, pending.confirmed_by.counterpart());
                // A repeat confirmation returns the same "waiting" response but must not nag the counterparty again
                if pending.newly_confirmed {
                    self.announce_pending_confirmation(&pending).await;
                }
                Ok(ConfirmationResult { status: ConfirmationStatus::WaitingForOtherParty, order: pending.order })
            },
        }
    }

    /// Cancels an in-escrow order, refunding the buyer.
    pub async fn cancel_order(
        &self,
        order_id: &OrderId,
        acting_user: i64,
        reason: &str,
    ) -> Result<Order, SettlementError> {
        let guard = self.locks.acquire(order_id).await;
        let result = self.db.cancel_order(order_id, acting_user, reason).await;
        drop(guard);
        self.locks.prune(order_id).await;
        let cancelled = result?;
        info!("❌️ Order {order_id} cancelled by the {}. Buyer #{} refunded.", cancelled.cancelled_by, cancelled.buyer.id);
        self.announce_cancellation(&cancelled).await;
        Ok(cancelled.order)
    }

    /// Opens a dispute on an in-escrow order. Funds stay held until the dispute is resolved out of band.
    pub async fn open_dispute(
        &self,
        order_id: &OrderId,
        acting_user: i64,
        reason: &str,
    ) -> Result<Order, SettlementError> {
        let guard = self.locks.acquire(order_id).await;
        let result = self.db.open_dispute(order_id, acting_user, reason).await;
        drop(guard);
        self.locks.prune(order_id).await;
        let disputed = result?;
        info!("⚖️ Dispute opened on order {order_id} by the {}.", disputed.opened_by);
        self.announce_dispute(&disputed).await;
        Ok(disputed.order)
    }

    async fn announce_settlement(&self, completed: &CompletedOrder) {
        let order = &completed.order;
        for producer in &self.producers.order_settled_producer {
            producer.publish_event(OrderSettledEvent::new(order.clone(), completed.transaction.clone())).await;
        }
        let to_buyer = NotificationEvent::push(
            order.buyer_id,
            NotificationType::EscrowReleased,
            "Transaction complete",
            format!("Your order {} is complete. {} has been released to the seller.", order.order_id, order.amount),
            &order.order_id,
        );
        let to_seller = NotificationEvent::push(
            order.seller_id,
            NotificationType::EscrowReleased,
            "Funds released",
            format!("Order {} is complete. {} has been credited to your wallet.", order.order_id, order.amount),
            &order.order_id,
        );
        self.notify([to_buyer, to_seller]).await;
    }

    async fn announce_pending_confirmation(&self, pending: &PendingConfirmation) {
        let order = &pending.order;
        let event = NotificationEvent::push(
            pending.counterparty_id,
            NotificationType::CompletionConfirmed,
            "Confirmation received",
            format!(
                "The {} has confirmed completion of order {}. The escrowed funds will be released once you confirm \
                 too.",
                pending.confirmed_by, order.order_id
            ),
            &order.order_id,
        );
        self.notify([event]).await;
    }

    async fn announce_cancellation(&self, cancelled: &CancelledOrder) {
        let order = &cancelled.order;
        let to_buyer = NotificationEvent::push(
            order.buyer_id,
            NotificationType::OrderCancelled,
            "Order cancelled",
            format!("Order {} has been cancelled. {} has been refunded to your wallet.", order.order_id, order.amount),
            &order.order_id,
        );
        let to_seller = NotificationEvent::push(
            order.seller_id,
            NotificationType::OrderCancelled,
            "Order cancelled",
            format!("Order {} has been cancelled by the {}.", order.order_id, cancelled.cancelled_by),
            &order.order_id,
        );
        self.notify([to_buyer, to_seller]).await;
    }

    async fn announce_dispute(&self, disputed: &DisputedOrder) {
        let order = &disputed.order;
        let event = NotificationEvent::push(
            disputed.counterparty_id,
            NotificationType::DisputeOpened,
            "Dispute opened",
            format!(
                "The {} has opened a dispute on order {}. The escrowed funds stay held until the dispute is resolved.",
                disputed.opened_by, order.order_id
            ),
            &order.order_id,
        );
        self.notify([event]).await;
    }

    async fn notify<const N: usize>(&self, events: [NotificationEvent; N]) {
        for event in events {
            for producer in &self.producers.notification_producer {
                producer.publish_event(event.clone()).await;
            }
        }
    }
}
