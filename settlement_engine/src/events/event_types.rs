use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderId, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    EscrowReleased,
    CompletionConfirmed,
    OrderCancelled,
    DisputeOpened,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::EscrowReleased => write!(f, "escrow_released"),
            NotificationType::CompletionConfirmed => write!(f, "completion_confirmed"),
            NotificationType::OrderCancelled => write!(f, "order_cancelled"),
            NotificationType::DisputeOpened => write!(f, "dispute_opened"),
        }
    }
}

/// A notification to be delivered to a single marketplace user.
///
/// The engine only emits these; delivery (in-app feed, push, email) is the job of whatever handler is hooked up via
/// [`crate::events::EventHooks::on_notification`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub recipient: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub content: String,
    pub order_id: OrderId,
    /// Deep link into the marketplace app, e.g. `/orders/ord-1001`.
    pub link: String,
    /// Whether the delivery layer should also attempt a push notification.
    pub request_push: bool,
}

impl NotificationEvent {
    /// Builds a notification with a push request and a link to the order page.
    pub fn push(recipient: i64, notification_type: NotificationType, title: &str, content: String, order_id: &OrderId) -> Self {
        Self {
            recipient,
            notification_type,
            title: title.to_string(),
            content,
            order_id: order_id.clone(),
            link: format!("/orders/{}", order_id.as_str()),
            request_push: true,
        }
    }
}

/// Fired once per successful settlement, after the releasing transaction has committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSettledEvent {
    pub order: Order,
    pub transaction: Transaction,
}

impl OrderSettledEvent {
    pub fn new(order: Order, transaction: Transaction) -> Self {
        Self { order, transaction }
    }
}
