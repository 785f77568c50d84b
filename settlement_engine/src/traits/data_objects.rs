use crate::db_types::{Order, OrderParty, Transaction, User};

/// The result of a confirmation call against the backend.
#[derive(Debug, Clone)]
pub enum SettlementOutcome {
    /// Both parties have confirmed. The funds were released and the order is closed.
    Completed(CompletedOrder),
    /// Only one party has confirmed so far. No funds moved.
    AwaitingCounterparty(PendingConfirmation),
}

/// Everything the caller needs to announce a completed settlement.
#[derive(Debug, Clone)]
pub struct CompletedOrder {
    /// The order in its final, `Completed` state
    pub order: Order,
    /// The seller whose wallet was credited
    pub seller: User,
    /// The audit record written for the escrow release
    pub transaction: Transaction,
}

/// One confirmation is in; the other party still has to act.
#[derive(Debug, Clone)]
pub struct PendingConfirmation {
    pub order: Order,
    /// The party whose confirmation flag is set
    pub confirmed_by: OrderParty,
    /// The user who still needs to confirm
    pub counterparty_id: i64,
    /// `false` when this call was a repeat of an earlier confirmation and changed nothing. Repeats get the same
    /// response but must not notify the counterparty again.
    pub newly_confirmed: bool,
}

/// The result of cancelling an in-escrow order.
#[derive(Debug, Clone)]
pub struct CancelledOrder {
    /// The order in its final, `Cancelled` state
    pub order: Order,
    /// The buyer whose wallet received the refund
    pub buyer: User,
    /// The audit record written for the refund
    pub refund: Transaction,
    pub cancelled_by: OrderParty,
}

/// The result of opening a dispute on an in-escrow order.
#[derive(Debug, Clone)]
pub struct DisputedOrder {
    /// The order in its `Disputed` state. Funds remain held.
    pub order: Order,
    pub opened_by: OrderParty,
    pub counterparty_id: i64,
}
