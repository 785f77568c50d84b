use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// What a confirmation call achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    /// Both parties have confirmed and the escrowed funds have been released to the seller.
    Completed,
    /// The confirmation was recorded. Settlement waits for the counterparty.
    WaitingForOtherParty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationResult {
    pub status: ConfirmationStatus,
    pub order: Order,
}
