use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The escrow placement payload sent by the payment gateway after the buyer's funds have been captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub order_id: String,
    pub buyer_id: i64,
    pub seller_id: i64,
    #[serde(default)]
    pub product_ids: Vec<String>,
    /// The captured amount, in kobo
    pub amount: i64,
}

/// Optional free-text context for cancellations and disputes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReasonBody {
    #[serde(default)]
    pub reason: Option<String>,
}
