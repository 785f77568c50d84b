use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use mes_common::Kobo;
use serde::{Deserialize, Serialize};
pub use sqlx::types::Json;
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        OrderId        -------------------------------------------------------
/// The external-facing order identifier, as assigned by the marketplace when the sale was initiated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// Funds are held in escrow and the order awaits confirmation from both parties.
    InEscrow,
    /// Both parties confirmed completion and the funds were released to the seller. Terminal.
    Completed,
    /// The order was cancelled and the funds refunded to the buyer. Terminal.
    Cancelled,
    /// One of the parties opened a dispute. Funds remain held pending resolution.
    Disputed,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::InEscrow => write!(f, "InEscrow"),
            OrderStatusType::Completed => write!(f, "Completed"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
            OrderStatusType::Disputed => write!(f, "Disputed"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "InEscrow" => Ok(Self::InEscrow),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            "Disputed" => Ok(Self::Disputed),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to InEscrow");
            OrderStatusType::InEscrow
        })
    }
}

//--------------------------------------      OrderParty       -------------------------------------------------------
/// The role a user plays on a given order. Every settlement operation is performed by exactly one of the two parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderParty {
    Buyer,
    Seller,
}

impl OrderParty {
    pub fn counterpart(&self) -> Self {
        match self {
            OrderParty::Buyer => OrderParty::Seller,
            OrderParty::Seller => OrderParty::Buyer,
        }
    }
}

impl Display for OrderParty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderParty::Buyer => write!(f, "buyer"),
            OrderParty::Seller => write!(f, "seller"),
        }
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub product_ids: Json<Vec<String>>,
    pub amount: Kobo,
    pub status: OrderStatusType,
    pub buyer_confirmed: bool,
    pub seller_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set if and only if `status` is [`OrderStatusType::Completed`].
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Returns the role `user_id` plays on this order, or `None` if the user is not a party to it.
    pub fn party_of(&self, user_id: i64) -> Option<OrderParty> {
        if user_id == self.buyer_id {
            Some(OrderParty::Buyer)
        } else if user_id == self.seller_id {
            Some(OrderParty::Seller)
        } else {
            None
        }
    }

    pub fn user_for(&self, party: OrderParty) -> i64 {
        match party {
            OrderParty::Buyer => self.buyer_id,
            OrderParty::Seller => self.seller_id,
        }
    }

    /// The join condition: both parties have confirmed completion.
    pub fn is_fully_confirmed(&self) -> bool {
        self.buyer_confirmed && self.seller_confirmed
    }
}

//--------------------------------------       NewOrder        -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// The order_id as assigned by the marketplace
    pub order_id: OrderId,
    pub buyer_id: i64,
    pub seller_id: i64,
    /// The product listings covered by this order
    pub product_ids: Vec<String>,
    /// The amount held in escrow for this order, in kobo
    pub amount: Kobo,
}

impl NewOrder {
    pub fn new(order_id: OrderId, buyer_id: i64, seller_id: i64, amount: Kobo) -> Self {
        Self { order_id, buyer_id, seller_id, product_ids: Vec::new(), amount }
    }

    pub fn with_products(mut self, product_ids: Vec<String>) -> Self {
        self.product_ids = product_ids;
        self
    }
}

//--------------------------------------   EscrowStatusType    -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum EscrowStatusType {
    Held,
    Released,
    Refunded,
}

impl Display for EscrowStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EscrowStatusType::Held => write!(f, "Held"),
            EscrowStatusType::Released => write!(f, "Released"),
            EscrowStatusType::Refunded => write!(f, "Refunded"),
        }
    }
}

//--------------------------------------        Escrow        --------------------------------------------------------
/// The hold record for an order's funds. Exactly one escrow exists per order, created in the same transaction as the
/// order itself, and its status mirrors the order status at all times.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Escrow {
    pub id: i64,
    pub order_id: OrderId,
    pub status: EscrowStatusType,
    pub created_at: DateTime<Utc>,
    pub released_at: Option<DateTime<Utc>>,
}

//--------------------------------------        Wallet        --------------------------------------------------------
/// A user's spendable balance. The balance column is only ever written through
/// [`crate::db::sqlite::wallets::update_balance`].
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub user_id: i64,
    pub balance: Kobo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------         User         --------------------------------------------------------
/// A read model of the marketplace user directory, used for notification content and transaction metadata.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------   TransactionType     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum TransactionType {
    Funding,
    Withdrawal,
    TransferIn,
    TransferOut,
    AdsPosting,
    AdPromotion,
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Funding => write!(f, "Funding"),
            TransactionType::Withdrawal => write!(f, "Withdrawal"),
            TransactionType::TransferIn => write!(f, "TransferIn"),
            TransactionType::TransferOut => write!(f, "TransferOut"),
            TransactionType::AdsPosting => write!(f, "AdsPosting"),
            TransactionType::AdPromotion => write!(f, "AdPromotion"),
        }
    }
}

//--------------------------------------  TransactionStatus    -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
    Cancelled,
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "Pending"),
            TransactionStatus::Success => write!(f, "Success"),
            TransactionStatus::Failed => write!(f, "Failed"),
            TransactionStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

//--------------------------------------     Transaction       -------------------------------------------------------
/// An append-only audit record of a wallet balance change. Rows are immutable once written.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub wallet_id: i64,
    pub txn_type: TransactionType,
    pub amount: Kobo,
    pub status: TransactionStatus,
    /// Unique, human-readable reference for external reconciliation
    pub reference: String,
    pub description: String,
    /// Free-form context: order id, product ids, counterparty id and name
    pub metadata: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------    NewTransaction     -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: i64,
    pub wallet_id: i64,
    pub txn_type: TransactionType,
    pub amount: Kobo,
    pub status: TransactionStatus,
    pub reference: String,
    pub description: String,
    pub metadata: serde_json::Value,
}
