//! # The marketplace settlement engine
//!
//! This crate carries the business logic for escrow-based order settlement: holding a buyer's payment while an order
//! is in flight, collecting completion confirmations from both parties, and releasing the funds to the seller exactly
//! once when the two confirmations meet.
//!
//! The major components are:
//! * [`SettlementApi`], the primary API. It wraps a storage backend, serializes access per order, and publishes
//!   notification and audit events after each successful flow.
//! * [`AccountApi`], the read-only API for wallets, orders and transaction history.
//! * The [`traits`] module, which defines the interface a storage backend must implement.
//! * The [`db`] module, which implements the backend traits for SQLite.
//! * The [`events`] module, a small pub-sub system that lets delivery and audit components subscribe to settlement
//!   events without the engine knowing anything about them.
//!
//! The flow in one paragraph: an order enters the system via
//! [`SettlementApi::place_order_in_escrow`] with its funds `Held`. Either party may call
//! [`SettlementApi::confirm_order_completion`]; the first confirmation is recorded and the counterparty notified,
//! and the second one atomically credits the seller's wallet, marks the order `Completed`, releases the escrow and
//! appends a `TransferIn` record to the transaction audit log. In-escrow orders can also be cancelled (refunding the
//! buyer) or disputed (freezing the funds pending out-of-band resolution).

pub mod db;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

mod api;

pub use api::{AccountApi, ConfirmationResult, ConfirmationStatus, OrderLocks, SettlementApi};
#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
