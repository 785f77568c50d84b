//! The traits that a storage backend must implement to drive the settlement engine.
//!
//! [`SettlementDatabase`] covers the money-moving flows (confirmation, cancellation, disputes) and
//! [`AccountManagement`] covers the read side (orders, wallets, transaction history). The SQLite backend in
//! [`crate::db::sqlite`] implements both.
mod account_management;
mod data_objects;
mod settlement_database;

pub use account_management::{AccountApiError, AccountManagement};
pub use data_objects::{CancelledOrder, CompletedOrder, DisputedOrder, PendingConfirmation, SettlementOutcome};
pub use settlement_database::{SettlementDatabase, SettlementError};
