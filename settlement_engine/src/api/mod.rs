mod accounts_api;
mod settlement_api;
mod settlement_objects;

pub use accounts_api::AccountApi;
pub use settlement_api::{OrderLocks, SettlementApi};
pub use settlement_objects::{ConfirmationResult, ConfirmationStatus};
