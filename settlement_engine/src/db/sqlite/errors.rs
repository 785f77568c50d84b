use thiserror::Error;

use crate::{db_types::OrderId, traits::AccountApiError, traits::SettlementError};

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database error: {0}")]
    QueryError(#[from] sqlx::Error),
    #[error("Could not run migrations: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Could not serialize metadata: {0}")]
    MetadataError(#[from] serde_json::Error),
    #[error("Order {0} already has an escrow record")]
    DuplicateEscrow(OrderId),
}

impl From<SqliteDatabaseError> for SettlementError {
    fn from(e: SqliteDatabaseError) -> Self {
        SettlementError::DatabaseError(e.to_string())
    }
}

impl From<SqliteDatabaseError> for AccountApiError {
    fn from(e: SqliteDatabaseError) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}
