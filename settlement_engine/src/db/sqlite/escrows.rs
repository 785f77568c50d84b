use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{Escrow, EscrowStatusType, OrderId},
};

/// Creates the `Held` escrow record for a newly placed order. Must run in the same transaction as the order insert so
/// that the one-escrow-per-order invariant cannot be observed broken.
pub async fn insert_escrow(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<i64, SqliteDatabaseError> {
    let result = sqlx::query_scalar::<_, i64>("INSERT INTO escrows (order_id) VALUES ($1) RETURNING id")
        .bind(order_id)
        .fetch_one(conn)
        .await;
    match result {
        Ok(id) => Ok(id),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(SqliteDatabaseError::DuplicateEscrow(order_id.clone()))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_escrow_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Escrow>, SqliteDatabaseError> {
    let escrow = sqlx::query_as::<_, Escrow>(
        "SELECT id, order_id, status, created_at, released_at FROM escrows WHERE order_id = $1",
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(escrow)
}

/// Marks the escrow for `order_id` as `Released` and stamps `released_at`. Guarded on the escrow still being `Held`;
/// returns `false` when no held escrow row matched.
pub async fn release(
    order_id: &OrderId,
    released_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let res = sqlx::query("UPDATE escrows SET status = $1, released_at = $2 WHERE order_id = $3 AND status = $4")
        .bind(EscrowStatusType::Released)
        .bind(released_at)
        .bind(order_id)
        .bind(EscrowStatusType::Held)
        .execute(conn)
        .await?;
    Ok(res.rows_affected() == 1)
}

/// Marks the escrow for `order_id` as `Refunded`. Guarded on the escrow still being `Held`.
pub async fn refund(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    let res = sqlx::query("UPDATE escrows SET status = $1 WHERE order_id = $2 AND status = $3")
        .bind(EscrowStatusType::Refunded)
        .bind(order_id)
        .bind(EscrowStatusType::Held)
        .execute(conn)
        .await?;
    Ok(res.rows_affected() == 1)
}
