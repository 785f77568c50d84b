use log::trace;
use sqlx::{types::Json, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewTransaction, OrderId, Transaction},
};

const TXN_COLUMNS: &str = "id, user_id, wallet_id, txn_type, amount, status, reference, description, metadata, \
                           created_at";

/// Appends a transaction to the audit log and returns the stored record. Rows in this table are never updated or
/// deleted.
pub async fn insert(txn: NewTransaction, conn: &mut SqliteConnection) -> Result<Transaction, SqliteDatabaseError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
            INSERT INTO transactions (user_id, wallet_id, txn_type, amount, status, reference, description, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id;
        "#,
    )
    .bind(txn.user_id)
    .bind(txn.wallet_id)
    .bind(txn.txn_type)
    .bind(txn.amount)
    .bind(txn.status)
    .bind(&txn.reference)
    .bind(&txn.description)
    .bind(Json(txn.metadata))
    .fetch_one(&mut *conn)
    .await?;
    trace!("🧾️ Transaction [{}] appended with id {id}", txn.reference);
    let record = fetch_by_id(id, conn).await?;
    Ok(record)
}

async fn fetch_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Transaction, SqliteDatabaseError> {
    let q = format!("SELECT {TXN_COLUMNS} FROM transactions WHERE id = $1");
    let txn = sqlx::query_as::<_, Transaction>(&q).bind(id).fetch_one(conn).await?;
    Ok(txn)
}

/// Fetches the transaction log for a user, most recent first.
pub async fn fetch_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Transaction>, SqliteDatabaseError> {
    let q = format!("SELECT {TXN_COLUMNS} FROM transactions WHERE user_id = $1 ORDER BY id DESC");
    let txns = sqlx::query_as::<_, Transaction>(&q).bind(user_id).fetch_all(conn).await?;
    Ok(txns)
}

/// Fetches all transactions whose metadata references the given order.
pub async fn fetch_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Transaction>, SqliteDatabaseError> {
    let q = format!("SELECT {TXN_COLUMNS} FROM transactions WHERE json_extract(metadata, '$.order_id') = $1 ORDER BY id");
    let txns = sqlx::query_as::<_, Transaction>(&q).bind(order_id.as_str()).fetch_all(conn).await?;
    Ok(txns)
}
