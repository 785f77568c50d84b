use chrono::{DateTime, Utc};
use log::trace;
use sqlx::{types::Json, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewOrder, Order, OrderId, OrderParty, OrderStatusType},
};

const ORDER_COLUMNS: &str = "id, order_id, buyer_id, seller_id, product_ids, amount, status, buyer_confirmed, \
                             seller_confirmed, created_at, updated_at, completed_at";

/// Inserts a new order into the database using the given connection. This is not atomic on its own. Embed this call
/// inside a transaction and pass `&mut *tx` as the connection argument to get atomicity with the escrow insert.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<i64, SqliteDatabaseError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
            INSERT INTO orders (order_id, buyer_id, seller_id, product_ids, amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id;
        "#,
    )
    .bind(&order.order_id)
    .bind(order.buyer_id)
    .bind(order.seller_id)
    .bind(Json(order.product_ids))
    .bind(order.amount)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let q = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1 LIMIT 1");
    let order = sqlx::query_as::<_, Order>(&q).bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

/// Checks whether an order with the given `OrderId` already exists. If it does, the internal `id` of the order is
/// returned.
pub async fn order_exists(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<i64>, SqliteDatabaseError> {
    fetch_order_by_order_id(order_id, conn).await.map(|o| o.map(|o| o.id))
}

/// Sets the confirmation flag for the given party on the order, guarded on the flag still being clear. Flags are
/// never cleared.
///
/// Returns `false` when the flag was already set, i.e. the party has confirmed before. Callers use this to keep
/// repeat confirmations free of side effects.
pub async fn set_confirmation_flag(
    id: i64,
    party: OrderParty,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let column = match party {
        OrderParty::Buyer => "buyer_confirmed",
        OrderParty::Seller => "seller_confirmed",
    };
    let q = format!("UPDATE orders SET {column} = 1, updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND {column} = 0");
    let res = sqlx::query(&q).bind(id).execute(conn).await?;
    trace!("📦️ Confirmation flag '{column}' set on order id {id} ({} row(s))", res.rows_affected());
    Ok(res.rows_affected() == 1)
}

/// Transitions the order to `Completed` and stamps `completed_at`, guarded on the order still being in escrow.
///
/// Returns `false` when the guard did not match, i.e. the order left `InEscrow` status between the caller's read and
/// this write.
pub async fn mark_completed(
    id: i64,
    completed_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let res = sqlx::query(
        r#"
            UPDATE orders SET status = $1, completed_at = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $3 AND status = $4;
        "#,
    )
    .bind(OrderStatusType::Completed)
    .bind(completed_at)
    .bind(id)
    .bind(OrderStatusType::InEscrow)
    .execute(conn)
    .await?;
    Ok(res.rows_affected() == 1)
}

/// Transitions an in-escrow order to `Cancelled` or `Disputed`, with the same status guard as [`mark_completed`].
pub async fn mark_terminal(
    id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let res = sqlx::query(
        r#"
            UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND status = $3;
        "#,
    )
    .bind(status)
    .bind(id)
    .bind(OrderStatusType::InEscrow)
    .execute(conn)
    .await?;
    Ok(res.rows_affected() == 1)
}
