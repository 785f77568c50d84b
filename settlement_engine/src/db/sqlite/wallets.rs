use log::trace;
use mes_common::Kobo;
use sqlx::SqliteConnection;

use crate::{db::sqlite::SqliteDatabaseError, db_types::Wallet};

const WALLET_COLUMNS: &str = "id, user_id, balance, created_at, updated_at";

pub async fn fetch_wallet_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Wallet>, SqliteDatabaseError> {
    let q = format!("SELECT {WALLET_COLUMNS} FROM wallets WHERE user_id = $1");
    let wallet = sqlx::query_as::<_, Wallet>(&q).bind(user_id).fetch_optional(conn).await?;
    Ok(wallet)
}

/// Fetches the wallet for the given user, creating an empty one if it does not exist yet.
pub async fn fetch_or_create_wallet(user_id: i64, conn: &mut SqliteConnection) -> Result<Wallet, SqliteDatabaseError> {
    if let Some(wallet) = fetch_wallet_for_user(user_id, &mut *conn).await? {
        return Ok(wallet);
    }
    let q = format!("INSERT INTO wallets (user_id) VALUES ($1) RETURNING {WALLET_COLUMNS}");
    let wallet = sqlx::query_as::<_, Wallet>(&q).bind(user_id).fetch_one(conn).await?;
    trace!("💼️ Created wallet #{} for user #{user_id}", wallet.id);
    Ok(wallet)
}

/// The single entry point through which a wallet balance is ever written.
///
/// The new balance must have been computed from a read of the same wallet inside the same enclosing transaction as
/// this call, so that concurrent settlements crediting one seller serialize instead of clobbering each other.
pub async fn update_balance(
    wallet_id: i64,
    new_balance: Kobo,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query("UPDATE wallets SET balance = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(new_balance)
        .bind(wallet_id)
        .execute(conn)
        .await?;
    trace!("💼️ Wallet #{wallet_id} balance set to {new_balance}");
    Ok(())
}
