pub mod db;
mod errors;

pub mod escrows;
pub mod orders;
pub mod transactions;
pub mod users;
pub mod wallets;

use std::{env, str::FromStr, time::Duration};

pub use db::SqliteDatabase;
pub use errors::SqliteDatabaseError;
use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

const SQLITE_DB_URL: &str = "sqlite://data/mes_store.db";

pub fn db_url() -> String {
    let result = env::var("MES_DATABASE_URL").unwrap_or_else(|_| {
        info!("MES_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqliteDatabaseError> {
    // WAL mode keeps reads running while a settlement transaction holds the write lock. Mutating transactions must
    // all go through the one-connection pool built in `SqliteDatabase::new_with_url`; a deferred read-then-write
    // transaction on a second connection would abort with a snapshot conflict that the busy timeout cannot retry.
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
