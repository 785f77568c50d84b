use sqlx::SqliteConnection;

use crate::{db::sqlite::SqliteDatabaseError, db_types::User};

pub async fn fetch_user_by_id(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, SqliteDatabaseError> {
    let user = sqlx::query_as::<_, User>("SELECT id, name, created_at FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(user)
}

/// Adds a record to the local user directory read model. The marketplace identity service owns user accounts; this
/// table only mirrors what settlement needs (names for notifications and audit metadata).
pub async fn insert_user(name: &str, conn: &mut SqliteConnection) -> Result<i64, SqliteDatabaseError> {
    let id = sqlx::query_scalar::<_, i64>("INSERT INTO users (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(conn)
        .await?;
    Ok(id)
}
