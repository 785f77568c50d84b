//! Helpers for seeding users, wallets and escrow orders in tests.

use mes_common::Kobo;

use crate::{
    db::sqlite::{users, wallets},
    db_types::{NewOrder, Order, OrderId},
    traits::SettlementDatabase,
    SqliteDatabase,
};

/// Creates a user directory record with an empty wallet and returns the user id.
pub async fn seed_user(db: &SqliteDatabase, name: &str) -> i64 {
    let mut conn = db.write_pool().acquire().await.expect("Error acquiring connection");
    let id = users::insert_user(name, &mut conn).await.expect("Error inserting user");
    wallets::fetch_or_create_wallet(id, &mut conn).await.expect("Error creating wallet");
    id
}

/// Sets a user's wallet balance directly, bypassing the settlement flows.
pub async fn set_wallet_balance(db: &SqliteDatabase, user_id: i64, balance: Kobo) {
    let mut conn = db.write_pool().acquire().await.expect("Error acquiring connection");
    let wallet = wallets::fetch_or_create_wallet(user_id, &mut conn).await.expect("Error fetching wallet");
    wallets::update_balance(wallet.id, balance, &mut conn).await.expect("Error updating balance");
}

/// Places a new order with the given amount (in naira) into escrow and returns it.
pub async fn seed_escrow_order(db: &SqliteDatabase, order_id: &str, buyer_id: i64, seller_id: i64, naira: i64) -> Order {
    let order = NewOrder::new(OrderId(order_id.to_string()), buyer_id, seller_id, Kobo::from_naira(naira))
        .with_products(vec![format!("prod-{order_id}")]);
    db.place_order_in_escrow(order).await.expect("Error placing order in escrow")
}
