//! Races two (and many) confirmations against each other to check that the escrow release fires exactly once.

use std::sync::Arc;

use futures_util::future::join_all;
use mes_common::Kobo;
use settlement_engine::{
    db_types::{NewOrder, OrderId, OrderStatusType, TransactionType},
    events::EventProducers,
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        seeds::{seed_escrow_order, seed_user},
    },
    traits::AccountManagement,
    ConfirmationStatus,
    SettlementApi,
    SqliteDatabase,
};

async fn new_test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

#[tokio::test]
async fn racing_confirmations_release_exactly_once() {
    let db = new_test_db().await;
    let buyer = seed_user(&db, "Amaka").await;
    let seller = seed_user(&db, "Tunde").await;
    let api = Arc::new(SettlementApi::new(db.clone(), EventProducers::default()));
    let order = seed_escrow_order(api.db(), "ord-6001", buyer, seller, 10_000).await;

    let a = {
        let api = Arc::clone(&api);
        let order_id = order.order_id.clone();
        tokio::spawn(async move { api.confirm_order_completion(&order_id, buyer).await })
    };
    let b = {
        let api = Arc::clone(&api);
        let order_id = order.order_id.clone();
        tokio::spawn(async move { api.confirm_order_completion(&order_id, seller).await })
    };
    let results = vec![a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];

    // Whichever order the tasks ran in, one call waited and the other completed the settlement
    let completed = results.iter().filter(|r| r.status == ConfirmationStatus::Completed).count();
    let waiting = results.iter().filter(|r| r.status == ConfirmationStatus::WaitingForOtherParty).count();
    assert_eq!(completed, 1);
    assert_eq!(waiting, 1);

    let wallet = db.fetch_wallet_for_user(seller).await.unwrap().unwrap();
    assert_eq!(wallet.balance, Kobo::from_naira(10_000));
    let txns = db.fetch_transactions_for_order(&order.order_id).await.unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].txn_type, TransactionType::TransferIn);
}

#[tokio::test]
async fn parallel_placements_queue_instead_of_erroring() {
    const NUM_ORDERS: usize = 8;
    let db = new_test_db().await;
    let buyer = seed_user(&db, "Amaka").await;
    let seller = seed_user(&db, "Tunde").await;
    let api = Arc::new(SettlementApi::new(db.clone(), EventProducers::default()));

    // Every placement opens its own read-then-write transaction. They must serialize on the write connection, not
    // fail with "database is locked".
    let mut tasks = Vec::new();
    for i in 0..NUM_ORDERS {
        let api = Arc::clone(&api);
        tasks.push(tokio::spawn(async move {
            let order = NewOrder::new(OrderId(format!("ord-5{i:03}")), buyer, seller, Kobo::from_naira(100));
            api.place_order_in_escrow(order).await
        }));
    }
    for result in join_all(tasks).await {
        result.unwrap().expect("Placement failed under write contention");
    }
    for i in 0..NUM_ORDERS {
        let order = db.fetch_order_by_order_id(&OrderId(format!("ord-5{i:03}"))).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatusType::InEscrow);
    }
}

#[tokio::test]
async fn concurrent_settlements_for_one_seller_conserve_the_balance() {
    const NUM_ORDERS: i64 = 10;
    let db = new_test_db().await;
    let seller = seed_user(&db, "Tunde").await;
    let mut buyers = Vec::new();
    for i in 0..NUM_ORDERS {
        buyers.push(seed_user(&db, &format!("Buyer {i}")).await);
    }
    let api = Arc::new(SettlementApi::new(db.clone(), EventProducers::default()));

    let mut orders = Vec::new();
    for (i, buyer) in buyers.iter().enumerate() {
        let order = seed_escrow_order(api.db(), &format!("ord-7{i:03}"), *buyer, seller, (i as i64 + 1) * 100).await;
        orders.push(order);
    }

    // Both confirmations for every order fire at once
    let mut tasks = Vec::new();
    for (order, buyer) in orders.iter().zip(&buyers) {
        for user in [*buyer, seller] {
            let api = Arc::clone(&api);
            let order_id = order.order_id.clone();
            tasks.push(tokio::spawn(async move { api.confirm_order_completion(&order_id, user).await }));
        }
    }
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    for order in &orders {
        let stored = db.fetch_order_by_order_id(&order.order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatusType::Completed);
        assert_eq!(db.fetch_transactions_for_order(&order.order_id).await.unwrap().len(), 1);
    }
    // 100 + 200 + ... + 1000 naira
    let expected = Kobo::from_naira((1..=NUM_ORDERS).map(|i| i * 100).sum());
    let wallet = db.fetch_wallet_for_user(seller).await.unwrap().unwrap();
    assert_eq!(wallet.balance, expected);
    let history = db.fetch_transactions_for_user(seller).await.unwrap();
    assert_eq!(history.len(), NUM_ORDERS as usize);
}
