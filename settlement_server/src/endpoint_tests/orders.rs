//! Tests for the read-side endpoints: orders, wallet and history.

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use settlement_engine::AccountApi;

use super::{
    helpers::{get_request, test_order, test_transaction, test_wallet},
    mocks::MockSettlementDb,
};
use crate::routes::{MyHistoryRoute, MyWalletRoute, OrderByIdRoute, OrderTransactionsRoute};

const BUYER: i64 = 10;
const SELLER: i64 = 20;
const STRANGER: i64 = 99;

fn configure(cfg: &mut ServiceConfig) {
    let mut db = MockSettlementDb::new();
    db.expect_fetch_order_by_order_id().returning(|order_id| {
        if order_id.as_str() == "ord-1001" {
            Ok(Some(test_order("ord-1001", BUYER, SELLER, 5000)))
        } else {
            Ok(None)
        }
    });
    db.expect_fetch_wallet_for_user().returning(|user_id| Ok(Some(test_wallet(user_id, 750))));
    db.expect_fetch_transactions_for_user()
        .returning(|user_id| Ok(vec![test_transaction(user_id, 5000, "esc-1718012345678-x3Fb9Q", "ord-1001")]));
    db.expect_fetch_transactions_for_order()
        .returning(|_| Ok(vec![test_transaction(SELLER, 5000, "esc-1718012345678-x3Fb9Q", "ord-1001")]));
    let accounts_api = AccountApi::new(db);
    cfg.service(OrderByIdRoute::<MockSettlementDb>::new())
        .service(OrderTransactionsRoute::<MockSettlementDb>::new())
        .service(MyWalletRoute::<MockSettlementDb>::new())
        .service(MyHistoryRoute::<MockSettlementDb>::new())
        .app_data(web::Data::new(accounts_api));
}

#[actix_web::test]
async fn fetch_order_without_identity() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(None, "/orders/ord-1001", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No user identity"));
}

#[actix_web::test]
async fn fetch_order_as_buyer() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(Some(BUYER), "/orders/ord-1001", configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""order_id":"ord-1001""#));
    assert!(body.contains(r#""status":"InEscrow""#));
}

#[actix_web::test]
async fn fetch_order_as_stranger() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(Some(STRANGER), "/orders/ord-1001", configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("not a party"));
}

#[actix_web::test]
async fn fetch_unknown_order() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request(Some(BUYER), "/orders/ord-9999", configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn order_transactions_are_party_only() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(Some(SELLER), "/orders/ord-1001/transactions", configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("esc-1718012345678-x3Fb9Q"));
    let (status, _) = get_request(Some(STRANGER), "/orders/ord-1001/transactions", configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn fetch_my_wallet() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(Some(SELLER), "/wallet", configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""user_id":20"#));
    assert!(body.contains(r#""balance":75000"#));
}

#[actix_web::test]
async fn fetch_my_history() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(Some(SELLER), "/history", configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""txn_type":"TransferIn""#));
    assert!(body.contains(r#""user_id":20"#));
}

#[actix_web::test]
async fn garbage_identity_is_rejected() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(None, "/wallet", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("error"));
}
