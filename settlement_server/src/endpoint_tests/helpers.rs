use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::{TimeZone, Utc};
use mes_common::Kobo;
use settlement_engine::db_types::{
    Json,
    Order,
    OrderId,
    OrderStatusType,
    Transaction,
    TransactionStatus,
    TransactionType,
    User,
    Wallet,
};

use crate::auth::USER_ID_HEADER;

pub async fn get_request(
    user_id: Option<i64>,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let mut req = TestRequest::get().uri(path);
    if let Some(id) = user_id {
        req = req.insert_header((USER_ID_HEADER, id.to_string()));
    }
    call(req, configure).await
}

pub async fn post_request(
    user_id: Option<i64>,
    path: &str,
    body: Option<serde_json::Value>,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let mut req = TestRequest::post().uri(path);
    if let Some(id) = user_id {
        req = req.insert_header((USER_ID_HEADER, id.to_string()));
    }
    if let Some(body) = body {
        req = req.set_json(body);
    }
    call(req, configure).await
}

async fn call(req: TestRequest, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let (_, res) = res.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

//--------------------------------------       Fixtures        -------------------------------------------------------

pub fn test_order(order_id: &str, buyer_id: i64, seller_id: i64, naira: i64) -> Order {
    let ts = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
    Order {
        id: 1,
        order_id: OrderId(order_id.into()),
        buyer_id,
        seller_id,
        product_ids: Json(vec!["prod-1".into()]),
        amount: Kobo::from_naira(naira),
        status: OrderStatusType::InEscrow,
        buyer_confirmed: false,
        seller_confirmed: false,
        created_at: ts,
        updated_at: ts,
        completed_at: None,
    }
}

pub fn test_user(id: i64, name: &str) -> User {
    User { id, name: name.into(), created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() }
}

pub fn test_wallet(user_id: i64, naira: i64) -> Wallet {
    let ts = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
    Wallet { id: user_id * 10, user_id, balance: Kobo::from_naira(naira), created_at: ts, updated_at: ts }
}

pub fn test_transaction(user_id: i64, naira: i64, reference: &str, order_id: &str) -> Transaction {
    Transaction {
        id: 1,
        user_id,
        wallet_id: user_id * 10,
        txn_type: TransactionType::TransferIn,
        amount: Kobo::from_naira(naira),
        status: TransactionStatus::Success,
        reference: reference.into(),
        description: format!("Escrow release for order #{order_id}"),
        metadata: Json(serde_json::json!({ "order_id": order_id })),
        created_at: Utc.with_ymd_and_hms(2024, 6, 10, 12, 30, 0).unwrap(),
    }
}
