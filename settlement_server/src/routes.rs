//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers are async and must never block the worker thread. Database work goes through the engine APIs, which are
//! async all the way down.

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use mes_common::Kobo;
use settlement_engine::{
    db_types::{NewOrder, OrderId},
    traits::{AccountManagement, SettlementDatabase},
    AccountApi,
    SettlementApi,
};

use crate::{
    auth::UserClaims,
    data_objects::{NewOrderRequest, ReasonBody},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//--------------------------------------------   Place order  --------------------------------------------------

route!(place_order => Post "/orders" impl SettlementDatabase);
/// Route handler for the payment gateway's escrow placement call.
///
/// The gateway calls this once the buyer's payment has been captured. The order is stored in `InEscrow` status with
/// a `Held` escrow record. This endpoint is service-to-service; it carries no end-user identity.
pub async fn place_order<B: SettlementDatabase>(
    body: web::Json<NewOrderRequest>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    debug!("💻️ POST place_order for {}", req.order_id);
    let amount = Kobo::from(req.amount);
    if amount.is_negative() || amount == Kobo::default() {
        return Err(ServerError::InvalidRequestBody(format!("{amount} is not a valid escrow amount")));
    }
    let order = NewOrder::new(OrderId(req.order_id), req.buyer_id, req.seller_id, amount)
        .with_products(req.product_ids);
    let order = api.place_order_in_escrow(order).await?;
    Ok(HttpResponse::Created().json(order))
}

//-----------------------------------------   Confirm completion  ----------------------------------------------

route!(confirm_order => Post "/orders/{order_id}/confirm-completion" impl SettlementDatabase);
/// Route handler for completion confirmations.
///
/// The caller must be the buyer or the seller of the order. The response says whether the call completed the
/// settlement or whether the counterparty's confirmation is still outstanding.
pub async fn confirm_order<B: SettlementDatabase>(
    claims: UserClaims,
    path: web::Path<String>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId(path.into_inner());
    debug!("💻️ POST confirm_order {order_id} by user #{}", claims.user_id);
    let result = api.confirm_order_completion(&order_id, claims.user_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Cancel  -----------------------------------------------------

route!(cancel_order => Post "/orders/{order_id}/cancel" impl SettlementDatabase);
/// Route handler for cancelling an in-escrow order. The held funds are refunded to the buyer's wallet.
pub async fn cancel_order<B: SettlementDatabase>(
    claims: UserClaims,
    path: web::Path<String>,
    body: Option<web::Json<ReasonBody>>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId(path.into_inner());
    let reason = body.and_then(|b| b.into_inner().reason).unwrap_or_default();
    debug!("💻️ POST cancel_order {order_id} by user #{}", claims.user_id);
    let order = api.cancel_order(&order_id, claims.user_id, &reason).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Dispute  ----------------------------------------------------

route!(open_dispute => Post "/orders/{order_id}/dispute" impl SettlementDatabase);
/// Route handler for opening a dispute. The escrowed funds stay held; resolution happens out of band.
pub async fn open_dispute<B: SettlementDatabase>(
    claims: UserClaims,
    path: web::Path<String>,
    body: Option<web::Json<ReasonBody>>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId(path.into_inner());
    let reason = body.and_then(|b| b.into_inner().reason).unwrap_or_default();
    debug!("💻️ POST open_dispute {order_id} by user #{}", claims.user_id);
    let order = api.open_dispute(&order_id, claims.user_id, &reason).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Order  ------------------------------------------------------

route!(order_by_id => Get "/orders/{order_id}" impl AccountManagement);
/// Route handler for fetching a single order. Only the order's parties may see it.
pub async fn order_by_id<B: AccountManagement>(
    claims: UserClaims,
    path: web::Path<String>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId(path.into_inner());
    debug!("💻️ GET order {order_id} for user #{}", claims.user_id);
    let order = api
        .order_by_order_id(&order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} not found")))?;
    if order.party_of(claims.user_id).is_none() {
        return Err(ServerError::InsufficientPermissions(format!(
            "User #{} is not a party to order {order_id}",
            claims.user_id
        )));
    }
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Wallet  -----------------------------------------------------

route!(my_wallet => Get "/wallet" impl AccountManagement);
/// Route handler for the caller's wallet balance.
pub async fn my_wallet<B: AccountManagement>(
    claims: UserClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_wallet for user #{}", claims.user_id);
    let wallet = api
        .wallet_for_user(claims.user_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No wallet for user #{}", claims.user_id)))?;
    Ok(HttpResponse::Ok().json(wallet))
}

//----------------------------------------------   History  ----------------------------------------------------

route!(my_history => Get "/history" impl AccountManagement);
/// Route handler for the caller's transaction history, most recent first.
pub async fn my_history<B: AccountManagement>(
    claims: UserClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_history for user #{}", claims.user_id);
    let history = api.history_for_user(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(history))
}

//-----------------------------------------   Order transactions  ----------------------------------------------

route!(order_transactions => Get "/orders/{order_id}/transactions" impl AccountManagement);
/// Route handler for the audit records written against an order. Only visible to the order's parties.
pub async fn order_transactions<B: AccountManagement>(
    claims: UserClaims,
    path: web::Path<String>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId(path.into_inner());
    debug!("💻️ GET transactions for order {order_id} by user #{}", claims.user_id);
    let order = api
        .order_by_order_id(&order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} not found")))?;
    if order.party_of(claims.user_id).is_none() {
        return Err(ServerError::InsufficientPermissions(format!(
            "User #{} is not a party to order {order_id}",
            claims.user_id
        )));
    }
    let txns = api.transactions_for_order(&order_id).await?;
    Ok(HttpResponse::Ok().json(txns))
}
