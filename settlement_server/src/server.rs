use std::time::Duration;

use actix_web::{
    dev::Server,
    http::KeepAlive,
    middleware::{Condition, Logger},
    web,
    App,
    HttpResponse,
    HttpServer,
};
use log::*;
use settlement_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    AccountApi,
    SettlementApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    data_objects::JsonResponse,
    errors::ServerError,
    routes::{
        health,
        CancelOrderRoute,
        ConfirmOrderRoute,
        MyHistoryRoute,
        MyWalletRoute,
        OpenDisputeRoute,
        OrderByIdRoute,
        OrderTransactionsRoute,
        PlaceOrderRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(config.event_buffer_size, default_event_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// The default subscribers: structured log lines for every notification and settlement. A deployment that delivers
/// real push notifications replaces these with its own hooks before calling [`create_server_instance`].
pub fn default_event_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_notification(|ev| {
        Box::pin(async move {
            info!("📣️ [{}] to user #{}: {} ({})", ev.notification_type, ev.recipient, ev.content, ev.link);
        })
    });
    hooks.on_order_settled(|ev| {
        Box::pin(async move {
            info!(
                "🧾️ Order {} settled. {} released with reference [{}].",
                ev.order.order_id, ev.transaction.amount, ev.transaction.reference
            );
        })
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    // The settlement api must be shared across workers, not rebuilt per worker, so that its per-order locks cover
    // every connection.
    let settlement_api = web::Data::new(SettlementApi::new(db.clone(), producers));
    let accounts_api = web::Data::new(AccountApi::new(db));
    let access_log = config.access_log;
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Condition::new(
                access_log,
                Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mes::access_log"),
            ))
            .app_data(settlement_api.clone())
            .app_data(accounts_api.clone())
            .service(health)
            .service(PlaceOrderRoute::<SqliteDatabase>::new())
            .service(ConfirmOrderRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new())
            .service(OpenDisputeRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(OrderTransactionsRoute::<SqliteDatabase>::new())
            .service(MyWalletRoute::<SqliteDatabase>::new())
            .service(MyHistoryRoute::<SqliteDatabase>::new())
            .default_service(web::route().to(not_found))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(JsonResponse::failure("No such endpoint"))
}
