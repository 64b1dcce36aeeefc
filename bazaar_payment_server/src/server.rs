use std::time::Duration;

use actix_web::{http::KeepAlive, middleware::Logger, web, App, HttpServer};
use actix_web::dev::Server;
use bazaar_payment_engine::{traits::PaymentGateway, EntitlementApi, OrderFlowApi, SqliteDatabase};
use paypal_tools::PayPalApi;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::paypal::PayPalGateway,
    middleware::HmacMiddlewareFactory,
    routes::{
        health,
        AdjustEntitlementRoute,
        CaptureOrderRoute,
        CreateOrderRoute,
        MyEntitlementsRoute,
        MyOrdersRoute,
        OrderByExternalIdRoute,
    },
    webhook_routes::PaymentWebhookRoute,
};

/// The header the processor delivers its webhook signature in.
const WEBHOOK_HMAC_HEADER: &str = "X-Payment-Signature";

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let paypal = PayPalApi::new(config.paypal.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = PayPalGateway::new(paypal);
    let srv = create_server_instance(config, db, gateway)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance<G>(config: ServerConfig, db: SqliteDatabase, gateway: G) -> Result<Server, ServerError>
where G: PaymentGateway + Send + Sync + 'static
{
    let pricing_offset = config.pricing_offset();
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let order_flow_api = OrderFlowApi::new(db.clone(), gateway.clone(), pricing_offset);
        let entitlement_api = EntitlementApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bps::access_log"))
            .app_data(web::Data::new(order_flow_api))
            .app_data(web::Data::new(entitlement_api));
        // The webhook scope carries the processor signature check; everything inside it can
        // trust the body it reads.
        let webhook_scope = web::scope("/webhooks")
            .wrap(HmacMiddlewareFactory::new(
                WEBHOOK_HMAC_HEADER,
                config.webhook.hmac_secret.clone(),
                config.webhook.hmac_checks,
            ))
            .service(PaymentWebhookRoute::<SqliteDatabase, G>::new());
        app.service(health)
            .service(CreateOrderRoute::<SqliteDatabase, G>::new())
            .service(MyOrdersRoute::<SqliteDatabase, G>::new())
            .service(CaptureOrderRoute::<SqliteDatabase, G>::new())
            .service(OrderByExternalIdRoute::<SqliteDatabase, G>::new())
            .service(MyEntitlementsRoute::<SqliteDatabase>::new())
            .service(AdjustEntitlementRoute::<SqliteDatabase>::new())
            .service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
