mod entitlements;
mod mocks;
mod orders;

use bazaar_payment_engine::{
    db_types::CatalogPackage,
    test_utils::prepare_env::{prepare_test_env, random_db_url},
    traits::FulfillmentDatabase,
    SqliteDatabase,
};
use bzr_common::MinorUnits;

pub async fn prepare_db() -> SqliteDatabase {
    let db = prepare_test_env(&random_db_url()).await;
    let bundle = CatalogPackage::new("bundle_1b5p", "Brand page + 5 product slots", MinorUnits::from(10_000));
    db.upsert_package(bundle).await.expect("Error seeding catalog");
    db
}

/// Builds a test service with the same route layout as the real server, but a mock processor.
#[macro_export]
macro_rules! test_app {
    ($db:expr, $gateway:expr, $webhook:expr) => {{
        use actix_web::{test, web, App};
        use bazaar_payment_engine::{EntitlementApi, OrderFlowApi, SqliteDatabase};
        use $crate::{
            endpoint_tests::mocks::MockGateway,
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
        let offset = chrono::FixedOffset::east_opt(7 * 3600).unwrap();
        let order_flow_api = OrderFlowApi::new($db.clone(), $gateway.clone(), offset);
        let entitlement_api = EntitlementApi::new($db.clone());
        let webhook_cfg: $crate::config::WebhookConfig = $webhook;
        let webhook_scope = web::scope("/webhooks")
            .wrap(HmacMiddlewareFactory::new(
                "X-Payment-Signature",
                webhook_cfg.hmac_secret.clone(),
                webhook_cfg.hmac_checks,
            ))
            .service(PaymentWebhookRoute::<SqliteDatabase, MockGateway>::new());
        test::init_service(
            App::new()
                .app_data(web::Data::new(order_flow_api))
                .app_data(web::Data::new(entitlement_api))
                .service(health)
                .service(CreateOrderRoute::<SqliteDatabase, MockGateway>::new())
                .service(MyOrdersRoute::<SqliteDatabase, MockGateway>::new())
                .service(CaptureOrderRoute::<SqliteDatabase, MockGateway>::new())
                .service(OrderByExternalIdRoute::<SqliteDatabase, MockGateway>::new())
                .service(MyEntitlementsRoute::<SqliteDatabase>::new())
                .service(AdjustEntitlementRoute::<SqliteDatabase>::new())
                .service(webhook_scope),
        )
        .await
    }};
}
