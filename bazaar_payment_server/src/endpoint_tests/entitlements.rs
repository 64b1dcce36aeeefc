use actix_web::{http::StatusCode, test};
use bzr_common::Secret;

use crate::{
    config::WebhookConfig,
    data_objects::AdjustResult,
    endpoint_tests::{mocks::MockGateway, prepare_db},
    test_app,
};

fn open_webhooks() -> WebhookConfig {
    WebhookConfig { hmac_secret: Secret::new(String::new()), hmac_checks: false }
}

#[actix_web::test]
async fn adjust_requires_an_acting_user() {
    let db = prepare_db().await;
    let app = test_app!(db, MockGateway::new(), open_webhooks());
    let req = test::TestRequest::post()
        .uri("/entitlements/adjust")
        .set_json(serde_json::json!({ "field": "product_slots", "delta": 1 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn adjust_only_accepts_unit_deltas() {
    let db = prepare_db().await;
    let app = test_app!(db, MockGateway::new(), open_webhooks());
    let req = test::TestRequest::post()
        .uri("/entitlements/adjust")
        .insert_header(("X-User-Id", "alice"))
        .set_json(serde_json::json!({ "field": "product_slots", "delta": 5 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn decrement_at_zero_is_rejected() {
    let db = prepare_db().await;
    let app = test_app!(db, MockGateway::new(), open_webhooks());
    let req = test::TestRequest::post()
        .uri("/entitlements/adjust")
        .insert_header(("X-User-Id", "bob"))
        .set_json(serde_json::json!({ "field": "product_slots", "delta": -1 }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // And the counter is still zero.
    let req = test::TestRequest::get().uri("/entitlements").insert_header(("X-User-Id", "bob")).to_request();
    let record: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(record["product_slots"], serde_json::json!(0));
}

#[actix_web::test]
async fn increment_is_visible_to_a_subsequent_read() {
    let db = prepare_db().await;
    let app = test_app!(db, MockGateway::new(), open_webhooks());
    let req = test::TestRequest::post()
        .uri("/entitlements/adjust")
        .insert_header(("X-User-Id", "carol"))
        .set_json(serde_json::json!({ "field": "popup_extra_slots", "delta": 1 }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let result: AdjustResult = test::read_body_json(res).await;
    assert_eq!(result.new_value, 1);

    let req = test::TestRequest::get().uri("/entitlements").insert_header(("X-User-Id", "carol")).to_request();
    let record: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(record["popup_extra_slots"], serde_json::json!(1));
}
