use actix_web::{http::StatusCode, test};
use bazaar_payment_engine::db_types::OrderStatusType;
use bzr_common::Secret;

use crate::{
    config::WebhookConfig,
    data_objects::{CaptureAck, JsonResponse, NewOrderResult},
    endpoint_tests::{mocks::MockGateway, prepare_db},
    helpers::calculate_hmac,
    test_app,
};

fn open_webhooks() -> WebhookConfig {
    WebhookConfig { hmac_secret: Secret::new(String::new()), hmac_checks: false }
}

#[actix_web::test]
async fn checkout_capture_and_repeat_capture() {
    let db = prepare_db().await;
    let gateway = MockGateway::new();
    let app = test_app!(db, gateway, open_webhooks());

    let req = test::TestRequest::post()
        .uri("/orders")
        .set_json(serde_json::json!({ "userId": "alice", "items": [{ "code": "bundle_1b5p", "qty": 1 }] }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let order: NewOrderResult = test::read_body_json(res).await;
    assert!(order.order_id.starts_with("bzr-"));

    let capture_uri = format!("/orders/{}/capture", order.external_order_id);
    let res = test::call_service(&app, test::TestRequest::post().uri(&capture_uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let ack: CaptureAck = test::read_body_json(res).await;
    assert!(ack.ok);
    assert_eq!(ack.status, OrderStatusType::Captured);

    // Idempotent on repeat calls: still a 200, still Captured, no second processor call.
    let res = test::call_service(&app, test::TestRequest::post().uri(&capture_uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let ack: CaptureAck = test::read_body_json(res).await;
    assert!(ack.ok);
    assert_eq!(ack.status, OrderStatusType::Captured);
    assert_eq!(gateway.captures(), 1);

    // The grant is visible on the entitlement surface.
    let req = test::TestRequest::get().uri("/entitlements").insert_header(("X-User-Id", "alice")).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let record: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(record["brand_page"], serde_json::json!(true));
    assert_eq!(record["product_slots"], serde_json::json!(5));
}

#[actix_web::test]
async fn unknown_package_and_empty_checkouts_are_rejected() {
    let db = prepare_db().await;
    let app = test_app!(db, MockGateway::new(), open_webhooks());

    let req = test::TestRequest::post()
        .uri("/orders")
        .set_json(serde_json::json!({ "userId": "bob", "items": [{ "code": "tote_bag", "qty": 1 }] }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/orders")
        .set_json(serde_json::json!({ "userId": "bob", "items": [] }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn capture_of_unknown_order_is_404() {
    let db = prepare_db().await;
    let app = test_app!(db, MockGateway::new(), open_webhooks());
    let res = test::call_service(&app, test::TestRequest::post().uri("/orders/EXT-NOPE/capture").to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn webhook_acknowledges_unknown_orders() {
    let db = prepare_db().await;
    let app = test_app!(db, MockGateway::new(), open_webhooks());

    let req = test::TestRequest::post()
        .uri("/webhooks/payment")
        .set_json(serde_json::json!({ "event_type": "PAYMENT.CAPTURE.COMPLETED", "resource": { "id": "EXT-NOPE" } }))
        .to_request();
    let res = test::call_service(&app, req).await;
    // The processor retries any non-2xx forever, so even an unknown order is acknowledged.
    assert_eq!(res.status(), StatusCode::OK);
    let body: JsonResponse = test::read_body_json(res).await;
    assert!(!body.success);
}

#[actix_web::test]
async fn webhook_captures_and_is_signature_checked() {
    let db = prepare_db().await;
    let gateway = MockGateway::new();
    let secret = "wh-secret";
    let webhook_cfg = WebhookConfig { hmac_secret: Secret::new(secret.to_string()), hmac_checks: true };
    let app = test_app!(db, gateway, webhook_cfg);

    let req = test::TestRequest::post()
        .uri("/orders")
        .set_json(serde_json::json!({ "userId": "carol", "items": [{ "code": "bundle_1b5p", "qty": 1 }] }))
        .to_request();
    let order: NewOrderResult = test::read_body_json(test::call_service(&app, req).await).await;

    let body = serde_json::json!({
        "event_type": "PAYMENT.CAPTURE.COMPLETED",
        "resource": { "id": order.external_order_id },
    })
    .to_string();

    // No signature: rejected before any state transition.
    let req = test::TestRequest::post()
        .uri("/webhooks/payment")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    // Wrong signature: same.
    let req = test::TestRequest::post()
        .uri("/webhooks/payment")
        .insert_header(("Content-Type", "application/json"))
        .insert_header(("X-Payment-Signature", calculate_hmac("not-the-secret", body.as_bytes())))
        .set_payload(body.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(gateway.captures(), 0);

    // Valid signature: the webhook trigger captures and grants, same as the direct path.
    let req = test::TestRequest::post()
        .uri("/webhooks/payment")
        .insert_header(("Content-Type", "application/json"))
        .insert_header(("X-Payment-Signature", calculate_hmac(secret, body.as_bytes())))
        .set_payload(body.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let ack: JsonResponse = test::read_body_json(res).await;
    assert!(ack.success);
    assert_eq!(gateway.captures(), 1);

    let req = test::TestRequest::get().uri("/entitlements").insert_header(("X-User-Id", "carol")).to_request();
    let record: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(record["product_slots"], serde_json::json!(5));
}

#[actix_web::test]
async fn users_only_see_their_own_orders() {
    let db = prepare_db().await;
    let app = test_app!(db, MockGateway::new(), open_webhooks());

    let req = test::TestRequest::post()
        .uri("/orders")
        .set_json(serde_json::json!({ "userId": "dave", "items": [{ "code": "bundle_1b5p", "qty": 1 }] }))
        .to_request();
    let order: NewOrderResult = test::read_body_json(test::call_service(&app, req).await).await;

    let uri = format!("/orders/{}", order.external_order_id);
    let req = test::TestRequest::get().uri(&uri).insert_header(("X-User-Id", "dave")).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri(&uri).insert_header(("X-User-Id", "mallory")).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
