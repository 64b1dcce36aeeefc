//----------------------------------------------   Payment webhook  ----------------------------------------------------

use actix_web::{web, HttpRequest, HttpResponse};
use bazaar_payment_engine::{
    order_objects::CaptureOutcome,
    traits::{FulfillmentDatabase, FulfillmentError, PaymentGateway},
    OrderFlowApi,
};
use log::{debug, info, trace, warn};

use crate::{
    data_objects::{JsonResponse, PaymentWebhookEvent},
    route,
};

route!(payment_webhook => Post "/payment" impl FulfillmentDatabase, PaymentGateway);
/// Route handler for the processor-initiated capture trigger.
///
/// Deliveries can arrive zero, one or many times, in any order relative to the direct capture
/// call; they re-enter the same coordinator, so the outcome is the same either way. The HMAC
/// middleware wrapping this route has already verified the delivery's signature by the time the
/// handler runs.
pub async fn payment_webhook<B, G>(
    req: HttpRequest,
    body: web::Json<PaymentWebhookEvent>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> HttpResponse
where
    B: FulfillmentDatabase,
    G: PaymentGateway,
{
    trace!("🧾️ Received payment webhook request: {}", req.uri());
    let event = body.into_inner();
    // Webhook responses must always be in the 200 range, otherwise the processor will retry the
    // delivery indefinitely.
    let result = match event.event_type.as_str() {
        "PAYMENT.ORDER.APPROVED" | "PAYMENT.CAPTURE.COMPLETED" => {
            handle_capture_event(&event.resource.id, api.as_ref()).await
        },
        other => {
            debug!("🧾️ Ignoring webhook event type {other}");
            JsonResponse::success("Event ignored.")
        },
    };
    HttpResponse::Ok().json(result)
}

async fn handle_capture_event<B, G>(external_order_id: &str, api: &OrderFlowApi<B, G>) -> JsonResponse
where
    B: FulfillmentDatabase,
    G: PaymentGateway,
{
    if external_order_id.is_empty() {
        warn!("🧾️ Webhook event carried no order id");
        return JsonResponse::failure("Event carried no order id.");
    }
    match api.capture_order_by_external_id(external_order_id).await {
        Ok(CaptureOutcome::Captured(order)) => {
            info!("🧾️ Order {} captured via webhook. Entitlements granted to user {}", order.order_id, order.user_id);
            JsonResponse::success("Order captured.")
        },
        Ok(CaptureOutcome::AlreadySettled(order)) => {
            info!("🧾️ Webhook for order {} which is already {}. Acknowledging.", order.order_id, order.status);
            JsonResponse::success("Order already settled.")
        },
        Ok(CaptureOutcome::Failed(order)) => {
            warn!("🧾️ Processor permanently rejected the capture of order {}", order.order_id);
            JsonResponse::failure("Capture failed permanently.")
        },
        Err(FulfillmentError::ExternalOrderNotFound(id)) => {
            warn!("🧾️ Webhook for unknown external order [{id}]. Acknowledging so the processor stops retrying.");
            JsonResponse::failure("Order unknown.")
        },
        Err(e) => {
            warn!("🧾️ Could not process webhook capture. The next delivery will retry. {e}");
            JsonResponse::failure("Unexpected error handling event.")
        },
    }
}
