use std::fmt::Display;

use bazaar_payment_engine::{
    db_types::{EntitlementField, OrderStatusType},
    order_objects::OrderItemRequest,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderRequest {
    pub user_id: String,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderResult {
    pub order_id: String,
    pub external_order_id: String,
}

/// Response to a direct capture call. `ok` is true unless the processor permanently rejected
/// the capture; repeat calls for a settled order come back `ok` with the terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureAck {
    pub ok: bool,
    pub status: OrderStatusType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustRequest {
    pub field: EntitlementField,
    pub delta: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustResult {
    pub new_value: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookResource {
    #[serde(default)]
    pub id: String,
}

/// The processor's webhook envelope. Only the event type and the referenced external order id
/// matter to the pipeline; everything else is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentWebhookEvent {
    pub event_type: String,
    #[serde(default)]
    pub resource: WebhookResource,
}
