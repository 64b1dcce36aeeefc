use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType};

/// One requested line of a checkout, before pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub code: String,
    pub qty: i64,
}

/// What a capture attempt did. All three variants are successes from the caller's point of
/// view; only a transient gateway failure surfaces as an error.
#[derive(Debug, Clone)]
pub enum CaptureOutcome {
    /// This call won the transition: the payment was captured and the entitlements were granted.
    Captured(Order),
    /// The order had already reached a terminal state (earlier call, concurrent trigger, or a
    /// previous permanent failure). Nothing was changed.
    AlreadySettled(Order),
    /// The processor permanently rejected the capture and the order was marked failed.
    Failed(Order),
}

impl CaptureOutcome {
    pub fn order(&self) -> &Order {
        match self {
            CaptureOutcome::Captured(order) => order,
            CaptureOutcome::AlreadySettled(order) => order,
            CaptureOutcome::Failed(order) => order,
        }
    }

    pub fn status(&self) -> OrderStatusType {
        self.order().status
    }
}
