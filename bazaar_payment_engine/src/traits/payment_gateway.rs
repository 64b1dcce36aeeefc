use bzr_common::MinorUnits;
use thiserror::Error;

/// How a processor failure should be handled by the order flow. `Transient` failures leave the
/// order retryable; `Permanent` failures are terminal for the checkout. Both carry the
/// processor's raw error payload for diagnostics.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Transient processor failure. {0}")]
    Transient(String),
    #[error("Processor rejected the request. {0}")]
    Permanent(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// The funds were taken.
    Completed,
    /// The processor accepted the call but has not finalised the payment yet.
    Pending,
}

#[derive(Debug, Clone)]
pub struct CaptureResult {
    pub status: CaptureStatus,
    pub captured_amount: Option<MinorUnits>,
}

/// The payment processor, as seen by the order flow. Implementations wrap the processor's REST
/// API and classify failures; they never retry on their own.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Clone {
    /// Registers a checkout with the processor for the given amount, returning the external
    /// order id the buyer approves against.
    async fn create_external_order(&self, amount: MinorUnits, currency: &str) -> Result<String, GatewayError>;

    /// Finalises a previously approved checkout and takes the funds.
    async fn capture_external_order(&self, external_order_id: &str) -> Result<CaptureResult, GatewayError>;
}
