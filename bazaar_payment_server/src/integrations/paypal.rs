//! Glue between the engine's [`PaymentGateway`] seam and the processor client.
//!
//! The client reports raw API failures; this layer classifies them into the transient/permanent
//! split the capture coordinator acts on, and maps the processor's response shapes onto the
//! engine's capture result.

use bazaar_payment_engine::traits::{CaptureResult, CaptureStatus, GatewayError, PaymentGateway};
use bzr_common::MinorUnits;
use paypal_tools::{helpers::parse_processor_price, PayPalApi, PayPalApiError};

#[derive(Clone)]
pub struct PayPalGateway {
    api: PayPalApi,
}

impl PayPalGateway {
    pub fn new(api: PayPalApi) -> Self {
        Self { api }
    }
}

fn classify(e: PayPalApiError) -> GatewayError {
    if e.is_transient() {
        GatewayError::Transient(e.to_string())
    } else {
        GatewayError::Permanent(e.to_string())
    }
}

impl PaymentGateway for PayPalGateway {
    async fn create_external_order(&self, amount: MinorUnits, currency: &str) -> Result<String, GatewayError> {
        let order = self.api.create_order(amount, currency).await.map_err(classify)?;
        Ok(order.id)
    }

    async fn capture_external_order(&self, external_order_id: &str) -> Result<CaptureResult, GatewayError> {
        let response = self.api.capture_order(external_order_id).await.map_err(classify)?;
        let status = if response.is_completed() { CaptureStatus::Completed } else { CaptureStatus::Pending };
        let captured_amount = response.captured_amount().and_then(|m| parse_processor_price(&m.value).ok());
        Ok(CaptureResult { status, captured_amount })
    }
}

#[cfg(test)]
mod test {
    use bazaar_payment_engine::traits::GatewayError;
    use paypal_tools::PayPalApiError;

    use super::classify;

    #[test]
    fn processor_5xx_is_transient() {
        let e = PayPalApiError::QueryError { status: 503, message: "upstream".into() };
        assert!(matches!(classify(e), GatewayError::Transient(_)));
    }

    #[test]
    fn throttling_is_transient() {
        let e = PayPalApiError::QueryError { status: 429, message: "slow down".into() };
        assert!(matches!(classify(e), GatewayError::Transient(_)));
    }

    #[test]
    fn processor_4xx_is_permanent() {
        let e = PayPalApiError::QueryError { status: 422, message: "ORDER_NOT_APPROVED".into() };
        assert!(matches!(classify(e), GatewayError::Permanent(_)));
    }

    #[test]
    fn transport_failures_are_transient() {
        let e = PayPalApiError::RestResponseError("connection reset".into());
        assert!(matches!(classify(e), GatewayError::Transient(_)));
    }
}
