use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use bazaar_payment_engine::traits::{CaptureResult, CaptureStatus, GatewayError, PaymentGateway};
use bzr_common::MinorUnits;

/// A well-behaved stand-in for the payment processor that counts capture calls.
#[derive(Clone)]
pub struct MockGateway {
    pub capture_calls: Arc<AtomicUsize>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self { capture_calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn captures(&self) -> usize {
        self.capture_calls.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for MockGateway {
    async fn create_external_order(&self, _amount: MinorUnits, _currency: &str) -> Result<String, GatewayError> {
        Ok(format!("EXT-{:08X}", rand::random::<u32>()))
    }

    async fn capture_external_order(&self, _external_order_id: &str) -> Result<CaptureResult, GatewayError> {
        self.capture_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CaptureResult { status: CaptureStatus::Completed, captured_amount: None })
    }
}
