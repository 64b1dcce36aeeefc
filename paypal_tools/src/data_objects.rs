use serde::{Deserialize, Serialize};

/// Bearer token response from the credential exchange endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Validity window in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Money {
    pub currency_code: String,
    /// Decimal string, e.g. "100.00"
    pub value: String,
}

/// The processor's record of a checkout order, as returned by order create.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorOrder {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Capture {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    pub amount: Option<Money>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Payments {
    #[serde(default)]
    pub captures: Vec<Capture>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseUnitResult {
    #[serde(default)]
    pub payments: Payments,
}

/// Response to a capture call. `status` is `COMPLETED` when the funds were taken.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureResponse {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub purchase_units: Vec<PurchaseUnitResult>,
}

impl CaptureResponse {
    pub fn is_completed(&self) -> bool {
        self.status == "COMPLETED"
    }

    /// The first capture amount reported by the processor, as a decimal string.
    pub fn captured_amount(&self) -> Option<&Money> {
        self.purchase_units.iter().flat_map(|pu| pu.payments.captures.iter()).find_map(|c| c.amount.as_ref())
    }
}
