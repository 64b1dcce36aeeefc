use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayPalApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Credential exchange failed: {0}")]
    AuthenticationError(String),
}

impl PayPalApiError {
    /// Whether retrying the same call can ever succeed. Transport failures and processor 5xx
    /// responses are transient; 408 and 429 are throttling and also transient. Everything else
    /// in the 4xx range means the request itself is bad.
    pub fn is_transient(&self) -> bool {
        match self {
            PayPalApiError::RestResponseError(_) => true,
            PayPalApiError::QueryError { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            _ => false,
        }
    }
}
