use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use bazaar_payment_engine::{
    pricing::PricingError,
    traits::{EntitlementApiError, FulfillmentError},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("No acting user. Requests to this endpoint carry the X-User-Id header.")]
    MissingActingUser,
    #[error("Registration has closed for '{0}'.")]
    RegistrationClosed(String),
    #[error("There is no package with code '{0}' in the catalog.")]
    UnknownPackage(String),
    #[error("The payment processor could not complete the request. {0}")]
    GatewayUnavailable(String),
    #[error("Insufficient balance. {0}")]
    InsufficientBalance(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::MissingActingUser => StatusCode::BAD_REQUEST,
            Self::RegistrationClosed(_) => StatusCode::BAD_REQUEST,
            Self::UnknownPackage(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientBalance(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<FulfillmentError> for ServerError {
    fn from(e: FulfillmentError) -> Self {
        match e {
            FulfillmentError::PricingError(PricingError::UnknownPackage(code)) => Self::UnknownPackage(code),
            FulfillmentError::PricingError(PricingError::RegistrationClosed(code)) => Self::RegistrationClosed(code),
            FulfillmentError::EmptyOrder | FulfillmentError::InvalidQuantity(_) => {
                Self::InvalidRequestBody(e.to_string())
            },
            FulfillmentError::OrderNotFound(_) | FulfillmentError::ExternalOrderNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            FulfillmentError::GatewayError(g) => Self::GatewayUnavailable(g.to_string()),
            FulfillmentError::DatabaseError(_) | FulfillmentError::EntitlementError(_) => {
                Self::BackendError(e.to_string())
            },
        }
    }
}

impl From<EntitlementApiError> for ServerError {
    fn from(e: EntitlementApiError) -> Self {
        match e {
            EntitlementApiError::InsufficientBalance { .. } => Self::InsufficientBalance(e.to_string()),
            EntitlementApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}
