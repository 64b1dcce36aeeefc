//! Thin async client for the payment processor's checkout API.
//!
//! The processor exposes a two-step checkout: an order is created for an amount, the buyer
//! approves it out-of-band, and the merchant captures it. All calls are authenticated with a
//! short-lived bearer token obtained by exchanging the long-lived client credentials; the token
//! is cached for its validity window and refreshed when the processor rejects it.
//!
//! Retry policy deliberately lives with the caller. The client reports every non-2xx response as
//! a [`PayPalApiError::QueryError`] carrying the processor's raw payload, and
//! [`PayPalApiError::is_transient`] tells the caller whether a retry can ever succeed.

mod api;
mod config;
pub mod data_objects;
mod error;
pub mod helpers;

pub use api::PayPalApi;
pub use config::PayPalConfig;
pub use data_objects::{CaptureResponse, ProcessorOrder};
pub use error::PayPalApiError;
