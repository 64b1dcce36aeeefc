//! The seams of the engine: the persistent store behind the order pipeline and the payment
//! processor it talks to. Backends (SQLite today, Postgres-shaped tomorrow) implement
//! [`FulfillmentDatabase`]; processor clients implement [`PaymentGateway`].

mod fulfillment_database;
mod payment_gateway;

pub use fulfillment_database::{EntitlementApiError, FulfillmentDatabase, FulfillmentError};
pub use payment_gateway::{CaptureResult, CaptureStatus, GatewayError, PaymentGateway};
