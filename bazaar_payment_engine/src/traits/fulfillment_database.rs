use thiserror::Error;

use crate::{
    db_types::{CatalogPackage, EntitlementDelta, EntitlementField, EntitlementRecord, NewOrder, Order, OrderId},
    pricing::PricingError,
    traits::GatewayError,
};

/// This trait defines the storage behaviour backing the order capture and entitlement pipeline.
///
/// The two mutating hot paths — settling an order and adjusting an entitlement counter — are
/// specified as *conditional* store operations. All mutual exclusion between concurrent capture
/// triggers and concurrent adjustments lives in these conditions; the engine holds no locks of
/// its own.
#[allow(async_fn_in_trait)]
pub trait FulfillmentDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Fetches the catalog package with the given code. Packages are operator configuration and
    /// read-only to the pipeline.
    async fn fetch_package(&self, code: &str) -> Result<Option<CatalogPackage>, FulfillmentError>;

    /// Creates or replaces a catalog package. Operator tooling only; the order flow never calls
    /// this.
    async fn upsert_package(&self, package: CatalogPackage) -> Result<(), FulfillmentError>;

    /// Persists a brand-new order with `Created` status. Called only after the processor has
    /// acknowledged the checkout, so a gateway failure leaves no row behind.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, FulfillmentError>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, FulfillmentError>;

    async fn fetch_order_by_external_id(&self, external_order_id: &str) -> Result<Option<Order>, FulfillmentError>;

    /// All orders ever placed by the user, most recent first.
    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, FulfillmentError>;

    /// In a single atomic transaction: transitions the order from `Created` to `Captured` —
    /// conditional on it still being `Created` — and applies the entitlement delta to the
    /// order's user.
    ///
    /// Returns the settled order if this caller won the transition, or `None` if the order had
    /// already left `Created` (a concurrent trigger won, or the order had failed). Exactly one
    /// caller ever gets `Some` for a given order, and the entitlement grant commits with the
    /// status flip or not at all.
    async fn try_settle_order(
        &self,
        order_id: &OrderId,
        delta: &EntitlementDelta,
    ) -> Result<Option<Order>, FulfillmentError>;

    /// Transitions the order from `Created` to `Failed`, conditional on it still being
    /// `Created`. Returns `None` if the order had already left `Created`.
    async fn mark_order_failed(&self, order_id: &OrderId) -> Result<Option<Order>, FulfillmentError>;

    /// The user's entitlement record, or the all-zero record if nothing was ever granted.
    async fn fetch_entitlements(&self, user_id: &str) -> Result<EntitlementRecord, EntitlementApiError>;

    /// Atomically adds `delta` to one entitlement counter and returns the new value.
    ///
    /// The bound check and the write are one conditional store operation, never a read-then-
    /// write: a decrement that would take the counter below zero fails with
    /// [`EntitlementApiError::InsufficientBalance`] and changes nothing. Increments create the
    /// record if the user has none yet.
    async fn adjust_entitlement(
        &self,
        user_id: &str,
        field: EntitlementField,
        delta: i64,
    ) -> Result<i64, EntitlementApiError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), FulfillmentError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum FulfillmentError {
    #[error("We have an internal database engine problem (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("No order is linked to external order id {0}")]
    ExternalOrderNotFound(String),
    #[error("Cannot create an order with no line items")]
    EmptyOrder,
    #[error("Line item quantities must be positive. Got {0}")]
    InvalidQuantity(i64),
    #[error("{0}")]
    PricingError(#[from] PricingError),
    #[error("{0}")]
    GatewayError(#[from] GatewayError),
    #[error("{0}")]
    EntitlementError(#[from] EntitlementApiError),
}

impl From<sqlx::Error> for FulfillmentError {
    fn from(e: sqlx::Error) -> Self {
        FulfillmentError::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum EntitlementApiError {
    #[error("We have an internal database engine problem (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("Insufficient balance on {field}: cannot apply {delta}")]
    InsufficientBalance { field: EntitlementField, delta: i64 },
}

impl From<sqlx::Error> for EntitlementApiError {
    fn from(e: sqlx::Error) -> Self {
        EntitlementApiError::DatabaseError(e.to_string())
    }
}
