//! Bazaar Payment Engine
//!
//! The engine behind the Bazaar storefront's checkout: it turns a priced checkout intent into a
//! captured payment and a durable grant of account entitlements (a brand page, product slots,
//! pop-up event access, extra pop-up slots). It is processor-agnostic and storage-agnostic.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend today.
//!    You should never need to access the database directly; use the public API instead. The
//!    exception is the data types used in the database, defined in the `db_types` module.
//! 2. The pure logic the pipeline is built from: date-tiered pricing ([`mod@pricing`]) and the
//!    entitlement accumulator ([`mod@entitlements`]).
//! 3. The engine public API ([`OrderFlowApi`], [`EntitlementApi`]). The order flow API is the
//!    capture coordinator: both capture triggers — the client's direct call and the processor's
//!    webhook — funnel into the same idempotent procedure, and entitlements are granted exactly
//!    once per order no matter how often or in what order the triggers fire.

mod bpe_api;
pub mod db_types;
pub mod entitlements;
pub mod pricing;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "test_utils")]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use bpe_api::{entitlement_api::EntitlementApi, order_flow_api::OrderFlowApi, order_objects};
