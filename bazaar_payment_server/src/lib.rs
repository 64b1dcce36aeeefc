//! # Bazaar payment server
//! This module hosts the HTTP surface of the Bazaar order pipeline. It is responsible for:
//! Accepting checkout submissions and registering them with the payment processor.
//! Capturing payments from either trigger: the client's direct call or the processor's webhook.
//! Serving and adjusting the entitlements those payments grant.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /orders`: Create a new order and its external processor order.
//! * `POST /orders/{external_order_id}/capture`: The client-initiated capture trigger.
//! * `GET /orders`, `GET /orders/{external_order_id}`: Order views for the acting user.
//! * `POST /webhooks/payment`: The processor-initiated capture trigger (HMAC-verified).
//! * `GET /entitlements`, `POST /entitlements/adjust`: Entitlement views and slot accounting.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod webhook_routes;

#[cfg(test)]
mod endpoint_tests;
