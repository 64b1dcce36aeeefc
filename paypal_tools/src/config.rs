use bzr_common::Secret;
use log::*;

#[derive(Debug, Clone, Default)]
pub struct PayPalConfig {
    /// Base URL of the processor REST API, e.g. "https://api-m.sandbox.paypal.com"
    pub api_base: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
}

impl PayPalConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_base = std::env::var("BZR_PAYPAL_API_BASE").unwrap_or_else(|_| {
            warn!("BZR_PAYPAL_API_BASE not set, using the sandbox endpoint as default");
            "https://api-m.sandbox.paypal.com".to_string()
        });
        let client_id = std::env::var("BZR_PAYPAL_CLIENT_ID").unwrap_or_else(|_| {
            warn!("BZR_PAYPAL_CLIENT_ID not set, using (probably useless) default");
            "client-id-not-set".to_string()
        });
        let client_secret = Secret::new(std::env::var("BZR_PAYPAL_CLIENT_SECRET").unwrap_or_else(|_| {
            warn!("BZR_PAYPAL_CLIENT_SECRET not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        Self { api_base, client_id, client_secret }
    }

    pub fn new(api_base: &str, client_id: &str, client_secret: Secret<String>) -> Self {
        Self { api_base: api_base.trim_end_matches('/').to_string(), client_id: client_id.to_string(), client_secret }
    }
}
