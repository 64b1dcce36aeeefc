use std::env;

use bzr_common::{parse_boolean_flag, Secret};
use chrono::FixedOffset;
use log::*;
use paypal_tools::PayPalConfig;

const DEFAULT_BZR_HOST: &str = "127.0.0.1";
const DEFAULT_BZR_PORT: u16 = 8460;
/// The storefront's market timezone (ICT). Date-tiered price boundaries are defined in it.
const DEFAULT_PRICING_UTC_OFFSET_HOURS: i32 = 7;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// UTC offset, in hours, of the timezone the pricing reference date is taken in.
    pub pricing_utc_offset_hours: i32,
    pub webhook: WebhookConfig,
    /// Payment processor credentials and endpoint.
    pub paypal: PayPalConfig,
}

#[derive(Clone, Debug, Default)]
pub struct WebhookConfig {
    /// Shared secret the processor signs webhook bodies with.
    pub hmac_secret: Secret<String>,
    /// If false, the webhook signature check is skipped. Development only.
    pub hmac_checks: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BZR_HOST.to_string(),
            port: DEFAULT_BZR_PORT,
            database_url: String::default(),
            pricing_utc_offset_hours: DEFAULT_PRICING_UTC_OFFSET_HOURS,
            webhook: WebhookConfig::default(),
            paypal: PayPalConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BZR_HOST").ok().unwrap_or_else(|| DEFAULT_BZR_HOST.into());
        let port = env::var("BZR_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for BZR_PORT. {e} Using the default, {DEFAULT_BZR_PORT}, instead."
                    );
                    DEFAULT_BZR_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_BZR_PORT);
        let database_url = env::var("BZR_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ BZR_DATABASE_URL is not set. Please set it to the URL for the Bazaar database.");
            String::default()
        });
        let pricing_utc_offset_hours = env::var("BZR_PRICING_UTC_OFFSET_HOURS")
            .map(|s| {
                s.parse::<i32>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid value for BZR_PRICING_UTC_OFFSET_HOURS. {e} Using the default, \
                         {DEFAULT_PRICING_UTC_OFFSET_HOURS}, instead."
                    );
                    DEFAULT_PRICING_UTC_OFFSET_HOURS
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PRICING_UTC_OFFSET_HOURS);
        let webhook = WebhookConfig::from_env_or_default();
        let paypal = PayPalConfig::new_from_env_or_default();
        Self { host, port, database_url, pricing_utc_offset_hours, webhook, paypal }
    }

    pub fn pricing_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.pricing_utc_offset_hours * 3600).unwrap_or_else(|| {
            error!(
                "🪛️ {} hours is not a valid UTC offset. Falling back to UTC for pricing dates.",
                self.pricing_utc_offset_hours
            );
            FixedOffset::east_opt(0).expect("UTC is a valid offset")
        })
    }
}

impl WebhookConfig {
    pub fn from_env_or_default() -> Self {
        let hmac_secret = env::var("BZR_WEBHOOK_HMAC_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ BZR_WEBHOOK_HMAC_SECRET is not set. Please set it to the signing secret of the processor webhook."
            );
            String::default()
        });
        let hmac_checks = parse_boolean_flag(env::var("BZR_WEBHOOK_HMAC_CHECKS").ok(), true);
        if !hmac_checks {
            warn!(
                "🪛️ Webhook HMAC checks are disabled. Anyone who can reach this server can mark orders as paid. Do \
                 not run this configuration in production."
            );
        }
        Self { hmac_secret: Secret::new(hmac_secret), hmac_checks }
    }
}
