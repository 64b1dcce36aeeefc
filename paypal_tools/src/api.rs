use std::sync::{Arc, Mutex};

use bzr_common::MinorUnits;
use chrono::{DateTime, Duration, Utc};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
    Response,
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{config::PayPalConfig, data_objects::AccessTokenResponse, CaptureResponse, PayPalApiError, ProcessorOrder};

/// Refresh the cached bearer token this long before the processor says it expires.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PayPalApi {
    config: PayPalConfig,
    client: Arc<Client>,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl PayPalApi {
    pub fn new(config: PayPalConfig) -> Result<Self, PayPalApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| PayPalApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), token: Arc::new(Mutex::new(None)) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base)
    }

    fn cached_token(&self) -> Option<String> {
        let guard = self.token.lock().ok()?;
        guard.as_ref().filter(|t| t.expires_at > Utc::now()).map(|t| t.token.clone())
    }

    fn store_token(&self, token: &AccessTokenResponse) {
        let ttl = (token.expires_in - TOKEN_EXPIRY_MARGIN_SECS).max(0);
        let cached = CachedToken { token: token.access_token.clone(), expires_at: Utc::now() + Duration::seconds(ttl) };
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(cached);
        }
    }

    fn invalidate_token(&self) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
    }

    /// Returns a valid bearer token, exchanging the client credentials for a fresh one when the
    /// cached token is missing or inside its expiry margin.
    async fn access_token(&self) -> Result<String, PayPalApiError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }
        trace!("💳️ No valid cached token. Exchanging client credentials for a new bearer token");
        let response = self
            .client
            .post(self.url("/v1/oauth2/token"))
            .basic_auth(&self.config.client_id, Some(self.config.client_secret.reveal()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PayPalApiError::AuthenticationError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PayPalApiError::RestResponseError(e.to_string()))?;
            return Err(PayPalApiError::AuthenticationError(format!("Status {status}. {message}")));
        }
        let token =
            response.json::<AccessTokenResponse>().await.map_err(|e| PayPalApiError::JsonError(e.to_string()))?;
        debug!("💳️ Received {} token, valid for {}s", token.token_type, token.expires_in);
        self.store_token(&token);
        Ok(token.access_token)
    }

    async fn send_raw<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: &str,
    ) -> Result<Response, PayPalApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }
        req.send().await.map_err(|e| PayPalApiError::RestResponseError(e.to_string()))
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, PayPalApiError> {
        let token = self.access_token().await?;
        let mut response = self.send_raw(method.clone(), path, body, &token).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            // The processor revoked the token early. Re-authenticate once and replay the call.
            debug!("💳️ Processor rejected the bearer token. Refreshing and retrying once");
            self.invalidate_token();
            let token = self.access_token().await?;
            response = self.send_raw(method, path, body, &token).await?;
        }
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| PayPalApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PayPalApiError::RestResponseError(e.to_string()))?;
            Err(PayPalApiError::QueryError { status, message })
        }
    }

    /// Creates a processor order for the given amount. The returned id is the external order id
    /// the buyer approves against and the merchant later captures.
    pub async fn create_order(&self, amount: MinorUnits, currency: &str) -> Result<ProcessorOrder, PayPalApiError> {
        let body = serde_json::json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": { "currency_code": currency, "value": amount.to_processor_string() },
            }],
        });
        debug!("💳️ Creating processor order for {amount}");
        let order = self.rest_query::<ProcessorOrder, Value>(Method::POST, "/v2/checkout/orders", Some(&body)).await?;
        info!("💳️ Created processor order {} ({})", order.id, order.status);
        Ok(order)
    }

    /// Captures a previously approved processor order, finalising the payment.
    pub async fn capture_order(&self, external_order_id: &str) -> Result<CaptureResponse, PayPalApiError> {
        let path = format!("/v2/checkout/orders/{external_order_id}/capture");
        debug!("💳️ Capturing processor order {external_order_id}");
        let body = serde_json::json!({});
        let result = self.rest_query::<CaptureResponse, Value>(Method::POST, &path, Some(&body)).await?;
        info!("💳️ Capture of {} returned status {}", result.id, result.status);
        Ok(result)
    }
}
