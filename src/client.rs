//! HTTP client for the Grateful payment API.
//!
//! Owns request/response shaping and transport error classification. Order
//! state is never mutated here; callers decide what a failure means for the
//! order.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

/// Timeout for payment creation. The shopper is watching a spinner on the
/// checkout page while this runs.
const CREATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for status fetches on the browser-return path. Shorter than
/// creation: the shopper is mid-redirect and a hung request blocks them.
const STATUS_TIMEOUT: Duration = Duration::from_secs(15);

/// Body for `POST /api/payments/new`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub fiat_amount: f64,
    pub fiat_currency: String,
    /// The order id as the processor knows it (stringified).
    pub external_reference_id: String,
    pub callback_url: String,
}

/// One remote payment attempt, tied to exactly one order.
///
/// The payment id is processor-assigned and may be absent in a degenerate
/// creation response; the redirect URL is mandatory.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    pub payment_id: Option<String>,
    pub external_reference_id: String,
    pub redirect_url: String,
    pub fiat_amount: f64,
    pub fiat_currency: String,
    pub callback_url: String,
}

/// Response of a synchronous status fetch. Consumed once per return-path
/// invocation.
#[derive(Debug, Clone)]
pub struct StatusQueryResult {
    pub status: String,
    /// Processor-specific fields we pass through without interpreting.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct NewPaymentResponse {
    id: Option<String>,
    url: Option<String>,
}

/// Remote client seam. The production implementation is [`GratefulClient`];
/// tests substitute a stub.
#[async_trait]
pub trait PaymentApi: Send + Sync {
    async fn create_payment(&self, request: &CreatePaymentRequest) -> Result<PaymentSession>;
    async fn fetch_payment_status(&self, payment_id: &str) -> Result<StatusQueryResult>;
}

#[derive(Debug, Clone)]
pub struct GratefulClient {
    http: Client,
    api_url: String,
    api_key: String,
}

impl GratefulClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Outbound calls require a configured API key; without one the call is
    /// not attempted at all.
    fn require_api_key(&self) -> Result<&str> {
        if self.api_key.is_empty() {
            return Err(GatewayError::Configuration(
                "Grateful API key is not set".into(),
            ));
        }
        Ok(&self.api_key)
    }
}

#[async_trait]
impl PaymentApi for GratefulClient {
    async fn create_payment(&self, request: &CreatePaymentRequest) -> Result<PaymentSession> {
        let api_key = self.require_api_key()?;

        let response = self
            .http
            .post(format!("{}/api/payments/new", self.api_url))
            .header("x-api-key", api_key)
            .timeout(CREATE_TIMEOUT)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Grateful payment creation failed: HTTP {} - {}", status, body);
            return Err(GatewayError::RemoteStatus(status));
        }

        let body: NewPaymentResponse = response.json().await.map_err(|e| {
            GatewayError::MalformedResponse(format!("payment creation response: {}", e))
        })?;

        let redirect_url = body.url.ok_or_else(|| {
            GatewayError::MalformedResponse(
                "missing \"url\" field in payment creation response".into(),
            )
        })?;

        Ok(PaymentSession {
            payment_id: body.id,
            external_reference_id: request.external_reference_id.clone(),
            redirect_url,
            fiat_amount: request.fiat_amount,
            fiat_currency: request.fiat_currency.clone(),
            callback_url: request.callback_url.clone(),
        })
    }

    async fn fetch_payment_status(&self, payment_id: &str) -> Result<StatusQueryResult> {
        let api_key = self.require_api_key()?;

        let response = self
            .http
            .get(format!("{}/api/payments/{}/status", self.api_url, payment_id))
            .header("x-api-key", api_key)
            .timeout(STATUS_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Grateful status fetch failed: HTTP {} - {}", status, body);
            return Err(GatewayError::RemoteStatus(status));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(format!("status response: {}", e)))?;

        let status = body
            .get("status")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                GatewayError::MalformedResponse("missing \"status\" field in status response".into())
            })?
            .to_string();

        let extra = match body {
            serde_json::Value::Object(mut map) => {
                map.remove("status");
                map
            }
            _ => serde_json::Map::new(),
        };

        Ok(StatusQueryResult { status, extra })
    }
}
