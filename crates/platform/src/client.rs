use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use giftflow_catalog::{CatalogError, CatalogService, RawGiftOption};
use giftflow_core::AccountId;
use giftflow_infra::{Notifier, NotifyError};
use giftflow_purchasing::{PurchaseAck, PurchaseApiError, PurchaseRequest, PurchaseService};

use crate::wire::{
    CatalogResponse, GatewayErrorBody, NotificationBody, PurchaseBody, PurchaseResponse,
};

/// Gateway connection settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub token: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Error)]
pub enum GatewayBuildError {
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// HTTP client for the platform gateway.
///
/// Network and remote-side failures are classified transient everywhere; a
/// purchase rejection with a structured error body is classified declined.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayBuildError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl CatalogService for GatewayClient {
    async fn fetch_options(&self) -> Result<Vec<RawGiftOption>, CatalogError> {
        let response = self
            .http
            .get(self.url("/catalog/options"))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| CatalogError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::remote(
                status.as_u16() as i32,
                status.canonical_reason().unwrap_or("unknown"),
            ));
        }

        let body: CatalogResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::transport(format!("catalog body: {e}")))?;

        debug!(options = body.options.len(), "fetched catalog options");
        Ok(body.options)
    }
}

#[async_trait]
impl PurchaseService for GatewayClient {
    async fn submit(&self, request: PurchaseRequest) -> Result<PurchaseAck, PurchaseApiError> {
        let body = PurchaseBody {
            recipient: request.recipient,
            gift_id: request.gift_id,
            price: request.price,
        };

        let response = self
            .http
            .post(self.url("/purchases"))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PurchaseApiError::transient(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body: PurchaseResponse = response
                .json()
                .await
                .map_err(|e| PurchaseApiError::transient(format!("purchase body: {e}")))?;
            return Ok(PurchaseAck {
                payload: body.confirmation,
            });
        }

        // 4xx with a structured body is an explicit rejection; anything
        // else (5xx, unreadable body) is transient.
        if status.is_client_error() {
            if let Ok(err) = response.json::<GatewayErrorBody>().await {
                return Err(PurchaseApiError::declined(err.code, err.message));
            }
            return Err(PurchaseApiError::transient(format!(
                "unreadable rejection body (status {status})"
            )));
        }

        Err(PurchaseApiError::transient(format!(
            "gateway error (status {status})"
        )))
    }
}

#[async_trait]
impl Notifier for GatewayClient {
    async fn send(&self, recipient: AccountId, text: &str) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(self.url("/notifications"))
            .bearer_auth(&self.token)
            .json(&NotificationBody { recipient, text })
            .send()
            .await
            .map_err(|e| NotifyError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError(format!(
                "gateway refused notification (status {})",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client =
            GatewayClient::new(GatewayConfig::new("https://gw.example/", "token")).unwrap();
        assert_eq!(client.url("/purchases"), "https://gw.example/purchases");
    }
}
