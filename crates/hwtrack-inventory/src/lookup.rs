use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::error::InventoryError;

/// Live inventory figures for one product, extracted from the storefront
/// inventory endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryCounts {
    /// Total inventory allocated to the drop.
    pub max_qty: i64,
    /// Currently available quantity. May be negative when oversold; the
    /// reconciliation layer clamps it.
    pub current_qty: i64,
}

/// Response envelope of `GET /api/product/{uid}/inventory`.
#[derive(Debug, Deserialize)]
struct InventoryResponse {
    inventory: InventoryLevel,
}

#[derive(Debug, Deserialize)]
struct InventoryLevel {
    maximum: i64,
    available: i64,
}

/// HTTP client for the authenticated storefront inventory endpoint.
///
/// Every call carries a bearer token captured out-of-band; a 401-class
/// response surfaces as [`InventoryError::AuthExpired`] so the caller can
/// refresh the credential and retry once.
pub struct InventoryClient {
    client: Client,
    base_url: Url,
}

impl InventoryClient {
    /// Creates a client for the storefront API root. Tests point
    /// `base_url` at a wiremock server.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`InventoryError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, InventoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|e| InventoryError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self { client, base_url })
    }

    /// Fetches `(max_qty, current_qty)` for a product by its opaque `uid`.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::AuthExpired`] — HTTP 401/403; the token is no
    ///   longer accepted.
    /// - [`InventoryError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`InventoryError::Http`] — network or TLS failure, including
    ///   timeouts.
    /// - [`InventoryError::Deserialize`] — response body does not match
    ///   the expected envelope.
    pub async fn lookup(
        &self,
        token: &str,
        uid: &str,
    ) -> Result<InventoryCounts, InventoryError> {
        // base_url always ends in "/", so join cannot fail here.
        let url = self
            .base_url
            .join(&format!("api/product/{uid}/inventory"))
            .unwrap_or_else(|_| self.base_url.clone());

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(InventoryError::AuthExpired {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(InventoryError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<InventoryResponse>(&body).map_err(|e| {
            InventoryError::Deserialize {
                context: format!("inventory for uid {uid}"),
                source: e,
            }
        })?;

        Ok(InventoryCounts {
            max_qty: parsed.inventory.maximum,
            current_qty: parsed.inventory.available,
        })
    }
}
