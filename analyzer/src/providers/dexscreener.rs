// Standard library imports
use std::time::Duration;

// Third party imports
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

// Internal imports
use super::{endpoint, http_client, MarketDataProvider};
use crate::normalizer::{PayloadSchema, RawMarketData};

/// Client DexScreener: danh sách pair theo địa chỉ token
pub struct DexScreenerClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl DexScreenerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into(),
            timeout,
        })
    }
}

#[async_trait]
impl MarketDataProvider for DexScreenerClient {
    async fn fetch_token(&self, address: &str) -> Result<Option<RawMarketData>> {
        let url = endpoint(&self.base_url, &format!("latest/dex/tokens/{}", address))?;
        debug!(component = "dexscreener", token = address, "GET {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .context("DexScreener request failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: Value = response
            .error_for_status()
            .context("DexScreener returned an error status")?
            .json()
            .await
            .context("DexScreener response is not JSON")?;

        // "pairs": null nghĩa là token không tồn tại; normalizer xử lý
        Ok(Some(RawMarketData::new(PayloadSchema::DexScreener, body)))
    }
}
