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

/// Client Birdeye: token overview dạng phẳng, cần API key
pub struct BirdeyeClient {
    client: Client,
    base_url: String,
    chain: String,
    api_key: String,
    timeout: Duration,
}

impl BirdeyeClient {
    pub fn new(base_url: impl Into<String>, chain: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into(),
            chain: chain.into(),
            api_key: api_key.into(),
            timeout,
        })
    }
}

#[async_trait]
impl MarketDataProvider for BirdeyeClient {
    async fn fetch_token(&self, address: &str) -> Result<Option<RawMarketData>> {
        let mut url = endpoint(&self.base_url, "defi/token_overview")?;
        url.query_pairs_mut().append_pair("address", address);
        debug!(component = "birdeye", token = address, chain = %self.chain, "GET {}", url);

        let response = self
            .client
            .get(url)
            .header("X-API-KEY", &self.api_key)
            .header("x-chain", &self.chain)
            .timeout(self.timeout)
            .send()
            .await
            .context("Birdeye request failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: Value = response
            .error_for_status()
            .context("Birdeye returned an error status")?
            .json()
            .await
            .context("Birdeye response is not JSON")?;

        Ok(Some(RawMarketData::new(PayloadSchema::Birdeye, body)))
    }
}
