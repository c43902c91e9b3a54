//! Collaborators bên ngoài của pipeline
//!
//! Lõi chấm điểm chỉ biết tới ba trait dưới đây; client HTTP cụ thể được
//! inject qua `Arc<dyn Trait>`.

// Standard library imports
use std::time::Duration;

// Third party imports
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

// Internal imports
use crate::normalizer::RawMarketData;
use crate::types::RiskReport;

pub mod birdeye;
pub mod dexscreener;
pub mod gemini;
pub mod rugcheck;

pub use birdeye::BirdeyeClient;
pub use dexscreener::DexScreenerClient;
pub use gemini::GeminiClient;
pub use rugcheck::RugCheckClient;

/// Nguồn dữ liệu thị trường của token
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// `Ok(None)` khi nhà cung cấp không có bản ghi nào cho token
    async fn fetch_token(&self, address: &str) -> Result<Option<RawMarketData>>;
}

/// Nguồn báo cáo rủi ro bảo mật
#[async_trait]
pub trait RiskReportProvider: Send + Sync {
    /// `Ok(None)` khi chưa có báo cáo cho token
    async fn fetch_report(&self, address: &str) -> Result<Option<RiskReport>>;
}

/// Mô hình ngôn ngữ trả lời prompt bằng văn bản
#[async_trait]
pub trait ReasoningModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Ghép base URL với path, chấp nhận base có hoặc không có `/` ở cuối
pub(crate) fn endpoint(base_url: &str, path: &str) -> Result<Url> {
    let raw = format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'));
    Url::parse(&raw).with_context(|| format!("Invalid provider URL: {}", raw))
}

/// Client HTTP dùng chung cho một nhà cung cấp
pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("tokenscan/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

#[cfg(test)]
pub(crate) mod mocks {
    use super::*;
    use mockall::mock;

    mock! {
        pub Market {}
        #[async_trait]
        impl MarketDataProvider for Market {
            async fn fetch_token(&self, address: &str) -> Result<Option<RawMarketData>>;
        }
    }

    mock! {
        pub Risk {}
        #[async_trait]
        impl RiskReportProvider for Risk {
            async fn fetch_report(&self, address: &str) -> Result<Option<RiskReport>>;
        }
    }

    mock! {
        pub Reasoning {}
        #[async_trait]
        impl ReasoningModel for Reasoning {
            async fn complete(&self, prompt: &str) -> Result<String>;
        }
    }
}

/// Module tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_slashes() {
        let url = endpoint("https://api.example.com/", "/v1/tokens/abc").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/tokens/abc");

        let url = endpoint("https://api.example.com", "latest/dex/tokens/abc").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/latest/dex/tokens/abc");
    }

    #[test]
    fn test_http_client_builds() {
        assert!(http_client(Duration::from_millis(500)).is_ok());
    }

    #[test]
    fn test_endpoint_rejects_garbage() {
        assert!(endpoint("not a url", "x").is_err());
    }
}
