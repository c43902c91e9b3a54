// Standard library imports
use std::time::Duration;

// Third party imports
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

// Internal imports
use super::{endpoint, http_client, RiskReportProvider};
use crate::types::{RiskFinding, RiskReport};

#[derive(Debug, Deserialize)]
struct ReportSummary {
    #[serde(default)]
    risks: Option<Vec<SummaryRisk>>,
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SummaryRisk {
    #[serde(default)]
    name: String,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Chuyển báo cáo tóm tắt của RugCheck về `RiskReport`
pub fn parse_summary(body: Value) -> Result<RiskReport> {
    let summary: ReportSummary = serde_json::from_value(body).context("Unexpected RugCheck report layout")?;

    let findings = summary
        .risks
        .unwrap_or_default()
        .into_iter()
        .filter(|risk| !risk.name.trim().is_empty())
        .map(|risk| RiskFinding {
            name: risk.name,
            level: risk.level,
            description: risk.description.filter(|d| !d.is_empty()),
        })
        .collect();

    Ok(RiskReport {
        findings,
        provider_score: summary.score,
    })
}

/// Client RugCheck: báo cáo rủi ro cho token Solana
pub struct RugCheckClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl RugCheckClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into(),
            timeout,
        })
    }
}

#[async_trait]
impl RiskReportProvider for RugCheckClient {
    async fn fetch_report(&self, address: &str) -> Result<Option<RiskReport>> {
        let url = endpoint(&self.base_url, &format!("v1/tokens/{}/report/summary", address))?;
        debug!(component = "rugcheck", token = address, "GET {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .context("RugCheck request failed")?;

        // RugCheck trả 400 cho địa chỉ chưa được index
        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST) {
            return Ok(None);
        }

        let body: Value = response
            .error_for_status()
            .context("RugCheck returned an error status")?
            .json()
            .await
            .context("RugCheck response is not JSON")?;

        parse_summary(body).map(Some)
    }
}
