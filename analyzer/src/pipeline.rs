//! Pipeline Orchestrator
//!
//! Normalizer -> Security/Activity/Trend -> Hype -> Aggregator, tuần tự trong
//! một request, không retry. Nguồn phụ (risk report, reasoning model) lỗi
//! thì hạ cấp điểm tương ứng; chỉ thiếu dữ liệu thị trường mới làm dừng
//! phân tích.

// Standard library imports
use std::sync::Arc;

// Third party imports
use futures::future::join_all;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

// Internal imports
use crate::activity::{evaluate_activity, evaluate_trend};
use crate::config::{AppConfig, MarketSource, ScoringPolicy, TimeoutConfig};
use crate::hype::HypeAssessor;
use crate::normalizer::normalize;
use crate::providers::{
    BirdeyeClient, DexScreenerClient, GeminiClient, MarketDataProvider, ReasoningModel, RiskReportProvider,
    RugCheckClient,
};
use crate::security::evaluate_security;
use crate::types::{AnalysisResult, RiskReport, Signal, SubscoreSet, TokenAnalysis, TokenSnapshot};
use crate::verdict::aggregate;
use tokenscan_common::{format_address, AnalysisError, AnalysisResultOf};

/// Ghi lại tín hiệu bị hạ cấp vào log và notes
fn note_fallback<T>(notes: &mut Vec<String>, component: &'static str, signal: &Signal<T>) {
    if let Some(reason) = signal.fallback_reason() {
        warn!(component = component, "Tín hiệu bị hạ cấp: {}", reason);
        notes.push(format!("{}: {}", component, reason));
    }
}

/// Bộ phân tích token
///
/// Không giữ trạng thái giữa các request; có thể dùng chung giữa nhiều task.
pub struct Analyzer {
    market: Arc<dyn MarketDataProvider>,
    risk: Arc<dyn RiskReportProvider>,
    hype: HypeAssessor,
    policy: ScoringPolicy,
    timeouts: TimeoutConfig,
}

impl Analyzer {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        risk: Arc<dyn RiskReportProvider>,
        reasoning: Arc<dyn ReasoningModel>,
        policy: ScoringPolicy,
        timeouts: TimeoutConfig,
    ) -> Self {
        Self {
            market,
            risk,
            hype: HypeAssessor::new(reasoning, timeouts.reasoning()),
            policy,
            timeouts,
        }
    }

    /// Dựng analyzer với các client HTTP theo cấu hình
    pub fn from_config(config: &AppConfig) -> AnalysisResultOf<Self> {
        config.validate()?;
        let providers = &config.providers;
        let timeouts = &config.timeouts;

        let client_error = |e: anyhow::Error| AnalysisError::Config(format!("{:#}", e));

        let market: Arc<dyn MarketDataProvider> = match providers.market_source {
            MarketSource::DexScreener => Arc::new(
                DexScreenerClient::new(&providers.dexscreener_url, timeouts.market()).map_err(client_error)?,
            ),
            MarketSource::Birdeye => {
                let api_key = providers
                    .birdeye_api_key
                    .clone()
                    .ok_or_else(|| AnalysisError::Config("birdeye market source requires BIRDEYE_API_KEY".to_string()))?;
                Arc::new(
                    BirdeyeClient::new(&providers.birdeye_url, &providers.birdeye_chain, api_key, timeouts.market())
                        .map_err(client_error)?,
                )
            }
        };
        let risk = Arc::new(RugCheckClient::new(&providers.rugcheck_url, timeouts.risk()).map_err(client_error)?);
        let reasoning = Arc::new(
            GeminiClient::new(
                &providers.gemini_url,
                &providers.gemini_model,
                providers.gemini_api_key.clone(),
                timeouts.reasoning(),
            )
            .map_err(client_error)?,
        );

        Ok(Self::new(market, risk, reasoning, config.scoring.clone(), timeouts.clone()))
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Phân tích một token
    pub async fn analyze(&self, token_address: &str) -> AnalysisResultOf<AnalysisResult> {
        let address = token_address.trim();
        if address.is_empty() {
            return Err(AnalysisError::InvalidAddress(token_address.to_string()));
        }

        let request_id = Uuid::new_v4();
        let span = info_span!("analyze", token = %address, request_id = %request_id);
        self.run(address).instrument(span).await
    }

    /// Phân tích nhiều token đồng thời, mỗi token một kết quả theo đúng thứ tự
    pub async fn analyze_many(&self, token_addresses: &[String]) -> Vec<TokenAnalysis> {
        join_all(token_addresses.iter().map(|address| async move {
            TokenAnalysis::from_outcome(address, self.analyze(address).await)
        }))
        .await
    }

    async fn run(&self, address: &str) -> AnalysisResultOf<AnalysisResult> {
        info!("Bắt đầu phân tích token {}", format_address(address));

        let snapshot = self.fetch_snapshot(address).await?;
        let mut notes = Vec::new();

        let report = self.fetch_report(address).await;
        let security = evaluate_security(report.as_ref(), &self.policy);
        note_fallback(&mut notes, "security", &security);

        let activity = evaluate_activity(&snapshot, &self.policy);
        note_fallback(&mut notes, "activity", &activity);

        let trend = evaluate_trend(&snapshot, &self.policy);
        note_fallback(&mut notes, "trend", &trend);

        let partial = SubscoreSet {
            security: *security.value(),
            activity: *activity.value(),
            trend: *trend.value(),
            hype: 0,
        };
        let hype = self.hype.assess(&snapshot, &partial, &self.policy).await;
        note_fallback(&mut notes, "hype", &hype);
        let hype = hype.into_value();

        let outcome = aggregate(partial.security, partial.activity, partial.trend, &hype, &self.policy);
        info!(
            total = outcome.total_score,
            security = outcome.subscores.security,
            activity = outcome.subscores.activity,
            trend = outcome.subscores.trend,
            hype = outcome.subscores.hype,
            "{} {}: {}",
            outcome.verdict.to_emoji(),
            snapshot.display_name(),
            outcome.verdict
        );

        Ok(AnalysisResult {
            token_address: address.to_string(),
            snapshot,
            subscores: outcome.subscores,
            hype,
            total_score: outcome.total_score,
            verdict: outcome.verdict,
            notes,
        })
    }

    async fn fetch_snapshot(&self, address: &str) -> AnalysisResultOf<TokenSnapshot> {
        let market_error = |reason: String| AnalysisError::MarketData {
            token: address.to_string(),
            reason,
        };

        let raw = match tokio::time::timeout(self.timeouts.market(), self.market.fetch_token(address)).await {
            Ok(Ok(Some(raw))) => raw,
            Ok(Ok(None)) => return Err(AnalysisError::TokenNotFound(address.to_string())),
            Ok(Err(e)) => {
                warn!(component = "market", "Lỗi khi lấy dữ liệu thị trường: {:#}", e);
                return Err(market_error(format!("{:#}", e)));
            }
            Err(_) => {
                warn!(component = "market", "Timeout khi lấy dữ liệu thị trường");
                return Err(market_error(format!("timed out after {}ms", self.timeouts.market_ms)));
            }
        };

        normalize(address, &raw).ok_or_else(|| AnalysisError::TokenNotFound(address.to_string()))
    }

    /// None khi không lấy được report vì bất kỳ lý do gì
    async fn fetch_report(&self, address: &str) -> Option<RiskReport> {
        match tokio::time::timeout(self.timeouts.risk(), self.risk.fetch_report(address)).await {
            Ok(Ok(Some(report))) => {
                debug!(component = "risk", findings = report.findings.len(), "Đã nhận risk report");
                Some(report)
            }
            Ok(Ok(None)) => {
                debug!(component = "risk", "Chưa có risk report cho token");
                None
            }
            Ok(Err(e)) => {
                warn!(component = "risk", "Lỗi khi lấy risk report: {:#}", e);
                None
            }
            Err(_) => {
                warn!(component = "risk", "Timeout khi lấy risk report sau {}ms", self.timeouts.risk_ms);
                None
            }
        }
    }
}
