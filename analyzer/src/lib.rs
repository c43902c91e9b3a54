//! Tokenscan
//!
//! Chấm điểm tin cậy/rủi ro cho token crypto: chuẩn hóa dữ liệu thị trường,
//! tính bốn điểm thành phần (security, activity, trend, hype) và đưa ra
//! verdict cuối cùng.

pub mod activity;
pub mod config;
pub mod hype;
pub mod normalizer;
pub mod pipeline;
pub mod providers;
pub mod security;
pub mod types;
pub mod verdict;

// Re-exports
pub use config::{AppConfig, MarketSource, ScoringPolicy, TimeoutConfig};
pub use normalizer::{normalize, PayloadSchema, RawMarketData};
pub use pipeline::Analyzer;
pub use providers::{MarketDataProvider, ReasoningModel, RiskReportProvider};
pub use types::{
    AnalysisResult, HypeAssessment, RiskFinding, RiskReport, Signal, SubscoreSet, TokenAnalysis, TokenSnapshot,
    Verdict,
};
pub use tokenscan_common::{AnalysisError, AnalysisResultOf};
