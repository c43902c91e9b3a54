// Standard library imports
use std::env;
use std::time::Duration;

// Third party imports
use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use dotenv::dotenv;
use serde::{Deserialize, Serialize};

// Internal imports
use tokenscan_common::{AnalysisError, LogConfig, DEFAULT_MAX_TOKENS};

/// File cấu hình mặc định (không bắt buộc)
pub const DEFAULT_CONFIG_FILE: &str = "tokenscan";
/// Tiền tố biến môi trường, ví dụ `TOKENSCAN__TIMEOUTS__RISK_MS=5000`
pub const ENV_PREFIX: &str = "TOKENSCAN";

/// Các hằng số chấm điểm
///
/// Các giá trị được tinh chỉnh theo kinh nghiệm nên để cấu hình được; chỉ
/// ràng buộc cứng là tổng các cap bằng 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub security_cap: u32,
    pub mutable_metadata_penalty: u32,
    pub mint_authority_penalty: u32,
    pub holder_concentration_penalty: u32,

    pub activity_cap: u32,
    pub volume_spike_credit: u32,
    pub buy_pressure_credit: u32,
    /// Tốc độ volume 1h so với trung bình giờ của 24h
    pub spike_hourly_multiple: f64,
    /// Tỉ lệ volume 24h / market cap khi không có volume 1h
    pub turnover_ratio: f64,

    pub trend_cap: u32,
    pub trend_credit: u32,
    /// Ngưỡng sập giá (%) của khung ngắn
    pub crash_threshold_pct: f64,

    pub hype_cap: u32,
    pub hype_weight: f64,

    /// Ngưỡng dưới của các dải verdict
    pub buy_now_min: u32,
    pub potential_buy_min: u32,
    pub wait_min: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            security_cap: 40,
            mutable_metadata_penalty: 10,
            mint_authority_penalty: 20,
            holder_concentration_penalty: 15,
            activity_cap: 30,
            volume_spike_credit: 15,
            buy_pressure_credit: 15,
            spike_hourly_multiple: 2.0,
            turnover_ratio: 0.10,
            trend_cap: 10,
            trend_credit: 10,
            crash_threshold_pct: -20.0,
            hype_cap: 20,
            hype_weight: 0.20,
            buy_now_min: 70,
            potential_buy_min: 40,
            wait_min: 20,
        }
    }
}

impl ScoringPolicy {
    pub fn max_total(&self) -> u32 {
        self.security_cap + self.activity_cap + self.trend_cap + self.hype_cap
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.max_total() != 100 {
            return Err(AnalysisError::Config(format!(
                "subscore caps must sum to 100, got {}",
                self.max_total()
            )));
        }
        if !(self.buy_now_min > self.potential_buy_min && self.potential_buy_min > self.wait_min) {
            return Err(AnalysisError::Config(
                "verdict bands must be strictly descending".to_string(),
            ));
        }
        for (name, value) in [
            ("spike_hourly_multiple", self.spike_hourly_multiple),
            ("turnover_ratio", self.turnover_ratio),
            ("hype_weight", self.hype_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::Config(format!("{} must be a finite non-negative number", name)));
            }
        }
        if !self.crash_threshold_pct.is_finite() {
            return Err(AnalysisError::Config("crash_threshold_pct must be finite".to_string()));
        }
        Ok(())
    }
}

/// Nguồn dữ liệu thị trường
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketSource {
    DexScreener,
    Birdeye,
}

/// Cấu hình các nhà cung cấp bên ngoài
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub market_source: MarketSource,
    pub dexscreener_url: String,
    pub birdeye_url: String,
    pub birdeye_chain: String,
    pub birdeye_api_key: Option<String>,
    pub rugcheck_url: String,
    pub gemini_url: String,
    pub gemini_model: String,
    pub gemini_api_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            market_source: MarketSource::DexScreener,
            dexscreener_url: "https://api.dexscreener.com".to_string(),
            birdeye_url: "https://public-api.birdeye.so".to_string(),
            birdeye_chain: "solana".to_string(),
            birdeye_api_key: None,
            rugcheck_url: "https://api.rugcheck.xyz".to_string(),
            gemini_url: "https://generativelanguage.googleapis.com".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            gemini_api_key: None,
        }
    }
}

/// Timeout cho từng lời gọi bên ngoài (ms)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub market_ms: u64,
    pub risk_ms: u64,
    pub reasoning_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            market_ms: 8_000,
            risk_ms: 8_000,
            reasoning_ms: 20_000,
        }
    }
}

impl TimeoutConfig {
    pub fn market(&self) -> Duration {
        Duration::from_millis(self.market_ms)
    }

    pub fn risk(&self) -> Duration {
        Duration::from_millis(self.risk_ms)
    }

    pub fn reasoning(&self) -> Duration {
        Duration::from_millis(self.reasoning_ms)
    }
}

/// Cấu hình ứng dụng
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub providers: ProviderConfig,
    pub timeouts: TimeoutConfig,
    pub scoring: ScoringPolicy,
    pub logging: LogConfig,
    pub max_tokens_per_request: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            providers: ProviderConfig::default(),
            timeouts: TimeoutConfig::default(),
            scoring: ScoringPolicy::default(),
            logging: LogConfig::default(),
            max_tokens_per_request: DEFAULT_MAX_TOKENS,
        }
    }
}

impl AppConfig {
    /// Tải cấu hình: mặc định -> file -> biến môi trường
    ///
    /// File chỉ bắt buộc khi `path` được chỉ định rõ.
    pub fn load(path: Option<&str>) -> Result<Self> {
        dotenv().ok();

        let builder = config::Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_CONFIG_FILE)).required(path.is_some()))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let mut config = Self::build(builder)?;
        config.apply_key_fallbacks();
        config.validate()?;
        Ok(config)
    }

    /// Đọc cấu hình từ chuỗi TOML (không đọc biến môi trường)
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml));
        let config = Self::build(builder)?;
        config.validate()?;
        Ok(config)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        builder
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// API key dạng biến môi trường quen thuộc khi chưa có trong file
    fn apply_key_fallbacks(&mut self) {
        if self.providers.gemini_api_key.is_none() {
            self.providers.gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|key| !key.is_empty());
        }
        if self.providers.birdeye_api_key.is_none() {
            self.providers.birdeye_api_key = env::var("BIRDEYE_API_KEY").ok().filter(|key| !key.is_empty());
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.scoring.validate()?;

        let providers = &self.providers;
        for (name, url) in [
            ("dexscreener_url", &providers.dexscreener_url),
            ("birdeye_url", &providers.birdeye_url),
            ("rugcheck_url", &providers.rugcheck_url),
            ("gemini_url", &providers.gemini_url),
        ] {
            if url.trim().is_empty() {
                return Err(AnalysisError::Config(format!("{} must not be empty", name)));
            }
        }
        if providers.gemini_model.trim().is_empty() {
            return Err(AnalysisError::Config("gemini_model must not be empty".to_string()));
        }
        if providers.market_source == MarketSource::Birdeye && providers.birdeye_api_key.is_none() {
            return Err(AnalysisError::Config(
                "birdeye market source requires BIRDEYE_API_KEY".to_string(),
            ));
        }

        let timeouts = &self.timeouts;
        if timeouts.market_ms == 0 || timeouts.risk_ms == 0 || timeouts.reasoning_ms == 0 {
            return Err(AnalysisError::Config("timeouts must be greater than zero".to_string()));
        }
        if self.max_tokens_per_request == 0 {
            return Err(AnalysisError::Config("max_tokens_per_request must be at least 1".to_string()));
        }
        Ok(())
    }
}
