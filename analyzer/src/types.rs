// Standard library imports
use std::fmt;

// Third party imports
use serde::{Deserialize, Serialize};

// Internal imports
use tokenscan_common::AnalysisError;

/// Ảnh chụp dữ liệu thị trường của token, đã chuẩn hóa
///
/// Mọi trường số đều có thể vắng mặt; vắng mặt được hiểu là trung tính
/// (0) khi chấm điểm, không bao giờ là lỗi.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSnapshot {
    /// Địa chỉ on-chain của token
    pub address: String,
    pub name: String,
    pub symbol: String,
    /// Giá USD (>= 0)
    pub price: Option<f64>,
    /// Vốn hóa thị trường USD (>= 0)
    pub market_cap: Option<f64>,
    /// Thanh khoản USD của pool chính
    pub liquidity_usd: Option<f64>,
    pub volume_24h: Option<f64>,
    pub volume_1h: Option<f64>,
    /// Biến động giá (%) theo các khung thời gian
    pub price_change_5m: Option<f64>,
    pub price_change_1h: Option<f64>,
    pub price_change_6h: Option<f64>,
    pub price_change_24h: Option<f64>,
    /// Số lệnh mua/bán trong 1 giờ gần nhất
    pub buy_count_1h: Option<u64>,
    pub sell_count_1h: Option<u64>,
}

impl TokenSnapshot {
    /// Tạo snapshot rỗng cho một địa chỉ
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Tên hiển thị: `NAME (SYMBOL)` hoặc địa chỉ nếu thiếu metadata
    pub fn display_name(&self) -> String {
        match (self.name.is_empty(), self.symbol.is_empty()) {
            (false, false) => format!("{} ({})", self.name, self.symbol),
            (false, true) => self.name.clone(),
            (true, false) => self.symbol.clone(),
            (true, true) => self.address.clone(),
        }
    }
}

/// Một phát hiện rủi ro từ báo cáo bảo mật
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFinding {
    /// Tên cờ rủi ro, ví dụ "Mutable Metadata"
    pub name: String,
    /// Mức độ do nhà cung cấp gán ("warn", "danger", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RiskFinding {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: None,
            description: None,
        }
    }
}

/// Báo cáo rủi ro của một token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    pub findings: Vec<RiskFinding>,
    /// Điểm riêng của nhà cung cấp, chỉ để tham khảo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_score: Option<f64>,
}

impl RiskReport {
    pub fn new(findings: Vec<RiskFinding>) -> Self {
        Self {
            findings,
            provider_score: None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Bốn điểm thành phần đã được giới hạn theo policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscoreSet {
    pub security: u32,
    pub activity: u32,
    pub trend: u32,
    pub hype: u32,
}

impl SubscoreSet {
    /// Tổng điểm = tổng bốn thành phần
    pub fn total(&self) -> u32 {
        self.security + self.activity + self.trend + self.hype
    }
}

/// Kết luận đầu tư
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    BuyNow,
    PotentialBuy,
    Hold,
    Wait,
    HighRisk,
    Error,
}

impl Verdict {
    /// Đọc verdict do reasoning model trả về
    ///
    /// Chấp nhận hoa/thường, khoảng trắng hoặc gạch nối thay cho `_` và một
    /// số bí danh phổ biến. Chuỗi lạ trả về None.
    pub fn from_model_label(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        match normalized.as_str() {
            "BUY_NOW" | "BUY" | "STRONG_BUY" => Some(Verdict::BuyNow),
            "POTENTIAL_BUY" | "POTENTIAL" | "MAYBE_BUY" => Some(Verdict::PotentialBuy),
            "HOLD" | "NEUTRAL" => Some(Verdict::Hold),
            "WAIT" => Some(Verdict::Wait),
            "HIGH_RISK" | "AVOID" | "SELL" => Some(Verdict::HighRisk),
            "ERROR" => Some(Verdict::Error),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::BuyNow => "BUY NOW",
            Verdict::PotentialBuy => "POTENTIAL BUY",
            Verdict::Hold => "HOLD",
            Verdict::Wait => "WAIT",
            Verdict::HighRisk => "HIGH-RISK",
            Verdict::Error => "ERROR",
        }
    }

    pub fn to_emoji(&self) -> &'static str {
        match self {
            Verdict::BuyNow => "🟢",
            Verdict::PotentialBuy => "🟡",
            Verdict::Hold | Verdict::Wait => "⚪",
            Verdict::HighRisk => "🔴",
            Verdict::Error => "⚠️",
        }
    }

    pub fn to_description(&self) -> &'static str {
        match self {
            Verdict::BuyNow => "Strong buy signal",
            Verdict::PotentialBuy => "Interesting, worth a closer look",
            Verdict::Hold => "No clear edge, hold",
            Verdict::Wait => "Neutral, wait for confirmation",
            Verdict::HighRisk => "High risk, avoid",
            Verdict::Error => "Analysis could not produce a verdict",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Đánh giá định tính từ reasoning model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HypeAssessment {
    /// 0-100
    pub hype_score: u8,
    pub verdict: Verdict,
    /// 0-100
    pub probability: u8,
    pub summary: String,
}

impl HypeAssessment {
    /// Kết quả cố định khi model lỗi hoặc trả lời sai hợp đồng
    pub fn failed() -> Self {
        Self {
            hype_score: 0,
            verdict: Verdict::Error,
            probability: 0,
            summary: "analysis failed".to_string(),
        }
    }
}

/// Kết quả của một bộ đánh giá: đo được, hoặc giá trị mặc định kèm lý do
#[derive(Debug, Clone, PartialEq)]
pub enum Signal<T> {
    Measured(T),
    Fallback { value: T, reason: String },
}

impl<T> Signal<T> {
    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Signal::Fallback {
            value,
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Signal::Measured(value) => value,
            Signal::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Signal::Measured(value) => value,
            Signal::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Signal::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Signal::Measured(_) => None,
            Signal::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Kết quả cuối cùng của một lượt phân tích
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub token_address: String,
    pub snapshot: TokenSnapshot,
    pub subscores: SubscoreSet,
    pub hype: HypeAssessment,
    /// Luôn bằng `subscores.total()`
    pub total_score: u32,
    pub verdict: Verdict,
    /// Các nguồn tín hiệu bị hạ cấp, kèm thành phần gây ra
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Kết quả theo từng token khi phân tích nhiều token
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TokenAnalysis {
    Analyzed(AnalysisResult),
    Failed {
        #[serde(rename = "tokenAddress")]
        token_address: String,
        code: &'static str,
        message: String,
    },
}

impl TokenAnalysis {
    pub fn from_outcome(token_address: &str, outcome: Result<AnalysisResult, AnalysisError>) -> Self {
        match outcome {
            Ok(result) => TokenAnalysis::Analyzed(result),
            Err(error) => TokenAnalysis::Failed {
                token_address: token_address.to_string(),
                code: error.code(),
                message: error.to_string(),
            },
        }
    }

    pub fn token_address(&self) -> &str {
        match self {
            TokenAnalysis::Analyzed(result) => &result.token_address,
            TokenAnalysis::Failed { token_address, .. } => token_address,
        }
    }
}
