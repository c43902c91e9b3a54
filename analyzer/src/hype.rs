//! Hype Assessor
//!
//! Hỏi reasoning model một lần duy nhất, đọc câu trả lời theo hợp đồng JSON
//! cố định. Mọi lỗi (transport, timeout, sai hợp đồng) đều trả về
//! `HypeAssessment::failed()` dưới dạng Fallback, không bao giờ lan ra ngoài.

// Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Third party imports
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

// Internal imports
use crate::config::ScoringPolicy;
use crate::providers::ReasoningModel;
use crate::types::{HypeAssessment, Signal, SubscoreSet, TokenSnapshot, Verdict};

/// Phiên bản template prompt, đổi khi nội dung prompt thay đổi
pub const PROMPT_VERSION: &str = "hype-v1";

/// Lỗi khi đọc câu trả lời của reasoning model
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HypeParseError {
    #[error("Response contains no JSON object")]
    NoJsonObject,
    #[error("Response JSON is invalid: {0}")]
    InvalidJson(String),
    #[error("Response is missing key: {0}")]
    MissingKey(&'static str),
    #[error("Malformed value for {key}: {reason}")]
    Malformed { key: &'static str, reason: String },
}

fn format_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| format!("{:.2}", v))
}

fn format_count(value: Option<u64>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

/// Dựng prompt từ snapshot và ba điểm thành phần đã tính
///
/// Trường `hype` của `scores` bị bỏ qua.
pub fn build_prompt(snapshot: &TokenSnapshot, scores: &SubscoreSet, policy: &ScoringPolicy) -> String {
    format!(
        "[prompt {version}]\n\
         You are a crypto market analyst. Judge the short-term hype and momentum of this token.\n\
         \n\
         Token: {name}\n\
         Address: {address}\n\
         Price (USD): {price}\n\
         Market cap (USD): {market_cap}\n\
         Liquidity (USD): {liquidity}\n\
         Volume 24h (USD): {volume_24h}\n\
         Volume 1h (USD): {volume_1h}\n\
         Price change 5m/1h/6h/24h (%): {change_5m} / {change_1h} / {change_6h} / {change_24h}\n\
         Transactions 1h: {buys} buys / {sells} sells\n\
         \n\
         Computed scores: security {security}/{security_cap}, activity {activity}/{activity_cap}, trend {trend}/{trend_cap}\n\
         \n\
         Reply with ONLY one JSON object and nothing else, using exactly these keys:\n\
         {{\"hype_score\": <integer 0-100>, \
         \"final_verdict\": \"BUY_NOW\" | \"POTENTIAL_BUY\" | \"HOLD\" | \"WAIT\" | \"HIGH_RISK\", \
         \"probability\": <integer 0-100>, \
         \"summary\": \"<one or two sentences>\"}}",
        version = PROMPT_VERSION,
        name = snapshot.display_name(),
        address = snapshot.address,
        price = format_metric(snapshot.price),
        market_cap = format_metric(snapshot.market_cap),
        liquidity = format_metric(snapshot.liquidity_usd),
        volume_24h = format_metric(snapshot.volume_24h),
        volume_1h = format_metric(snapshot.volume_1h),
        change_5m = format_metric(snapshot.price_change_5m),
        change_1h = format_metric(snapshot.price_change_1h),
        change_6h = format_metric(snapshot.price_change_6h),
        change_24h = format_metric(snapshot.price_change_24h),
        buys = format_count(snapshot.buy_count_1h),
        sells = format_count(snapshot.sell_count_1h),
        security = scores.security,
        activity = scores.activity,
        trend = scores.trend,
        security_cap = policy.security_cap,
        activity_cap = policy.activity_cap,
        trend_cap = policy.trend_cap,
    )
}

fn required<'a>(object: &'a Map<String, Value>, key: &'static str) -> Result<&'a Value, HypeParseError> {
    object.get(key).ok_or(HypeParseError::MissingKey(key))
}

/// Số nguyên trong [0, 100]; chấp nhận 80.0 nhưng không chấp nhận 80.5
fn percent(object: &Map<String, Value>, key: &'static str) -> Result<u8, HypeParseError> {
    let value = required(object, key)?;
    let number = value.as_f64().ok_or_else(|| HypeParseError::Malformed {
        key,
        reason: format!("expected a number, got {}", value),
    })?;
    if number.fract() != 0.0 || !(0.0..=100.0).contains(&number) {
        return Err(HypeParseError::Malformed {
            key,
            reason: format!("expected an integer in 0-100, got {}", number),
        });
    }
    Ok(number as u8)
}

/// Đọc câu trả lời của model
///
/// Lấy đoạn từ `{` đầu tiên tới `}` cuối cùng, vì model hay bọc JSON trong
/// markdown hoặc thêm lời dẫn. Khóa thừa bị bỏ qua.
pub fn parse_response(raw: &str) -> Result<HypeAssessment, HypeParseError> {
    let (start, end) = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => return Err(HypeParseError::NoJsonObject),
    };

    let value: Value = serde_json::from_str(&raw[start..=end])
        .map_err(|e| HypeParseError::InvalidJson(e.to_string()))?;
    let object = value.as_object().ok_or(HypeParseError::NoJsonObject)?;

    let hype_score = percent(object, "hype_score")?;
    let probability = percent(object, "probability")?;

    let verdict_value = required(object, "final_verdict")?;
    let verdict = verdict_value
        .as_str()
        .and_then(Verdict::from_model_label)
        .ok_or_else(|| HypeParseError::Malformed {
            key: "final_verdict",
            reason: format!("unknown verdict {}", verdict_value),
        })?;

    let summary_value = required(object, "summary")?;
    let summary = summary_value
        .as_str()
        .ok_or_else(|| HypeParseError::Malformed {
            key: "summary",
            reason: format!("expected a string, got {}", summary_value),
        })?
        .trim()
        .to_string();

    Ok(HypeAssessment {
        hype_score,
        verdict,
        probability,
        summary,
    })
}

/// Phần đóng góp của hype vào tổng điểm
pub fn hype_contribution(hype_score: u8, policy: &ScoringPolicy) -> u32 {
    let weighted = (f64::from(hype_score) * policy.hype_weight).round();
    (weighted as u32).min(policy.hype_cap)
}

/// Gọi reasoning model với timeout và fallback cố định
#[derive(Clone)]
pub struct HypeAssessor {
    model: Arc<dyn ReasoningModel>,
    timeout: Duration,
}

impl HypeAssessor {
    pub fn new(model: Arc<dyn ReasoningModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    pub async fn assess(
        &self,
        snapshot: &TokenSnapshot,
        scores: &SubscoreSet,
        policy: &ScoringPolicy,
    ) -> Signal<HypeAssessment> {
        let prompt = build_prompt(snapshot, scores, policy);

        let raw = match tokio::time::timeout(self.timeout, self.model.complete(&prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(component = "hype", token = %snapshot.address, "Lỗi khi gọi reasoning model: {:#}", e);
                return Signal::fallback(HypeAssessment::failed(), format!("reasoning model error: {}", e));
            }
            Err(_) => {
                warn!(component = "hype", token = %snapshot.address, "Timeout khi gọi reasoning model sau {:?}", self.timeout);
                return Signal::fallback(HypeAssessment::failed(), "reasoning model timed out");
            }
        };

        match parse_response(&raw) {
            Ok(assessment) if assessment.verdict == Verdict::Error => {
                warn!(component = "hype", token = %snapshot.address, "Reasoning model tự báo ERROR");
                Signal::fallback(HypeAssessment::failed(), "reasoning model reported ERROR")
            }
            Ok(assessment) => {
                debug!(component = "hype", token = %snapshot.address, hype = assessment.hype_score, verdict = %assessment.verdict, "Đã nhận đánh giá hype");
                Signal::Measured(assessment)
            }
            Err(e) => {
                warn!(component = "hype", token = %snapshot.address, "Câu trả lời của model sai định dạng: {}", e);
                Signal::fallback(HypeAssessment::failed(), e.to_string())
            }
        }
    }
}
