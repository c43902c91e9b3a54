// Standard library imports
use std::time::Duration;

// Third party imports
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

// Internal imports
use super::{endpoint, http_client, ReasoningModel};

/// Lấy văn bản của candidate đầu tiên trong response `generateContent`
pub fn extract_text(body: &Value) -> Result<String> {
    if let Some(message) = body.pointer("/error/message").and_then(Value::as_str) {
        bail!("Gemini error: {}", message);
    }

    let parts = body
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("Gemini response has no candidate content"))?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        bail!("Gemini response text is empty");
    }
    Ok(text)
}

/// Client Gemini `generateContent`
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            timeout,
        })
    }
}

#[async_trait]
impl ReasoningModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        // Thiếu key chỉ làm hỏng phần hype, không chặn cả pipeline
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("GEMINI_API_KEY is not configured"))?;

        let mut url = endpoint(&self.base_url, &format!("v1beta/models/{}:generateContent", self.model))?;
        url.query_pairs_mut().append_pair("key", api_key);
        debug!(component = "gemini", model = %self.model, prompt_len = prompt.len(), "Gửi prompt tới Gemini");

        let body: Value = self
            .client
            .post(url)
            .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] }))
            .timeout(self.timeout)
            .send()
            .await
            .context("Gemini request failed")?
            .error_for_status()
            .context("Gemini returned an error status")?
            .json()
            .await
            .context("Gemini response is not JSON")?;

        extract_text(&body)
    }
}

/// Module tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_joins_parts() {
        let body = json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"hype_score\": "}, {"text": "10}"}], "role": "model"},
                "finishReason": "STOP"
            }]
        });
        assert_eq!(extract_text(&body).unwrap(), "{\"hype_score\": 10}");
    }

    #[test]
    fn test_extract_text_errors() {
        assert!(extract_text(&json!({"candidates": []})).is_err());
        assert!(extract_text(&json!({"error": {"code": 400, "message": "API key not valid"}}))
            .unwrap_err()
            .to_string()
            .contains("API key not valid"));
        assert!(extract_text(&json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]})).is_err());
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let client = GeminiClient::new("http://127.0.0.1:9", "gemini-1.5-flash", None, Duration::from_millis(50)).unwrap();
        let error = client.complete("hello").await.unwrap_err();
        assert!(error.to_string().contains("GEMINI_API_KEY"));
    }
}
