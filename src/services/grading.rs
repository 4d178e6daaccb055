use std::time::{Duration, Instant};

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

use crate::core::config::Settings;

/// Any failure talking to the grading backend collapses into a single
/// category: the call is paid and not idempotent-safe, so it is never retried
/// and the caller surfaces a server error instead.
#[derive(Debug, Error)]
pub(crate) enum GradingError {
    #[error("backend-unavailable: {0}")]
    BackendUnavailable(String),
}

pub(crate) struct InlineImage<'a> {
    pub(crate) bytes: &'a [u8],
    pub(crate) mime_type: &'a str,
}

/// Client for the generative grading backend (Gemini-style `generateContent`).
#[derive(Debug, Clone)]
pub(crate) struct GradingService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_output_tokens: u32,
    temperature: f64,
}

impl GradingService {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(settings.ai().request_timeout);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.ai().gemini_api_key.clone(),
            base_url: settings.ai().gemini_base_url.trim_end_matches('/').to_string(),
            model: settings.ai().gemini_model.clone(),
            max_output_tokens: settings.ai().max_output_tokens,
            temperature: settings.ai().temperature,
        })
    }

    /// Single-shot grading call: the rubric prompt, plus the scanned essay as
    /// an inline part when the submission arrived as an image. Returns the
    /// backend's free-text correction.
    pub(crate) async fn grade(
        &self,
        prompt: &str,
        image: Option<InlineImage<'_>>,
    ) -> Result<String, GradingError> {
        let timer = Instant::now();

        let mut parts = vec![json!({"text": prompt})];
        if let Some(image) = &image {
            parts.push(json!({
                "inline_data": {
                    "mime_type": image.mime_type,
                    "data": STANDARD.encode(image.bytes),
                }
            }));
        }

        let payload = json!({
            "contents": [{"parts": parts}],
            "generationConfig": {
                "maxOutputTokens": self.max_output_tokens,
                "temperature": self.temperature,
            }
        });

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        tracing::info!(model = %self.model, with_image = image.is_some(), "Sending grading request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                let reason = if err.is_timeout() { "request timed out" } else { "request failed" };
                GradingError::BackendUnavailable(format!("{reason}: {err}"))
            })?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|err| {
            GradingError::BackendUnavailable(format!("unreadable response body: {err}"))
        })?;

        if !status.is_success() {
            return Err(GradingError::BackendUnavailable(format!(
                "backend returned {status}: {body}"
            )));
        }

        let text = response_text(&body).ok_or_else(|| {
            GradingError::BackendUnavailable("response carried no candidate text".to_string())
        })?;

        tracing::info!(
            model = %self.model,
            duration_seconds = timer.elapsed().as_secs_f64(),
            response_chars = text.len(),
            "Grading request completed"
        );

        Ok(text)
    }
}

/// Flattens every text part of the first candidate into one string.
fn response_text(body: &Value) -> Option<String> {
    let parts = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::response_text;
    use serde_json::json;

    #[test]
    fn response_text_joins_candidate_parts() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": "Boa argumentação. "}, {"text": "Nota Final: 850"}]
                }
            }]
        });

        assert_eq!(response_text(&body).as_deref(), Some("Boa argumentação. Nota Final: 850"));
    }

    #[test]
    fn response_text_rejects_empty_or_malformed_bodies() {
        assert_eq!(response_text(&json!({})), None);
        assert_eq!(response_text(&json!({"candidates": []})), None);
        assert_eq!(
            response_text(&json!({"candidates": [{"content": {"parts": []}}]})),
            None
        );
        assert_eq!(
            response_text(&json!({"candidates": [{"content": {"parts": [{"inline_data": {}}]}}]})),
            None
        );
    }
}
