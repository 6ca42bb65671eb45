//! Gemini `generateContent` over blocking HTTP.

use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use sciqa_core::config::GenerationSettings;
use sciqa_core::error::{Error, Result};
use sciqa_core::traits::Generator;

pub struct GeminiClient {
    client: HttpClient,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("Missing GEMINI_API_KEY in environment variables or .env file".into()));
        }
        let client = HttpClient::builder().timeout(timeout).build().map_err(anyhow::Error::from)?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// API key resolved from settings or `GEMINI_API_KEY`.
    pub fn from_settings(settings: &sciqa_core::config::Settings) -> Result<Self> {
        let GenerationSettings { base_url, timeout_secs, .. } = &settings.generation;
        Self::new(&settings.gemini_api_key()?, base_url, Duration::from_secs(*timeout_secs))
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

impl Generator for GeminiClient {
    fn generate(&self, model: &str, prompt: &str) -> Result<Option<String>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key).map_err(|e| Error::InvalidConfig(format!("API key is not a valid header value: {e}")))?,
        );
        let body = json!({ "contents": [{ "role": "user", "parts": [{ "text": prompt }] }] });

        debug!(model, prompt_chars = prompt.len(), "generateContent");
        let response = self
            .client
            .post(self.endpoint(model))
            .headers(headers)
            .json(&body)
            .send()
            .map_err(|e| Error::Generation(format!("request to {model} failed: {e}")))?;

        let status = response.status();
        let text = response.text().map_err(|e| Error::Generation(format!("reading {model} response: {e}")))?;
        if !status.is_success() {
            let err = classify_failure(model, status, &text);
            warn!(model, status = status.as_u16(), error = %err, "generation failed");
            return Err(err);
        }
        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| Error::Generation(format!("malformed {model} response: {e}")))?;
        Ok(response_text(&parsed))
    }
}

/// Quota and rate-limit failures become `ResourceExhausted`; anything else is
/// a plain `Generation` error.
pub fn classify_failure(model: &str, status: StatusCode, body: &str) -> Error {
    let ErrorResponse { error } = serde_json::from_str(body).unwrap_or_default();
    let message = if error.message.is_empty() { body.trim().to_string() } else { error.message };
    let exhausted = status == StatusCode::TOO_MANY_REQUESTS
        || error.status == "RESOURCE_EXHAUSTED"
        || message.to_lowercase().contains("quota");
    if exhausted {
        Error::ResourceExhausted { model: model.to_string(), message }
    } else {
        Error::Generation(format!("{model} returned {status}: {message}"))
    }
}

/// Concatenated text parts of the first candidate; `None` when blank.
fn response_text(resp: &GenerateResponse) -> Option<String> {
    let content = resp.candidates.first()?.content.as_ref()?;
    let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
    (!text.trim().is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_requests_is_resource_exhausted() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted (e.g. check quota).","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify_failure("gemini-1.5-pro", StatusCode::TOO_MANY_REQUESTS, body);
        assert!(matches!(err, Error::ResourceExhausted { ref model, .. } if model == "gemini-1.5-pro"));
    }

    #[test]
    fn quota_message_without_429_is_resource_exhausted() {
        let body = r#"{"error":{"code":403,"message":"Quota exceeded for project","status":"PERMISSION_DENIED"}}"#;
        assert!(classify_failure("m", StatusCode::FORBIDDEN, body).is_resource_exhausted());
    }

    #[test]
    fn other_failures_are_generation_errors() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        match classify_failure("m", StatusCode::BAD_REQUEST, body) {
            Error::Generation(msg) => assert!(msg.contains("API key not valid")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(classify_failure("m", StatusCode::BAD_GATEWAY, "<html>"), Error::Generation(_)));
    }

    #[test]
    fn response_text_joins_parts_and_drops_blank() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"E = mc^2 "},{"text":"[abc]"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response_text(&resp).as_deref(), Some("E = mc^2 [abc]"));

        let blank: GenerateResponse = serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#).unwrap();
        assert_eq!(response_text(&blank), None);
        let blocked: GenerateResponse = serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert_eq!(response_text(&blocked), None);
        assert_eq!(response_text(&GenerateResponse::default()), None);
    }

    #[test]
    fn empty_key_is_invalid_config() {
        let err = GeminiClient::new(" ", "http://localhost", Duration::from_secs(1)).err();
        assert!(matches!(err, Some(Error::InvalidConfig(_))));
    }
}
