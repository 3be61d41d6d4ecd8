//! Google Gemini extraction backend.
//!
//! Posts the PDF as base64 `inlineData` next to the prompt to the
//! `generateContent` endpoint and returns the concatenated candidate text.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ResumoError, TransportError};
use crate::models::config::AiConfig;

use super::ExtractionBackend;

const PDF_MIME_TYPE: &str = "application/pdf";

/// Gemini backend over the REST API, authenticated by API key.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }

    /// Build from configuration, reading the key from the environment.
    pub fn from_config(config: &AiConfig) -> Result<Self, ResumoError> {
        let api_key = config.api_key()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ResumoError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn build_request(document: &[u8], prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiPart::InlineData {
                        inline_data: GeminiInlineData {
                            mime_type: PDF_MIME_TYPE.to_string(),
                            data: STANDARD.encode(document),
                        },
                    },
                    GeminiPart::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
        }
    }
}

// -- Gemini API request/response types --

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    /// Function calls, executable code and other part kinds; skipped.
    Other(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GeminiResponse {
    /// Text parts of every candidate, concatenated. Empty when there are none.
    fn text(&self) -> String {
        self.candidates
            .iter()
            .flatten()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| match p {
                GeminiPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

fn error_message(body: String) -> String {
    serde_json::from_str::<GeminiErrorResponse>(&body)
        .ok()
        .and_then(|e| e.error.map(|d| d.message))
        .unwrap_or(body)
}

#[async_trait]
impl ExtractionBackend for GeminiBackend {
    async fn invoke(&self, document: &[u8], prompt: &str) -> Result<String, TransportError> {
        let request = Self::build_request(document, prompt);
        info!("Sending {} bytes to {}", document.len(), self.model);

        let response = self
            .client
            .post(self.build_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::from_status(status.as_u16(), error_message(body)));
        }

        let gemini_resp: GeminiResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Network(format!("failed to read response: {e}")))?;

        let text = gemini_resp.text();
        debug!("Received {} chars from {}", text.len(), self.model);
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_url() {
        let backend = GeminiBackend::new("secret", "gemini-1.5-flash").with_base_url("http://localhost:8080/");
        assert_eq!(
            backend.build_url(),
            "http://localhost:8080/v1beta/models/gemini-1.5-flash:generateContent?key=secret"
        );
    }

    #[test]
    fn test_request_shape() {
        let request = GeminiBackend::build_request(b"%PDF", "extraia");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{
                    "parts": [
                        { "inlineData": { "mimeType": "application/pdf", "data": "JVBERg==" } },
                        { "text": "extraia" }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_response_text_concatenates_candidates() {
        let body = r#"{
            "candidates": [
                { "content": { "parts": [{ "text": "{\"products\": " }, { "text": "[]}" }] } },
                { "content": { "parts": [{ "text": "\nSFA_COUNT: 1" }] } }
            ]
        }"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), "{\"products\": []}\nSFA_COUNT: 1");
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let response: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.text(), "");

        let response: GeminiResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert_eq!(response.text(), "");
    }

    #[test]
    fn test_unknown_parts_are_skipped() {
        let body = r#"{
            "candidates": [
                { "content": { "parts": [
                    { "executableCode": { "language": "PYTHON", "code": "print(1)" } },
                    { "text": "SFA_COUNT: 2" },
                    { "functionCall": { "name": "lookup", "args": {} } }
                ] } }
            ]
        }"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), "SFA_COUNT: 2");
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(error_message(body.to_string()), "Resource has been exhausted");
        assert_eq!(error_message("bad gateway".to_string()), "bad gateway");
    }
}
