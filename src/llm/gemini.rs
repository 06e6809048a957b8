use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::BadgeError;
use crate::llm::provider::{map_transport_error, upstream_error};
use crate::utils::http::endpoint_url;

const PROVIDER: &str = "Gemini";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    config: Arc<Config>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

fn extract_gemini_text(response: GeminiResponse) -> Option<String> {
    let candidate = response.candidates?.into_iter().next()?;
    if let Some(reason) = candidate.finish_reason.as_deref() {
        debug!("Gemini finish reason: {}", reason);
    }
    let text = candidate
        .content?
        .parts?
        .into_iter()
        .filter_map(|part| part.text)
        .collect::<Vec<_>>()
        .join("");
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

impl GeminiClient {
    pub fn new(config: Arc<Config>, http: Client) -> Self {
        GeminiClient { http, config }
    }

    pub fn model(&self) -> &str {
        &self.config.gemini_model
    }

    fn build_payload(&self, prompt: &str) -> Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.config.badge_temperature,
                "responseMimeType": "application/json",
            },
        })
    }

    pub async fn complete_json(&self, prompt: &str) -> Result<String, BadgeError> {
        let api_key = self.config.gemini_api_key()?;
        let method = format!("{}:generateContent", self.model());
        let url = endpoint_url(
            &self.config.gemini_base_url,
            "GEMINI_BASE_URL",
            &["models", method.as_str()],
        )?;
        debug!("Gemini request: model={}", self.model());

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key)
            .timeout(self.config.request_timeout)
            .json(&self.build_payload(prompt))
            .send()
            .await
            .map_err(|err| map_transport_error(err, &self.config))?;

        if !response.status().is_success() {
            return Err(upstream_error(PROVIDER, response, &self.config).await);
        }

        let parsed = response
            .json::<GeminiResponse>()
            .await
            .map_err(|err| map_transport_error(err, &self.config))?;

        extract_gemini_text(parsed).ok_or_else(|| {
            warn!("Gemini response had no text parts for model={}", self.model());
            BadgeError::MalformedResponse
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> GeminiClient {
        let config = Config {
            gemini_api_key: Some("gm-test-key".to_string()),
            gemini_base_url: format!("{}/v1beta", server.uri()),
            gemini_model: "gemini-test".to_string(),
            request_timeout: Duration::from_secs(5),
            ..Config::default()
        };
        GeminiClient::new(Arc::new(config), Client::new())
    }

    #[tokio::test]
    async fn joins_text_parts_of_first_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "gm-test-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"characterName\":" }, { "text": "\"Itachi\"}" }] },
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).complete_json("prompt").await.unwrap();
        assert_eq!(text, "{\"characterName\":\"Itachi\"}");
    }

    #[tokio::test]
    async fn empty_candidates_are_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client_for(&server).complete_json("prompt").await.unwrap_err();
        assert!(matches!(err, BadgeError::MalformedResponse));
    }

    #[tokio::test]
    async fn error_status_is_redacted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "API key gm-test-key is invalid" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).complete_json("prompt").await.unwrap_err();
        match err {
            BadgeError::Upstream { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "API key [REDACTED] is invalid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
