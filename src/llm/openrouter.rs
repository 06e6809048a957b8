use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::BadgeError;
use crate::llm::provider::{map_transport_error, upstream_error};
use crate::utils::text::truncate_for_log;

const PROVIDER: &str = "OpenRouter";

#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: Client,
    config: Arc<Config>,
}

fn summarize_payload(payload: &Value) -> String {
    let model = payload
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    let message_count = payload
        .get("messages")
        .and_then(|v| v.as_array())
        .map(|messages| messages.len())
        .unwrap_or(0);
    let response_format = payload
        .pointer("/response_format/type")
        .and_then(|v| v.as_str())
        .unwrap_or("text");

    format!(
        "model={}, messages={}, response_format={}",
        model, message_count, response_format
    )
}

fn extract_openrouter_content(response: &Value) -> Option<String> {
    response
        .get("choices")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("message"))
        .and_then(|v| v.get("content"))
        .and_then(|v| v.as_str())
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

impl OpenRouterClient {
    pub fn new(config: Arc<Config>, http: Client) -> Self {
        OpenRouterClient { http, config }
    }

    pub fn model(&self) -> &str {
        &self.config.openrouter_model
    }

    fn build_payload(&self, prompt: &str) -> Value {
        json!({
            "model": self.model(),
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.config.badge_temperature,
            "response_format": { "type": "json_object" },
        })
    }

    pub async fn complete_json(&self, prompt: &str) -> Result<String, BadgeError> {
        let api_key = self.config.openrouter_api_key()?;
        let payload = self.build_payload(prompt);
        debug!("OpenRouter request: {}", summarize_payload(&payload));

        let mut request = self
            .http
            .post(format!(
                "{}/chat/completions",
                self.config.openrouter_base_url.trim_end_matches('/')
            ))
            .bearer_auth(api_key)
            .header("X-Title", self.config.openrouter_title.as_str())
            .timeout(self.config.request_timeout)
            .json(&payload);
        if let Some(referer) = self.config.openrouter_referer.as_deref() {
            request = request.header("HTTP-Referer", referer);
        }

        let response = request
            .send()
            .await
            .map_err(|err| map_transport_error(err, &self.config))?;

        if !response.status().is_success() {
            return Err(upstream_error(PROVIDER, response, &self.config).await);
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|err| map_transport_error(err, &self.config))?;

        match extract_openrouter_content(&value) {
            Some(content) => {
                debug!("OpenRouter response received for model={}", self.model());
                Ok(content)
            }
            None => {
                warn!(
                    "OpenRouter response had no message content: {}",
                    truncate_for_log(&value.to_string(), 1000)
                );
                Err(BadgeError::MalformedResponse)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_requests_json_output() {
        let config = Config {
            openrouter_model: "mistralai/mistral-small".to_string(),
            ..Config::default()
        };
        let client = OpenRouterClient::new(Arc::new(config), Client::new());
        let payload = client.build_payload("hello");

        assert_eq!(payload["model"], "mistralai/mistral-small");
        assert_eq!(payload["messages"][0]["role"], "user");
        assert_eq!(payload["messages"][0]["content"], "hello");
        assert_eq!(payload["response_format"]["type"], "json_object");
        let temperature = payload["temperature"].as_f64().unwrap_or_default();
        assert!((temperature - 0.8).abs() < 1e-6);
        assert_eq!(
            summarize_payload(&payload),
            "model=mistralai/mistral-small, messages=1, response_format=json_object"
        );
    }

    #[test]
    fn content_extraction_ignores_blank_messages() {
        let response = json!({ "choices": [{ "message": { "content": "  {\"a\":1} \n" } }] });
        assert_eq!(extract_openrouter_content(&response).as_deref(), Some("{\"a\":1}"));

        let blank = json!({ "choices": [{ "message": { "content": "   " } }] });
        assert_eq!(extract_openrouter_content(&blank), None);
        assert_eq!(extract_openrouter_content(&json!({ "choices": [] })), None);
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = OpenRouterClient::new(Arc::new(Config::default()), Client::new());
        let err = client.complete_json("prompt").await.unwrap_err();
        assert_eq!(err.to_string(), "OPENROUTER_API_KEY is not configured");
    }
}
