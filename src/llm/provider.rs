use std::sync::Arc;

use reqwest::{Client, Response};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::{BadgeProviderKind, Config};
use crate::error::BadgeError;
use crate::llm::gemini::GeminiClient;
use crate::llm::openrouter::OpenRouterClient;
use crate::utils::redact::redact_secrets;
use crate::utils::text::truncate_for_log;
use crate::utils::timing::log_llm_timing;

const ERROR_BODY_LIMIT: usize = 500;

/// Text-generation backend used for badge prompts. One variant per provider;
/// parsing and validation of what they return is shared by the badge resolver.
#[derive(Debug, Clone)]
pub enum BadgeProvider {
    OpenRouter(OpenRouterClient),
    Gemini(GeminiClient),
}

impl BadgeProvider {
    pub fn from_config(config: Arc<Config>, http: Client) -> Self {
        match config.badge_provider {
            BadgeProviderKind::OpenRouter => {
                BadgeProvider::OpenRouter(OpenRouterClient::new(config, http))
            }
            BadgeProviderKind::Gemini => BadgeProvider::Gemini(GeminiClient::new(config, http)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BadgeProvider::OpenRouter(_) => BadgeProviderKind::OpenRouter.as_str(),
            BadgeProvider::Gemini(_) => BadgeProviderKind::Gemini.as_str(),
        }
    }

    pub fn model(&self) -> &str {
        match self {
            BadgeProvider::OpenRouter(client) => client.model(),
            BadgeProvider::Gemini(client) => client.model(),
        }
    }

    /// Sends a single prompt and returns the raw generated text.
    pub async fn complete_json(&self, prompt: &str) -> Result<String, BadgeError> {
        let metadata = json!({ "prompt_chars": prompt.chars().count() });
        log_llm_timing(self.name(), self.model(), "badge", Some(metadata), move || async move {
            match self {
                BadgeProvider::OpenRouter(client) => client.complete_json(prompt).await,
                BadgeProvider::Gemini(client) => client.complete_json(prompt).await,
            }
        })
        .await
    }
}

pub(crate) fn map_transport_error(err: reqwest::Error, config: &Config) -> BadgeError {
    if err.is_timeout() {
        return BadgeError::Timeout(config.request_timeout);
    }
    if err.is_decode() {
        debug!("Badge provider response could not be decoded: {}", err);
        return BadgeError::MalformedResponse;
    }
    BadgeError::Network(redact_secrets(&err.to_string(), &config.secrets()))
}

fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .or_else(|| value.get("message").and_then(|v| v.as_str()));
        if let Some(message) = message {
            return truncate_for_log(message, ERROR_BODY_LIMIT);
        }
        return truncate_for_log(&value.to_string(), ERROR_BODY_LIMIT);
    }

    truncate_for_log(trimmed, ERROR_BODY_LIMIT)
}

pub(crate) async fn upstream_error(provider: &str, response: Response, config: &Config) -> BadgeError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body = redact_secrets(&summarize_error_body(&body), &config.secrets());
    warn!("{} API error: status={}, body={}", provider, status, body);
    BadgeError::Upstream {
        status: status.as_u16(),
        body,
    }
}
