use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AvatarError;
use crate::llm::build_avatar_prompt;
use crate::models::AnimeBadge;
use crate::utils::redact::redact_secrets;
use crate::utils::text::truncate_for_log;
use crate::utils::timing::log_llm_timing;

const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    width: u32,
    height: u32,
    steps: u32,
    guidance: f32,
    output_format: &'a str,
    output_quality: u32,
}

#[derive(Debug, Default, Deserialize)]
struct ImageResponse {
    image: Option<ImagePayload>,
    #[serde(default)]
    data: Vec<ImageDataItem>,
}

#[derive(Debug, Deserialize)]
struct ImagePayload {
    base64: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageDataItem {
    b64_json: Option<String>,
}

fn extract_image_base64(response: ImageResponse) -> Option<String> {
    response
        .image
        .and_then(|image| image.base64)
        .or_else(|| response.data.into_iter().find_map(|item| item.b64_json))
        .map(|payload| payload.trim().to_string())
        .filter(|payload| !payload.is_empty())
}

/// Decodes the provider payload and re-encodes it as a JPEG data URL.
fn to_data_url(payload: &str) -> Option<String> {
    let payload = payload
        .split_once("base64,")
        .map(|(_, rest)| rest)
        .unwrap_or(payload);
    let bytes = general_purpose::STANDARD.decode(payload.trim()).ok()?;
    if bytes.is_empty() {
        return None;
    }
    Some(format!(
        "{DATA_URL_PREFIX}{}",
        general_purpose::STANDARD.encode(bytes)
    ))
}

/// Generates an avatar with an image model instead of looking one up.
#[derive(Debug, Clone)]
pub struct ImageGenerator {
    http: Client,
    config: Arc<Config>,
}

impl ImageGenerator {
    pub fn new(config: Arc<Config>, http: Client) -> Self {
        ImageGenerator { http, config }
    }

    fn map_transport_error(&self, err: reqwest::Error) -> AvatarError {
        if err.is_timeout() {
            return AvatarError::Timeout(self.config.request_timeout);
        }
        if err.is_decode() {
            debug!("Image response could not be decoded: {}", err);
            return AvatarError::NoImageReturned;
        }
        AvatarError::Network(redact_secrets(&err.to_string(), &self.config.secrets()))
    }

    async fn request_image(&self, prompt: &str) -> Result<String, AvatarError> {
        let api_key = self.config.image_api_key()?;
        let request = ImageRequest {
            prompt,
            model: &self.config.image_model,
            width: self.config.image_width,
            height: self.config.image_height,
            steps: self.config.image_steps,
            guidance: self.config.image_guidance,
            output_format: "jpeg",
            output_quality: self.config.image_output_quality,
        };

        let response = self
            .http
            .post(self.config.image_api_url.trim())
            .bearer_auth(api_key)
            .timeout(self.config.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(
                "Image API error: status={}, body={}",
                status,
                truncate_for_log(&redact_secrets(&body, &self.config.secrets()), 500)
            );
            return Err(AvatarError::Upstream {
                status: status.as_u16(),
            });
        }

        let parsed = response
            .json::<ImageResponse>()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        extract_image_base64(parsed)
            .and_then(|payload| to_data_url(&payload))
            .ok_or(AvatarError::NoImageReturned)
    }

    pub async fn generate(&self, badge: &AnimeBadge) -> Result<String, AvatarError> {
        let prompt = build_avatar_prompt(badge);
        info!(
            "Generating avatar for '{}' with {}",
            badge.character_name, self.config.image_model
        );
        log_llm_timing(
            "image",
            &self.config.image_model,
            "avatar",
            None,
            move || async move { self.request_image(&prompt).await },
        )
        .await
    }
}
