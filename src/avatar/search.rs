use std::sync::Arc;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::config::Config;
use crate::utils::http::endpoint_url;
use crate::utils::redact::redact_secrets;

#[derive(Debug, Deserialize)]
struct CharacterSearchResponse {
    #[serde(default)]
    data: Vec<CharacterEntry>,
}

#[derive(Debug, Deserialize)]
struct CharacterEntry {
    images: Option<CharacterImages>,
}

#[derive(Debug, Deserialize)]
struct CharacterImages {
    jpg: Option<ImageSet>,
    webp: Option<ImageSet>,
}

#[derive(Debug, Deserialize)]
struct ImageSet {
    image_url: Option<String>,
}

fn first_image_url(payload: CharacterSearchResponse) -> Option<String> {
    let images = payload.data.into_iter().next()?.images?;
    images
        .jpg
        .and_then(|set| set.image_url)
        .or_else(|| images.webp.and_then(|set| set.image_url))
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Character search against a Jikan-compatible API.
#[derive(Debug, Clone)]
pub struct CharacterSearchClient {
    http: Client,
    config: Arc<Config>,
}

impl CharacterSearchClient {
    pub fn new(config: Arc<Config>, http: Client) -> Self {
        CharacterSearchClient { http, config }
    }

    pub async fn search_image(&self, query: &str) -> Result<Option<String>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(anyhow!("query must not be empty"));
        }

        let url = endpoint_url(
            &self.config.character_search_url,
            "CHARACTER_SEARCH_URL",
            &["characters"],
        )?;
        info!("Calling character search endpoint {} with query: {}", url, query);

        let response = self
            .http
            .get(url)
            .query(&[("q", query), ("limit", "1")])
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|err| {
                anyhow!(
                    "Character search request failed: {}",
                    redact_secrets(&err.to_string(), &self.config.secrets())
                )
            })?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Character search request failed with status {}",
                response.status()
            ));
        }

        let data: CharacterSearchResponse = response
            .json()
            .await
            .map_err(|err| anyhow!("Invalid character search response: {err}"))?;

        Ok(first_image_url(data))
    }
}
