use std::sync::Arc;

use anyhow::{anyhow, Context};
use dotenvy::dotenv;
use tracing::{error, info};

use github_anime_badge::utils::http::build_http_client;
use github_anime_badge::utils::logging::init_logging;
use github_anime_badge::{BadgePipeline, Config};

fn usage() -> &'static str {
    "Usage: github_anime_badge <github-username>"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Arc::new(Config::from_env());
    let _guards = init_logging(&config.log_level);

    let username = std::env::args()
        .nth(1)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow!(usage()))?;

    info!(
        "Starting badge search for {} (provider={}, avatar={})",
        username,
        config.badge_provider.as_str(),
        config.avatar_strategy.as_str()
    );

    let http = build_http_client().context("Failed to build HTTP client")?;
    let pipeline = BadgePipeline::new(config, http);
    match pipeline.run(&username).await {
        Ok(card) => {
            println!("{}", serde_json::to_string_pretty(&card)?);
            Ok(())
        }
        Err(err) => {
            error!("Badge search for {} failed: {}", username, err);
            Err(err.into())
        }
    }
}
