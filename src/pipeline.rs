use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};

use crate::avatar::{AvatarResolver, ImageGenerator};
use crate::badge::BadgeResolver;
use crate::config::{AvatarStrategy, Config};
use crate::error::{AvatarError, ConfigError, PipelineError};
use crate::github::GithubClient;
use crate::models::{AnimeBadge, BadgeCard};
use crate::utils::timing::SearchTimer;

/// The two interchangeable ways of getting an avatar for a badge.
#[derive(Debug, Clone)]
pub enum AvatarSource {
    Lookup(AvatarResolver),
    Generated(ImageGenerator),
}

impl AvatarSource {
    pub fn from_config(config: Arc<Config>, http: Client) -> Self {
        match config.avatar_strategy {
            AvatarStrategy::Lookup => AvatarSource::Lookup(AvatarResolver::new(config, http)),
            AvatarStrategy::Generate => AvatarSource::Generated(ImageGenerator::new(config, http)),
        }
    }

    /// A failed generation yields `None`. A missing setting is returned as is.
    pub async fn acquire(&self, badge: &AnimeBadge) -> Result<Option<String>, ConfigError> {
        match self {
            AvatarSource::Lookup(resolver) => Ok(Some(resolver.resolve(badge).await)),
            AvatarSource::Generated(generator) => match generator.generate(badge).await {
                Ok(data_url) => Ok(Some(data_url)),
                Err(AvatarError::Config(err)) => Err(err),
                Err(err) => {
                    warn!(
                        "Avatar generation failed for '{}': {}",
                        badge.character_name, err
                    );
                    Ok(None)
                }
            },
        }
    }
}

/// Username in, rendered badge card out. Steps run strictly in sequence.
#[derive(Debug, Clone)]
pub struct BadgePipeline {
    github: GithubClient,
    badges: BadgeResolver,
    avatars: AvatarSource,
}

impl BadgePipeline {
    pub fn new(config: Arc<Config>, http: Client) -> Self {
        BadgePipeline {
            github: GithubClient::new(config.clone(), http.clone()),
            badges: BadgeResolver::new(config.clone(), http.clone()),
            avatars: AvatarSource::from_config(config, http),
        }
    }

    pub fn from_parts(github: GithubClient, badges: BadgeResolver, avatars: AvatarSource) -> Self {
        BadgePipeline {
            github,
            badges,
            avatars,
        }
    }

    pub async fn run(&self, username: &str) -> Result<BadgeCard, PipelineError> {
        let mut timer = SearchTimer::start(username);
        let result = self.run_steps(username).await;
        match &result {
            Ok(card) => timer.mark_status(
                "success",
                Some(format!(
                    "character={:?} avatar={}",
                    card.badge.character_name,
                    card.avatar.is_some()
                )),
            ),
            Err(err) => timer.mark_status("error", Some(err.to_string())),
        }
        timer.complete();
        result
    }

    async fn run_steps(&self, username: &str) -> Result<BadgeCard, PipelineError> {
        let profile = self.github.fetch_profile(username).await?;
        let badge = self.badges.resolve(&profile).await?;
        let avatar = self.avatars.acquire(&badge).await?;
        info!(
            "Badge card ready for {}: {} ({})",
            profile.user.login, badge.character_name, badge.anime
        );

        Ok(BadgeCard {
            profile,
            badge,
            avatar,
        })
    }
}
