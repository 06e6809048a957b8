use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::avatar::catalog::{known_character_image, series_default_image, GLOBAL_DEFAULT_AVATAR};
use crate::avatar::search::CharacterSearchClient;
use crate::config::Config;
use crate::models::AnimeBadge;

/// One way of finding an avatar for a badge.
#[derive(Debug, Clone)]
pub enum AvatarTier {
    KnownCharacter,
    CharacterSearch(CharacterSearchClient),
    SeriesDefault,
    GlobalDefault,
}

impl AvatarTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvatarTier::KnownCharacter => "known_character",
            AvatarTier::CharacterSearch(_) => "character_search",
            AvatarTier::SeriesDefault => "series_default",
            AvatarTier::GlobalDefault => "global_default",
        }
    }

    /// Returns an image reference, or `None` to defer to the next tier.
    /// Errors are logged and swallowed here.
    pub async fn attempt(&self, badge: &AnimeBadge) -> Option<String> {
        match self {
            AvatarTier::KnownCharacter => {
                known_character_image(&badge.character_name).map(str::to_string)
            }
            AvatarTier::CharacterSearch(client) => {
                let query = format!("{} {}", badge.character_name.trim(), badge.anime.trim());
                match client.search_image(&query).await {
                    Ok(found) => found,
                    Err(err) => {
                        warn!("Character search failed for '{}': {}", query, err);
                        None
                    }
                }
            }
            AvatarTier::SeriesDefault => series_default_image(&badge.anime).map(str::to_string),
            AvatarTier::GlobalDefault => Some(GLOBAL_DEFAULT_AVATAR.to_string()),
        }
    }
}

/// Tries each tier in order. Never fails: the global default is the floor.
#[derive(Debug, Clone)]
pub struct AvatarResolver {
    tiers: Vec<AvatarTier>,
}

impl AvatarResolver {
    pub fn new(config: Arc<Config>, http: Client) -> Self {
        AvatarResolver::with_tiers(vec![
            AvatarTier::KnownCharacter,
            AvatarTier::CharacterSearch(CharacterSearchClient::new(config, http)),
            AvatarTier::SeriesDefault,
            AvatarTier::GlobalDefault,
        ])
    }

    pub fn with_tiers(tiers: Vec<AvatarTier>) -> Self {
        AvatarResolver { tiers }
    }

    pub fn tiers(&self) -> &[AvatarTier] {
        &self.tiers
    }

    pub async fn resolve(&self, badge: &AnimeBadge) -> String {
        for tier in &self.tiers {
            if let Some(url) = tier.attempt(badge).await {
                info!(
                    "Avatar for '{}' resolved by tier {}",
                    badge.character_name,
                    tier.as_str()
                );
                return url;
            }
            debug!(
                "Avatar tier {} had nothing for '{}'",
                tier.as_str(),
                badge.character_name
            );
        }

        GLOBAL_DEFAULT_AVATAR.to_string()
    }
}
