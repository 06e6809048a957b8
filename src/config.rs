use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_OPENROUTER_TITLE: &str = "GitHub Anime Badge";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_IMAGE_API_URL: &str = "https://api.together.xyz/v1/images/generations";
pub const DEFAULT_IMAGE_MODEL: &str = "black-forest-labs/FLUX.1-schnell";
pub const DEFAULT_CHARACTER_SEARCH_URL: &str = "https://api.jikan.moe/v4";
pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Backend used to turn the badge prompt into JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeProviderKind {
    OpenRouter,
    Gemini,
}

impl BadgeProviderKind {
    pub fn from_str(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "openrouter" | "" => BadgeProviderKind::OpenRouter,
            "gemini" => BadgeProviderKind::Gemini,
            other => {
                warn!("Unknown BADGE_PROVIDER value '{}'; defaulting to openrouter.", other);
                BadgeProviderKind::OpenRouter
            }
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BadgeProviderKind::OpenRouter => "openrouter",
            BadgeProviderKind::Gemini => "gemini",
        }
    }
}

/// How the pipeline acquires an avatar once a badge exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarStrategy {
    Lookup,
    Generate,
}

impl AvatarStrategy {
    pub fn from_str(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "lookup" | "" => AvatarStrategy::Lookup,
            "generate" | "generated" => AvatarStrategy::Generate,
            other => {
                warn!("Unknown AVATAR_STRATEGY value '{}'; defaulting to lookup.", other);
                AvatarStrategy::Lookup
            }
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            AvatarStrategy::Lookup => "lookup",
            AvatarStrategy::Generate => "generate",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub github_api_url: String,
    pub github_token: Option<String>,
    pub badge_provider: BadgeProviderKind,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub openrouter_model: String,
    pub openrouter_referer: Option<String>,
    pub openrouter_title: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub badge_temperature: f32,
    pub request_timeout: Duration,
    pub avatar_strategy: AvatarStrategy,
    pub image_api_key: Option<String>,
    pub image_api_url: String,
    pub image_model: String,
    pub image_width: u32,
    pub image_height: u32,
    pub image_steps: u32,
    pub image_guidance: f32,
    pub image_output_quality: u32,
    pub character_search_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: "info".to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_token: None,
            badge_provider: BadgeProviderKind::OpenRouter,
            openrouter_api_key: None,
            openrouter_base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            openrouter_model: DEFAULT_OPENROUTER_MODEL.to_string(),
            openrouter_referer: None,
            openrouter_title: DEFAULT_OPENROUTER_TITLE.to_string(),
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            badge_temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            avatar_strategy: AvatarStrategy::Lookup,
            image_api_key: None,
            image_api_url: DEFAULT_IMAGE_API_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            image_width: 512,
            image_height: 512,
            image_steps: 4,
            image_guidance: 3.5,
            image_output_quality: 90,
            character_search_url: DEFAULT_CHARACTER_SEARCH_URL.to_string(),
        }
    }
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_f32(name: &str, default: f32) -> f32 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<f32>().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn require<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(name))
}

impl Config {
    /// Reads the environment. Credentials are not checked here; each one is
    /// validated by its accessor the first time a component needs it.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        let timeout_seconds = env_u64("REQUEST_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECONDS).max(1);

        Config {
            log_level: env_string("LOG_LEVEL", &defaults.log_level),
            github_api_url: env_string("GITHUB_API_URL", &defaults.github_api_url),
            github_token: env_optional("GITHUB_TOKEN"),
            badge_provider: BadgeProviderKind::from_str(&env_string("BADGE_PROVIDER", "openrouter")),
            openrouter_api_key: env_optional("OPENROUTER_API_KEY"),
            openrouter_base_url: env_string("OPENROUTER_BASE_URL", &defaults.openrouter_base_url),
            openrouter_model: env_string("OPENROUTER_MODEL", &defaults.openrouter_model),
            openrouter_referer: env_optional("OPENROUTER_REFERER"),
            openrouter_title: env_string("OPENROUTER_TITLE", &defaults.openrouter_title),
            gemini_api_key: env_optional("GEMINI_API_KEY"),
            gemini_base_url: env_string("GEMINI_BASE_URL", &defaults.gemini_base_url),
            gemini_model: env_string("GEMINI_MODEL", &defaults.gemini_model),
            badge_temperature: env_f32("BADGE_TEMPERATURE", defaults.badge_temperature),
            request_timeout: Duration::from_secs(timeout_seconds),
            avatar_strategy: AvatarStrategy::from_str(&env_string("AVATAR_STRATEGY", "lookup")),
            image_api_key: env_optional("IMAGE_API_KEY"),
            image_api_url: env_string("IMAGE_API_URL", &defaults.image_api_url),
            image_model: env_string("IMAGE_MODEL", &defaults.image_model),
            image_width: env_u32("IMAGE_WIDTH", defaults.image_width),
            image_height: env_u32("IMAGE_HEIGHT", defaults.image_height),
            image_steps: env_u32("IMAGE_STEPS", defaults.image_steps),
            image_guidance: env_f32("IMAGE_GUIDANCE", defaults.image_guidance),
            image_output_quality: env_u32("IMAGE_OUTPUT_QUALITY", defaults.image_output_quality)
                .clamp(1, 100),
            character_search_url: env_string("CHARACTER_SEARCH_URL", &defaults.character_search_url),
        }
    }

    pub fn openrouter_api_key(&self) -> Result<&str, ConfigError> {
        require(&self.openrouter_api_key, "OPENROUTER_API_KEY")
    }

    pub fn gemini_api_key(&self) -> Result<&str, ConfigError> {
        require(&self.gemini_api_key, "GEMINI_API_KEY")
    }

    pub fn image_api_key(&self) -> Result<&str, ConfigError> {
        require(&self.image_api_key, "IMAGE_API_KEY")
    }

    pub fn badge_model(&self) -> &str {
        match self.badge_provider {
            BadgeProviderKind::OpenRouter => &self.openrouter_model,
            BadgeProviderKind::Gemini => &self.gemini_model,
        }
    }

    /// Every configured credential, for scrubbing error text before it leaves a component.
    pub fn secrets(&self) -> Vec<&str> {
        [
            &self.github_token,
            &self.openrouter_api_key,
            &self.gemini_api_key,
            &self.image_api_key,
        ]
        .into_iter()
        .filter_map(|value| value.as_deref())
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_are_reported_only_when_asked_for() {
        let config = Config {
            openrouter_api_key: Some("sk-or-test".to_string()),
            ..Config::default()
        };

        assert_eq!(config.openrouter_api_key().unwrap(), "sk-or-test");
        let err = config.image_api_key().unwrap_err();
        assert_eq!(err.to_string(), "IMAGE_API_KEY is not configured");
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let config = Config {
            gemini_api_key: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            config.gemini_api_key(),
            Err(ConfigError::Missing("GEMINI_API_KEY"))
        ));
    }

    #[test]
    fn unknown_enum_values_fall_back_to_defaults() {
        assert_eq!(BadgeProviderKind::from_str("Gemini"), BadgeProviderKind::Gemini);
        assert_eq!(BadgeProviderKind::from_str("claude"), BadgeProviderKind::OpenRouter);
        assert_eq!(AvatarStrategy::from_str("GENERATE"), AvatarStrategy::Generate);
        assert_eq!(AvatarStrategy::from_str("dall-e"), AvatarStrategy::Lookup);
    }

    #[test]
    fn badge_model_follows_selected_provider() {
        let config = Config {
            badge_provider: BadgeProviderKind::Gemini,
            ..Config::default()
        };
        assert_eq!(config.badge_model(), DEFAULT_GEMINI_MODEL);
    }
}
