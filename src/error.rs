use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} is not configured")]
    Missing(&'static str),
    #[error("{name} is not a valid URL: {value}")]
    InvalidUrl { name: &'static str, value: String },
}

/// Failures of the GitHub profile fetch.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("GitHub username must not be blank")]
    BlankUsername,
    #[error("GitHub user '{0}' was not found")]
    NotFound(String),
    #[error("GitHub API rate limit exceeded; wait a while or configure GITHUB_TOKEN")]
    RateLimited,
    #[error("GitHub request failed with status {status}")]
    Upstream { status: u16 },
    #[error("GitHub request timed out after {:?}", .0)]
    Timeout(Duration),
    #[error("GitHub request failed: {0}")]
    Network(String),
    #[error("GitHub returned an invalid response")]
    MalformedResponse,
}

/// Failures of badge resolution. Configuration problems pass through untouched.
#[derive(Debug, Error)]
pub enum BadgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid profile input: {0}")]
    InvalidInput(String),
    #[error("Badge provider request timed out after {:?}", .0)]
    Timeout(Duration),
    #[error("Badge provider request failed with status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("Badge provider request failed: {0}")]
    Network(String),
    #[error("The AI provider returned an invalid response")]
    MalformedResponse,
    #[error("The AI provider response is missing required fields: {}", .missing.join(", "))]
    IncompleteResponse { missing: Vec<String> },
}

/// Failures of generative avatar acquisition.
#[derive(Debug, Error)]
pub enum AvatarError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Image generation timed out after {:?}", .0)]
    Timeout(Duration),
    #[error("Image generation failed with status {status}")]
    Upstream { status: u16 },
    #[error("Image generation request failed: {0}")]
    Network(String),
    #[error("Image generation returned no image")]
    NoImageReturned,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Badge(#[from] BadgeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
