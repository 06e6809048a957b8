//! Assigns an anime persona to a GitHub profile.
//!
//! The flow is profile fetch, then badge resolution through a text model, then
//! avatar acquisition (lookup with fallbacks, or image generation). Each stage is
//! usable on its own; [`BadgePipeline`] wires them together.

pub mod avatar;
pub mod badge;
pub mod config;
pub mod error;
pub mod github;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod utils;

pub use avatar::{AvatarResolver, AvatarTier, ImageGenerator};
pub use badge::{parse_badge, strip_code_fence, BadgeResolver};
pub use config::{AvatarStrategy, BadgeProviderKind, Config};
pub use error::{AvatarError, BadgeError, ConfigError, PipelineError, ProfileError};
pub use github::GithubClient;
pub use llm::{build_badge_prompt, BadgeProvider};
pub use models::{AnimeBadge, BadgeCard, GithubRepo, GithubUser, UserProfile};
pub use pipeline::{AvatarSource, BadgePipeline};
