pub mod gemini;
pub mod openrouter;
pub mod prompt;
pub mod provider;

pub use prompt::{build_avatar_prompt, build_badge_prompt};
pub use provider::BadgeProvider;
