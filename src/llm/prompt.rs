use serde::Serialize;

use crate::models::{AnimeBadge, GithubRepo, UserProfile};
use crate::utils::text::truncate_chars;

const BIO_LIMIT: usize = 200;
const DESCRIPTION_LIMIT: usize = 120;
const PROMPT_REPO_LIMIT: usize = 5;
const TOPIC_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
struct ProfileSummary<'a> {
    name: &'a str,
    login: &'a str,
    bio: Option<String>,
    followers: u32,
    public_repos: u32,
    top_repos: Vec<RepoSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct RepoSummary<'a> {
    name: &'a str,
    description: Option<String>,
    language: Option<&'a str>,
    stars: u32,
    topics: &'a [String],
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn summarize_repo(repo: &GithubRepo) -> RepoSummary<'_> {
    RepoSummary {
        name: &repo.name,
        description: non_blank(repo.description.as_deref())
            .map(|text| truncate_chars(text, DESCRIPTION_LIMIT)),
        language: non_blank(repo.language.as_deref()),
        stars: repo.stargazers_count,
        topics: &repo.topics[..repo.topics.len().min(TOPIC_LIMIT)],
    }
}

fn summarize_profile(profile: &UserProfile) -> ProfileSummary<'_> {
    ProfileSummary {
        name: profile.display_name(),
        login: &profile.user.login,
        bio: non_blank(profile.user.bio.as_deref()).map(|text| truncate_chars(text, BIO_LIMIT)),
        followers: profile.user.followers,
        public_repos: profile.user.public_repos,
        top_repos: profile
            .repos
            .iter()
            .take(PROMPT_REPO_LIMIT)
            .map(summarize_repo)
            .collect(),
    }
}

/// Builds the instruction sent to the text model. Pure and deterministic.
pub fn build_badge_prompt(profile: &UserProfile) -> String {
    let summary = serde_json::to_string(&summarize_profile(profile))
        .unwrap_or_else(|_| format!("{{\"login\":{:?}}}", profile.user.login));

    format!(
        "You are an anime expert who matches software developers with anime characters.\n\
Based on the GitHub profile below, pick the anime character whose personality best fits this developer. \
Prefer characters from \"Naruto\" or \"Demon Slayer\".\n\n\
GitHub profile:\n{summary}\n\n\
Respond with ONLY a JSON object in exactly this shape:\n\
{{\"characterName\": \"<character name>\", \"anime\": \"<Naruto or Demon Slayer>\", \
\"reason\": \"<one or two playful sentences linking the developer's work to the character>\", \
\"badgeColor\": \"<hex color like #FF6B00>\"}}\n\
Do not wrap the JSON in markdown or code fences and do not add any other text."
    )
}

/// Builds the image prompt for generated avatars.
pub fn build_avatar_prompt(badge: &AnimeBadge) -> String {
    format!(
        "A circular headshot portrait of {} from the anime \"{}\", modern anime illustration style, \
clean line art, vibrant cel shading, expressive eyes, soft rim lighting, \
with a background and accents themed around the color {}. \
Centered face, simple backdrop, no text, no watermark.",
        badge.character_name.trim(),
        badge.anime.trim(),
        badge.badge_color.trim()
    )
}
