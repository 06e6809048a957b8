use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubUser {
    pub login: String,
    pub id: u64,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubRepo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Snapshot of one GitHub account taken for a single search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: GithubUser,
    pub repos: Vec<GithubRepo>,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.user
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.user.login)
    }
}

/// The persona assigned to a profile. Only the badge resolver builds these
/// from untrusted text, and it rejects anything incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeBadge {
    pub character_name: String,
    pub anime: String,
    pub reason: String,
    pub badge_color: String,
}

/// Everything a UI needs to render one search result.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeCard {
    pub profile: UserProfile,
    pub badge: AnimeBadge,
    pub avatar: Option<String>,
}
