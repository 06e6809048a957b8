use std::sync::Arc;

use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ProfileError;
use crate::models::{GithubRepo, GithubUser, UserProfile};
use crate::utils::http::endpoint_url;
use crate::utils::redact::redact_secrets;
use crate::utils::text::truncate_for_log;

pub const TOP_REPO_COUNT: usize = 10;
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const RATE_LIMIT_MARKER: &str = "rate limit";

#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    config: Arc<Config>,
}

fn is_rate_limited(status: StatusCode, headers: &HeaderMap, body: &str) -> bool {
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return false;
    }
    let quota_exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim() == "0")
        .unwrap_or(false);
    quota_exhausted || body.to_lowercase().contains(RATE_LIMIT_MARKER)
}

impl GithubClient {
    pub fn new(config: Arc<Config>, http: Client) -> Self {
        GithubClient { http, config }
    }

    fn with_auth_headers(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header(ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", "2022-11-28")
            .timeout(self.config.request_timeout);
        match self.config.github_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        }
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ProfileError {
        if err.is_timeout() {
            return ProfileError::Timeout(self.config.request_timeout);
        }
        if err.is_decode() {
            debug!("GitHub response could not be decoded: {}", err);
            return ProfileError::MalformedResponse;
        }
        ProfileError::Network(redact_secrets(&err.to_string(), &self.config.secrets()))
    }

    async fn check_status(
        &self,
        response: Response,
        missing_user: Option<&str>,
    ) -> Result<Response, ProfileError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(username) = missing_user {
                return Err(ProfileError::NotFound(username.to_string()));
            }
        }

        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        if is_rate_limited(status, &headers, &body) {
            warn!("GitHub rate limit reached: status={}", status);
            return Err(ProfileError::RateLimited);
        }

        warn!(
            "GitHub API error: status={}, body={}",
            status,
            truncate_for_log(&redact_secrets(&body, &self.config.secrets()), 500)
        );
        Err(ProfileError::Upstream {
            status: status.as_u16(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        missing_user: Option<&str>,
    ) -> Result<T, ProfileError> {
        let url = endpoint_url(&self.config.github_api_url, "GITHUB_API_URL", segments)?;
        let request = self.with_auth_headers(self.http.get(url).query(query));
        let response = request
            .send()
            .await
            .map_err(|err| self.map_transport_error(err))?;
        let response = self.check_status(response, missing_user).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| self.map_transport_error(err))
    }

    pub async fn fetch_user(&self, username: &str) -> Result<GithubUser, ProfileError> {
        self.get_json(&["users", username], &[], Some(username)).await
    }

    /// Owned repositories, most-starred first. GitHub answers 404 here only
    /// when the user itself does not exist.
    pub async fn fetch_top_repos(&self, username: &str) -> Result<Vec<GithubRepo>, ProfileError> {
        let per_page = TOP_REPO_COUNT.to_string();
        self.get_json(
            &["users", username, "repos"],
            &[
                ("type", "owner"),
                ("sort", "stars"),
                ("per_page", per_page.as_str()),
                ("direction", "desc"),
            ],
            Some(username),
        )
        .await
    }

    /// Fetches the user and their top repositories concurrently. Both must
    /// succeed; the first failure cancels the other request.
    pub async fn fetch_profile(&self, username: &str) -> Result<UserProfile, ProfileError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ProfileError::BlankUsername);
        }

        info!("Fetching GitHub profile for {}", username);
        let (user, repos) =
            tokio::try_join!(self.fetch_user(username), self.fetch_top_repos(username))?;
        debug!(
            "Fetched GitHub profile for {}: {} repos",
            user.login,
            repos.len()
        );

        Ok(UserProfile { user, repos })
    }
}
