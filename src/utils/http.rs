use reqwest::Client;
use url::Url;

use crate::error::ConfigError;

const USER_AGENT: &str = concat!("github-anime-badge/", env!("CARGO_PKG_VERSION"));

/// Shared client for every component. Timeouts are applied per request so each
/// upstream call is bounded by its own deadline.
pub fn build_http_client() -> reqwest::Result<Client> {
    Client::builder().user_agent(USER_AGENT).build()
}

/// Appends path segments to a configured base URL, percent-encoding each one.
pub fn endpoint_url(
    base: &str,
    setting: &'static str,
    segments: &[&str],
) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        name: setting,
        value: base.to_string(),
    };
    let mut url = Url::parse(base.trim()).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
