use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::BadgeError;
use crate::llm::{build_badge_prompt, BadgeProvider};
use crate::models::{AnimeBadge, UserProfile};
use crate::utils::text::truncate_for_log;

/// Matches a whole-string Markdown fence; `(?s)` lets the payload span lines.
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A```(?i:json)?[ \t]*\r?\n?(.*?)\s*```\z").expect("fence pattern is valid")
});

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color pattern is valid"));

const REQUIRED_FIELDS: [&str; 4] = ["characterName", "anime", "reason", "badgeColor"];

/// Removes a surrounding ```` ```json ```` fence if the whole text is fenced.
/// Anything else is returned as-is (trimmed).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    CODE_FENCE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|payload| payload.as_str())
        .unwrap_or(trimmed)
}

fn required_string(object: &Map<String, Value>, field: &str) -> Option<String> {
    object
        .get(field)
        .and_then(|value| value.as_str())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Parses generated text into a complete badge or a typed error.
pub fn parse_badge(text: &str) -> Result<AnimeBadge, BadgeError> {
    let payload = strip_code_fence(text);
    let value: Value = serde_json::from_str(payload).map_err(|err| {
        debug!(
            "Badge payload is not JSON ({}): {}",
            err,
            truncate_for_log(payload, 500)
        );
        BadgeError::MalformedResponse
    })?;
    let Some(object) = value.as_object() else {
        debug!("Badge payload is not a JSON object: {}", truncate_for_log(payload, 500));
        return Err(BadgeError::MalformedResponse);
    };

    let fields = REQUIRED_FIELDS.map(|field| required_string(object, field));
    let [Some(character_name), Some(anime), Some(reason), Some(badge_color)] = fields else {
        let missing = REQUIRED_FIELDS
            .iter()
            .zip(&fields)
            .filter(|(_, value)| value.is_none())
            .map(|(field, _)| field.to_string())
            .collect();
        return Err(BadgeError::IncompleteResponse { missing });
    };

    if !HEX_COLOR.is_match(&badge_color) {
        debug!("Badge color is not a #RRGGBB value: {:?}", badge_color);
        return Err(BadgeError::MalformedResponse);
    }

    Ok(AnimeBadge {
        character_name,
        anime,
        reason,
        badge_color,
    })
}

fn validate_profile(profile: &UserProfile) -> Result<(), BadgeError> {
    if profile.user.login.trim().is_empty() {
        return Err(BadgeError::InvalidInput(
            "profile user login must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Asks the configured text model for a persona and validates the answer.
/// Single attempt: failures are returned, never retried.
#[derive(Debug, Clone)]
pub struct BadgeResolver {
    provider: BadgeProvider,
}

impl BadgeResolver {
    pub fn new(config: Arc<Config>, http: Client) -> Self {
        BadgeResolver {
            provider: BadgeProvider::from_config(config, http),
        }
    }

    pub fn with_provider(provider: BadgeProvider) -> Self {
        BadgeResolver { provider }
    }

    pub fn provider(&self) -> &BadgeProvider {
        &self.provider
    }

    pub async fn resolve(&self, profile: &UserProfile) -> Result<AnimeBadge, BadgeError> {
        validate_profile(profile)?;

        let prompt = build_badge_prompt(profile);
        info!(
            "Resolving badge for {} via {} ({})",
            profile.user.login,
            self.provider.name(),
            self.provider.model()
        );

        let text = self.provider.complete_json(&prompt).await?;
        match parse_badge(&text) {
            Ok(badge) => {
                info!(
                    "Badge for {}: {} ({})",
                    profile.user.login, badge.character_name, badge.anime
                );
                Ok(badge)
            }
            Err(err) => {
                warn!("Rejected badge response for {}: {}", profile.user.login, err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::models::{GithubRepo, GithubUser};

    fn profile(login: &str) -> UserProfile {
        UserProfile {
            user: GithubUser {
                login: login.to_string(),
                id: 42,
                avatar_url: String::new(),
                html_url: format!("https://github.com/{login}"),
                name: Some("Hinata Dev".to_string()),
                bio: Some("Quietly shipping compilers.".to_string()),
                public_repos: 3,
                followers: 12,
            },
            repos: vec![GithubRepo {
                id: 7,
                name: "byakugan".to_string(),
                full_name: format!("{login}/byakugan"),
                description: Some("A static analyzer that sees everything".to_string()),
                stargazers_count: 321,
                forks_count: 4,
                language: Some("Rust".to_string()),
                html_url: String::new(),
                topics: vec!["linter".to_string()],
            }],
        }
    }

    fn fixed_badge() -> AnimeBadge {
        AnimeBadge {
            character_name: "Hinata Hyuga".to_string(),
            anime: "Naruto".to_string(),
            reason: "Sees every bug with a Byakugan-grade static analyzer.".to_string(),
            badge_color: "#7B68EE".to_string(),
        }
    }

    fn completion(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }

    fn resolver_for(server: &MockServer, timeout: Duration) -> BadgeResolver {
        let config = Config {
            openrouter_api_key: Some("sk-or-test-secret".to_string()),
            openrouter_base_url: server.uri(),
            openrouter_model: "test/model".to_string(),
            request_timeout: timeout,
            ..Config::default()
        };
        BadgeResolver::new(Arc::new(config), Client::new())
    }

    #[test]
    fn strips_multiline_json_fence_exactly() {
        let fenced = "```json\n{\"a\":1}\n{\"b\":2}\n```";
        assert_eq!(strip_code_fence(fenced), "{\"a\":1}\n{\"b\":2}");
    }

    #[test]
    fn fence_stripping_is_idempotent() {
        let fenced = "```json\n{\n  \"anime\": \"Naruto\"\n}\n```";
        let once = strip_code_fence(fenced);
        assert_eq!(strip_code_fence(once), once);
    }

    #[test]
    fn strips_untagged_and_single_line_fences() {
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  ```JSON\n{\"a\":1}```  "), "{\"a\":1}");
    }

    #[test]
    fn leaves_unfenced_or_partially_fenced_text_alone() {
        assert_eq!(strip_code_fence(" {\"a\":1} "), "{\"a\":1}");
        let chatty = "Here you go:\n```json\n{\"a\":1}\n```";
        assert_eq!(strip_code_fence(chatty), chatty);
    }

    #[test]
    fn parses_fenced_multiline_badge() {
        let text = "```json\n{\n  \"characterName\": \"Tanjiro Kamado\",\n  \"anime\": \"Demon Slayer\",\n  \"reason\": \"Never gives up on a failing build.\",\n  \"badgeColor\": \"#1e90ff\"\n}\n```";
        let badge = parse_badge(text).unwrap();
        assert_eq!(badge.character_name, "Tanjiro Kamado");
        assert_eq!(badge.badge_color, "#1e90ff");
    }

    #[test]
    fn accepts_series_outside_the_suggested_pair() {
        let badge = parse_badge(
            r##"{"characterName":"Levi","anime":"Attack on Titan","reason":"Clean code.","badgeColor":"#333333"}"##,
        )
        .unwrap();
        assert_eq!(badge.anime, "Attack on Titan");
    }

    #[test]
    fn blank_or_non_string_fields_count_as_missing() {
        let err = parse_badge(
            r##"{"characterName":"  ","anime":"Naruto","reason":42,"badgeColor":"#FFAA00"}"##,
        )
        .unwrap_err();
        match err {
            BadgeError::IncompleteResponse { missing } => {
                assert_eq!(missing, vec!["characterName", "reason"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_color_and_non_objects_are_malformed() {
        let err = parse_badge(
            r#"{"characterName":"Gaara","anime":"Naruto","reason":"Sandboxed.","badgeColor":"red"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, BadgeError::MalformedResponse));
        assert!(matches!(parse_badge("[1,2,3]"), Err(BadgeError::MalformedResponse)));
        assert!(matches!(parse_badge("not json at all"), Err(BadgeError::MalformedResponse)));
    }

    #[tokio::test]
    async fn echoed_badge_round_trips() {
        let server = MockServer::start().await;
        let body = serde_json::to_string(&fixed_badge()).unwrap();
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-or-test-secret"))
            .and(body_partial_json(json!({
                "model": "test/model",
                "response_format": { "type": "json_object" }
            })))
            .respond_with(completion(&body))
            .expect(1)
            .mount(&server)
            .await;

        let badge = resolver_for(&server, Duration::from_secs(5))
            .resolve(&profile("hinata-dev"))
            .await
            .unwrap();
        assert_eq!(badge, fixed_badge());
    }

    #[tokio::test]
    async fn prompt_carries_profile_summary() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion(&serde_json::to_string(&fixed_badge()).unwrap()))
            .mount(&server)
            .await;

        resolver_for(&server, Duration::from_secs(5))
            .resolve(&profile("hinata-dev"))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap_or_default();
        assert_eq!(requests.len(), 1);
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let content = sent["messages"][0]["content"].as_str().unwrap_or_default();
        assert!(content.contains("\"login\":\"hinata-dev\""));
        assert!(content.contains("\"name\":\"byakugan\""));
    }

    #[tokio::test]
    async fn missing_badge_color_is_incomplete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion(
                r#"{"characterName":"Naruto Uzumaki","anime":"Naruto","reason":"Believe it."}"#,
            ))
            .mount(&server)
            .await;

        let err = resolver_for(&server, Duration::from_secs(5))
            .resolve(&profile("ramen-lover"))
            .await
            .unwrap_err();
        match &err {
            BadgeError::IncompleteResponse { missing } => assert_eq!(missing, &vec!["badgeColor"]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("badgeColor"));
    }

    #[tokio::test]
    async fn too_many_requests_is_upstream_429() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "Rate limited. Authorization: Bearer sk-or-test-secret" }
            })))
            .mount(&server)
            .await;

        let err = resolver_for(&server, Duration::from_secs(5))
            .resolve(&profile("octocat"))
            .await
            .unwrap_err();
        assert!(matches!(err, BadgeError::Upstream { status: 429, .. }));
        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(!message.contains("sk-or-test-secret"));
    }

    #[tokio::test]
    async fn slow_provider_times_out_and_is_abandoned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                completion(&serde_json::to_string(&fixed_badge()).unwrap())
                    .set_delay(Duration::from_secs(5)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let started = Instant::now();
        let err = resolver_for(&server, Duration::from_millis(200))
            .resolve(&profile("octocat"))
            .await
            .unwrap_err();

        assert!(matches!(err, BadgeError::Timeout(_)), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(3));

        tokio::time::sleep(Duration::from_millis(300)).await;
        let requests = server.received_requests().await.unwrap_or_default();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn blank_login_is_rejected_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion("{}"))
            .expect(0)
            .mount(&server)
            .await;

        let err = resolver_for(&server, Duration::from_secs(5))
            .resolve(&profile("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, BadgeError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn prose_response_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion("You are clearly Rock Lee! Hard work beats talent."))
            .mount(&server)
            .await;

        let err = resolver_for(&server, Duration::from_secs(5))
            .resolve(&profile("octocat"))
            .await
            .unwrap_err();
        assert!(matches!(err, BadgeError::MalformedResponse));
        assert_eq!(err.to_string(), "The AI provider returned an invalid response");
    }
}
