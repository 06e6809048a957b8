use once_cell::sync::Lazy;
use regex::Regex;

const REDACTED: &str = "[REDACTED]";

static BEARER_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bbearer\s+[A-Za-z0-9\-._~+/]+=*").expect("bearer pattern is valid")
});

/// Scrubs configured secrets and anything shaped like a bearer credential.
pub fn redact_secrets(text: &str, secrets: &[&str]) -> String {
    let mut redacted = text.to_string();
    for secret in secrets {
        let secret = secret.trim();
        if !secret.is_empty() {
            redacted = redacted.replace(secret, REDACTED);
        }
    }

    BEARER_TOKEN
        .replace_all(&redacted, format!("Bearer {REDACTED}").as_str())
        .into_owned()
}
