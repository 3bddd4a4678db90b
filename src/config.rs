use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// Defaults shipped inside the binary for mobile and web builds.
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/chatbot";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime settings for the chat client, read from the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatConfig {
    pub endpoint: String,
    /// Page that hands out the backend's session cookie. `None` skips the handshake.
    pub session_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            session_url: default_session_url(DEFAULT_ENDPOINT),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl ChatConfig {
    /// Process environment first, bundled `config.env` second.
    pub fn load() -> Self {
        let bundled = parse_env_file(BUNDLED_CONFIG);
        Self::from_lookup(|key| env::var(key).ok().or_else(|| bundled.get(key).cloned()))
    }

    /// Build a config from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let endpoint = lookup("CHATBOT_ENDPOINT")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let session_url = if is_truthy(lookup("CHATBOT_NO_SESSION").as_deref()) {
            None
        } else {
            lookup("CHATBOT_SESSION_URL")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .or_else(|| default_session_url(&endpoint))
        };

        let timeout = parse_timeout(lookup("CHATBOT_TIMEOUT_SECS").as_deref());

        Self {
            endpoint,
            session_url,
            timeout,
        }
    }
}

fn parse_env_file(contents: &str) -> HashMap<String, String> {
    dotenvy::from_read_iter(contents.as_bytes())
        .filter_map(|entry| match entry {
            Ok(pair) => Some(pair),
            Err(err) => {
                tracing::warn!(error = %err, "skipping bundled config line");
                None
            }
        })
        .collect()
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

fn parse_timeout(raw: Option<&str>) -> Option<Duration> {
    let Some(raw) = raw else {
        return Some(DEFAULT_TIMEOUT);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => None,
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            tracing::warn!(value = raw, "invalid CHATBOT_TIMEOUT_SECS, using default");
            Some(DEFAULT_TIMEOUT)
        }
    }
}

/// The backend issues its session cookie from the site root.
/// The browser already holds that cookie when the page is served from there.
#[cfg(not(target_arch = "wasm32"))]
fn default_session_url(endpoint: &str) -> Option<String> {
    let url = reqwest::Url::parse(endpoint).ok()?;
    url.join("/").ok().map(String::from)
}

#[cfg(target_arch = "wasm32")]
fn default_session_url(_endpoint: &str) -> Option<String> {
    None
}
