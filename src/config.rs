use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api/v1";

/// Client settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    /// Bearer credential; cookies set by the auth service are sent regardless.
    pub token: Option<String>,
    /// `None` keeps the transport's default.
    pub http_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl Config {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token: None,
            http_timeout: None,
        }
    }

    pub fn from_env() -> Self {
        Self {
            api_url: env::var("COURSEMASTER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into()),
            token: env::var("COURSEMASTER_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            http_timeout: env::var("COURSEMASTER_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| parse_timeout(&s)),
        }
    }
}

fn parse_timeout(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_parsing() {
        assert_eq!(parse_timeout(" 30 "), Some(Duration::from_secs(30)));
        assert_eq!(parse_timeout("0"), None);
        assert_eq!(parse_timeout("soon"), None);
    }

    #[test]
    fn default_points_at_local_api() {
        let c = Config::default();
        assert_eq!(c.api_url, DEFAULT_API_URL);
        assert!(c.token.is_none() && c.http_timeout.is_none());
    }
}
