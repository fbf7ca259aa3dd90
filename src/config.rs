use crate::cache::DEFAULT_TTL;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub api_prefix: String,
    pub database_url: String,
    pub github_api_base_url: String,
    pub github_user_agent: String,
    pub github_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_max_capacity: u64,
    pub messages: ErrorMessages,
}

/// Localized bodies for the `{"error": ...}` responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorMessages {
    pub user: String,
    pub followings: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            user: "Erro ao obter usuario.".to_string(),
            followings: "Erro ao obter followings.".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            api_prefix: "/api".to_string(),
            database_url: "sqlite:./github_followings.db".to_string(),
            github_api_base_url: "https://api.github.com".to_string(),
            github_user_agent: "GithubFollowings/1.0".to_string(),
            github_timeout_secs: 30,
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
            cache_max_capacity: 1000,
            messages: ErrorMessages::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();
        let default_messages = ErrorMessages::default();

        Ok(Config {
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            api_prefix: env::var("API_PREFIX").unwrap_or(defaults.api_prefix),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            github_api_base_url: env::var("GITHUB_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.github_api_base_url),
            github_user_agent: env::var("GITHUB_USER_AGENT")
                .unwrap_or(defaults.github_user_agent),
            github_timeout_secs: parse_var("GITHUB_TIMEOUT_SECS", defaults.github_timeout_secs)?,
            cache_ttl_secs: parse_var("CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            cache_max_capacity: parse_var("CACHE_MAX_CAPACITY", defaults.cache_max_capacity)?,
            messages: ErrorMessages {
                user: env::var("USER_ERROR_MESSAGE").unwrap_or(default_messages.user),
                followings: env::var("FOLLOWINGS_ERROR_MESSAGE")
                    .unwrap_or(default_messages.followings),
            },
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} is not a valid number: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.github_api_base_url, "https://api.github.com");
        assert_eq!(config.cache_ttl_secs, 1800);
        assert_eq!(config.messages.user, "Erro ao obter usuario.");
        assert_eq!(config.messages.followings, "Erro ao obter followings.");
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("GITHUB_FOLLOWINGS_TEST_BAD_NUMBER", "thirty");
        assert!(parse_var::<u64>("GITHUB_FOLLOWINGS_TEST_BAD_NUMBER", 30).is_err());

        env::set_var("GITHUB_FOLLOWINGS_TEST_GOOD_NUMBER", " 45 ");
        assert_eq!(parse_var::<u64>("GITHUB_FOLLOWINGS_TEST_GOOD_NUMBER", 30).unwrap(), 45);

        assert_eq!(parse_var::<u64>("GITHUB_FOLLOWINGS_TEST_UNSET", 30).unwrap(), 30);
    }
}
