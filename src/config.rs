use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use tracing::warn;

use crate::llm::ollama::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL};

pub const DEFAULT_FETCH_INTERVAL_MINUTES: u64 = 60;
pub const DEFAULT_DIGEST_DAYS: u32 = 7;

/// Central configuration loaded from environment variables.
///
/// The bearer token comes from the environment only (never hardcoded). The
/// .env file is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// X API v2 app-only bearer token.
    pub bearer_token: String,
    pub db_path: String,
    /// Ollama server for `digest --smart`.
    pub llm_url: String,
    pub llm_model: String,
    /// Minutes between daemon fetch cycles.
    pub fetch_interval_minutes: u64,
    /// Default digest window when `--days` isn't given.
    pub digest_days: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the bearer token, which is only
    /// required by commands that talk to the X API.
    pub fn load() -> Result<Self> {
        Ok(Self::from_lookup(|name| env::var(name).ok()))
    }

    /// Build a config from any variable lookup. `load` passes the process
    /// environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| get(name).filter(|v| !v.trim().is_empty());

        Self {
            bearer_token: non_empty("X_BEARER_TOKEN").unwrap_or_default(),
            db_path: non_empty("XMON_DB_PATH").unwrap_or_else(default_db_path),
            llm_url: non_empty("XMON_LLM_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            llm_model: non_empty("XMON_LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            fetch_interval_minutes: parse_or_default(
                "XMON_FETCH_INTERVAL",
                non_empty("XMON_FETCH_INTERVAL"),
                DEFAULT_FETCH_INTERVAL_MINUTES,
            ),
            digest_days: parse_or_default(
                "XMON_DIGEST_DAYS",
                non_empty("XMON_DIGEST_DAYS"),
                DEFAULT_DIGEST_DAYS,
            ),
        }
    }

    /// Check that the X API bearer token is configured.
    /// Call this before any operation that hits the X API.
    pub fn require_bearer_token(&self) -> Result<()> {
        if self.bearer_token.is_empty() {
            anyhow::bail!(
                "X_BEARER_TOKEN not set. Add it to your .env file.\n\
                 Create an app at https://developer.x.com to get a bearer token."
            );
        }
        Ok(())
    }
}

/// ~/.xmon/xmon.db, or ./xmon.db when there's no home directory.
pub fn default_db_path() -> String {
    dirs::home_dir()
        .map(|home| home.join(".xmon").join("xmon.db"))
        .unwrap_or_else(|| PathBuf::from("xmon.db"))
        .to_string_lossy()
        .into_owned()
}

fn parse_or_default<T>(name: &str, value: Option<String>, default: T) -> T
where
    T: FromStr + PartialOrd + Default + Copy + std::fmt::Display,
{
    let Some(raw) = value else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(parsed) if parsed > T::default() => parsed,
        _ => {
            warn!(
                variable = name,
                value = %raw,
                "Invalid value, using default {}",
                default
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert!(config.bearer_token.is_empty());
        assert!(config.db_path.ends_with("xmon.db"));
        assert_eq!(config.llm_url, "http://localhost:11434");
        assert_eq!(config.llm_model, "llama3.2");
        assert_eq!(config.fetch_interval_minutes, 60);
        assert_eq!(config.digest_days, 7);
        assert!(config.require_bearer_token().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("X_BEARER_TOKEN", "abc"),
            ("XMON_DB_PATH", "/tmp/x.db"),
            ("XMON_LLM_MODEL", "mistral"),
            ("XMON_FETCH_INTERVAL", "15"),
            ("XMON_DIGEST_DAYS", "3"),
        ]);
        assert!(config.require_bearer_token().is_ok());
        assert_eq!(config.db_path, "/tmp/x.db");
        assert_eq!(config.llm_model, "mistral");
        assert_eq!(config.fetch_interval_minutes, 15);
        assert_eq!(config.digest_days, 3);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[("XMON_FETCH_INTERVAL", "soon"), ("XMON_DIGEST_DAYS", "0")]);
        assert_eq!(config.fetch_interval_minutes, 60);
        assert_eq!(config.digest_days, 7);
    }
}
