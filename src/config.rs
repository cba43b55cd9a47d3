//! Runtime configuration, read from the environment (and `.env` when present).

use std::{env, path::PathBuf};

use log::LevelFilter;

use crate::consts::{DEFAULT_API_URL, DEFAULT_LOG_FILE, DEFAULT_SESSION_FILE, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: DEFAULT_SESSION_FILE.into(),
            log_file: DEFAULT_LOG_FILE.into(),
            log_level: LevelFilter::Info,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Reads the `HEALTHCARD_*` variables, falling back to the defaults for
    /// anything missing or unparsable. Call `dotenv().ok()` beforehand to pick
    /// up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            api_url: lookup("HEALTHCARD_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            session_file: lookup("HEALTHCARD_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_file),
            log_file: lookup("HEALTHCARD_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            log_level: lookup("HEALTHCARD_LOG_LEVEL")
                .and_then(|level| level.parse().ok())
                .unwrap_or(defaults.log_level),
            timeout_secs: lookup("HEALTHCARD_TIMEOUT_SECS")
                .and_then(|secs| secs.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("HEALTHCARD_API_URL", "https://portal.example.org/api/"),
            ("HEALTHCARD_LOG_LEVEL", "debug"),
            ("HEALTHCARD_TIMEOUT_SECS", "5"),
        ]));

        assert_eq!(config.api_url, "https://portal.example.org/api");
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_garbage_falls_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("HEALTHCARD_LOG_LEVEL", "loud"),
            ("HEALTHCARD_TIMEOUT_SECS", "soon"),
        ]));

        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
