use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        WebConfig {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Server-side cache expiry; browser clients keep their own, longer window.
    #[serde(default = "default_cache_max_age", deserialize_with = "duration")]
    pub cache_max_age: Duration,
    /// Upper bound on each individual source attempt.
    #[serde(default = "default_request_timeout", deserialize_with = "duration")]
    pub request_timeout: Duration,
    /// How often the background task re-runs the aggregator.
    #[serde(default = "default_refresh_interval", deserialize_with = "duration")]
    pub refresh_interval: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            sources: default_sources(),
            cache_dir: default_cache_dir(),
            cache_max_age: default_cache_max_age(),
            request_timeout: default_request_timeout(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_sources() -> Vec<String> {
    vec![
        "https://celestrak.org".to_string(),
        "https://celestrak.com".to_string(),
    ]
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_cache_max_age() -> Duration {
    Duration::from_secs(12 * 3600)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(7)
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(6 * 3600)
}

fn duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Config file is optional; every field has a working default.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Config::from_file(p),
            None => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gets_all_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert_eq!(config.catalog.sources.len(), 2);
        assert_eq!(config.catalog.cache_max_age, Duration::from_secs(12 * 3600));
    }

    #[test]
    fn durations_parse_from_humantime_strings() {
        let yaml = "catalog:\n  cache_max_age: 24h\n  request_timeout: 5s\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.catalog.cache_max_age, Duration::from_secs(24 * 3600));
        assert_eq!(config.catalog.request_timeout, Duration::from_secs(5));
    }
}
