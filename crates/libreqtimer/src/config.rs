//! TOML configuration for reqtimer runs

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReqtimerError, Result};

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default poll interval: one minute
pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 60.0;

/// Default poll duration: five hours
pub const DEFAULT_POLL_DURATION_SECS: f64 = 5.0 * 60.0 * 60.0;

/// Top-level config file. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReqtimerConfig {
    #[serde(default)]
    pub request: RequestSpec,
    #[serde(default)]
    pub bench: BenchSettings,
    #[serde(default)]
    pub poll: PollSettings,
}

/// The request replayed on every iteration or tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// HTTP method, defaults to GET
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Sent as the `cookie` header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl RequestSpec {
    pub fn method_or_default(&self) -> &str {
        self.method.as_deref().unwrap_or("GET")
    }

    pub fn timeout_secs_or_default(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// The configured URL, or an error naming the missing setting
    pub fn require_url(&self) -> Result<&str> {
        self.url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ReqtimerError::InvalidArgs("no request url configured".to_string()))
    }
}

/// Settings for `reqtimer bench`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchSettings {
    /// Number of sequential requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// Settings for `reqtimer poll`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl PollSettings {
    pub fn interval_secs_or_default(&self) -> f64 {
        self.interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
    }

    pub fn duration_secs_or_default(&self) -> f64 {
        self.duration_secs.unwrap_or(DEFAULT_POLL_DURATION_SECS)
    }
}

/// Load a config file
pub fn load_config(path: &Path) -> Result<ReqtimerConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ReqtimerConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save a config file, creating parent directories as needed
pub fn save_config(path: &Path, config: &ReqtimerConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [request]
            url = "https://example.com/api/v1/heatmap"
            method = "POST"
            cookie = "_session=abc"
            body = "{}"
            timeout_secs = 5

            [request.headers]
            accept = "application/json"

            [bench]
            count = 50

            [poll]
            interval_secs = 60
            duration_secs = 18000
        "#;

        let config: ReqtimerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.request.require_url().unwrap(), "https://example.com/api/v1/heatmap");
        assert_eq!(config.request.method_or_default(), "POST");
        assert_eq!(config.request.headers.get("accept").unwrap(), "application/json");
        assert_eq!(config.request.timeout_secs_or_default(), 5);
        assert_eq!(config.bench.count, Some(50));
        assert_eq!(config.poll.interval_secs, Some(60.0));
        assert_eq!(config.poll.duration_secs, Some(18000.0));
    }

    #[test]
    fn test_empty_config_defaults() {
        let config: ReqtimerConfig = toml::from_str("").unwrap();
        assert_eq!(config, ReqtimerConfig::default());
        assert_eq!(config.request.method_or_default(), "GET");
        assert_eq!(config.request.timeout_secs_or_default(), DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.poll.interval_secs_or_default(), 60.0);
        assert_eq!(config.poll.duration_secs_or_default(), 18000.0);
    }

    #[test]
    fn test_missing_url() {
        let spec = RequestSpec::default();
        assert!(matches!(spec.require_url(), Err(ReqtimerError::InvalidArgs(_))));

        let spec = RequestSpec {
            url: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(spec.require_url().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("reqtimer.toml");

        let mut config = ReqtimerConfig::default();
        config.request.url = Some("http://localhost:8080/health".to_string());
        config.request.headers.insert("x-trace".to_string(), "1".to_string());
        config.bench.count = Some(25);
        config.poll.interval_secs = Some(1.5);

        save_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[bench]\ncount = \"many\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ReqtimerError::TomlParse(_)));
    }
}
