//! Application configuration management
//!
//! This module handles loading and validating configuration from a TOML file,
//! with environment overrides applied on top. Values are validated once, on
//! the merged result, so a later layer can correct an earlier one.

use crate::core::constants::wire;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default audit server base URL
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Config file read when `CONFIG_PATH` is unset
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT: u64 = 90;

/// How the three chart axes without a server-side score are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraAxes {
    /// Fixed demo values, marked as placeholders in the chart
    #[default]
    Placeholder,
    /// Server must score `safety`, `tone` and `accuracy`
    Server,
}

impl ExtraAxes {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "placeholder" | "demo" => Some(ExtraAxes::Placeholder),
            "server" => Some(ExtraAxes::Server),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_request_timeout(),
            endpoint_path: default_endpoint_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChartConfig {
    #[serde(default)]
    pub extra_axes: ExtraAxes,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_endpoint_path() -> String {
    wire::ANALYZE_PATH.to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub chart: ChartConfig,
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Audit server base URL
    pub base_url: String,

    /// Path the submission is posted to
    pub endpoint_path: String,

    /// Logging level
    pub log_level: String,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Chart policy for safety, tone and accuracy
    pub extra_axes: ExtraAxes,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default())
    }
}

impl Config {
    fn from_toml(config: TomlConfig) -> Self {
        Config {
            base_url: config.server.base_url,
            endpoint_path: config.request.endpoint_path,
            log_level: config.server.log_level,
            request_timeout: config.request.timeout_secs,
            extra_axes: config.chart.extra_axes,
        }
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed. Values are not
    /// validated; call `validate` once every override has been applied.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read configuration file")?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).context("Failed to parse TOML configuration")?;
        Ok(Self::from_toml(config))
    }

    /// Load and validate configuration from environment and config file
    ///
    /// Reads `CONFIG_PATH` (default `config.toml`). An explicit `CONFIG_PATH`
    /// must exist; the default file is optional.
    pub fn from_env() -> Result<Self> {
        let config = Self::from_sources(|key| std::env::var(key).ok(), DEFAULT_CONFIG_PATH)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config file named by `CONFIG_PATH` (or `default_path` when
    /// it exists) and apply overrides from `lookup`, without validating
    pub fn from_sources<F, P>(lookup: F, default_path: P) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
        P: AsRef<Path>,
    {
        let default_path = default_path.as_ref();
        let mut config = match lookup("CONFIG_PATH") {
            Some(path) => Self::from_file(&path)
                .with_context(|| format!("Failed to load config from {}", path))?,
            None if default_path.exists() => Self::from_file(default_path).with_context(|| {
                format!("Failed to load config from {}", default_path.display())
            })?,
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Apply `AUDIT_SERVER_URL`, `LOG_LEVEL`, `REQUEST_TIMEOUT` and
    /// `CHART_EXTRA_AXES` overrides from the given lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("AUDIT_SERVER_URL") {
            self.base_url = url;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(timeout) = lookup("REQUEST_TIMEOUT") {
            self.request_timeout = timeout
                .trim()
                .parse()
                .with_context(|| format!("REQUEST_TIMEOUT is not a number: {}", timeout))?;
        }
        if let Some(axes) = lookup("CHART_EXTRA_AXES") {
            self.extra_axes = ExtraAxes::from_str(&axes)
                .context("Invalid CHART_EXTRA_AXES value. Must be one of: placeholder, server")?;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            bail!("Server base URL must start with http:// or https://: {}", self.base_url);
        }
        if self.request_timeout == 0 {
            bail!("Request timeout must be greater than zero");
        }
        if !self.endpoint_path.starts_with('/') {
            bail!("Endpoint path must start with '/': {}", self.endpoint_path);
        }
        Ok(())
    }

    /// Full URL of the analyze endpoint
    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.endpoint_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_config() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [server]
            base_url = "https://audit.internal:9000/"
            log_level = "debug"

            [request]
            timeout_secs = 30

            [chart]
            extra_axes = "server"
        "#
        )
        .unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_config() {
        let file = create_test_config();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "https://audit.internal:9000/");
        assert_eq!(config.request_timeout, 30);
        assert_eq!(config.extra_axes, ExtraAxes::Server);
        assert_eq!(config.endpoint_path, "/analyze");
        assert_eq!(config.analyze_url(), "https://audit.internal:9000/analyze");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.request_timeout, 90);
        assert_eq!(config.extra_axes, ExtraAxes::Placeholder);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_rejects_invalid_values() {
        let invalid = |toml: &str| Config::from_toml_str(toml).unwrap().validate().is_err();
        assert!(invalid("[server]\nbase_url = \"ftp://x\""));
        assert!(invalid("[request]\ntimeout_secs = 0"));
        assert!(invalid("[request]\nendpoint_path = \"analyze\""));
        assert!(Config::from_toml_str("[chart]\nextra_axes = \"random\"").is_err());
    }

    #[test]
    fn test_env_override_repairs_file_value() {
        let mut config = Config::from_toml_str("[server]\nbase_url = \"localhost:8000\"").unwrap();
        assert!(config.validate().is_err());

        config
            .apply_overrides(|key| {
                (key == "AUDIT_SERVER_URL").then(|| "http://localhost:8000".to_string())
            })
            .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_config_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml").to_string_lossy().into_owned();

        let result = Config::from_sources(
            |key| (key == "CONFIG_PATH").then(|| missing.clone()),
            dir.path().join("config.toml"),
        );
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("absent.toml"));
    }

    #[test]
    fn test_missing_default_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config = Config::from_sources(|_| None, dir.path().join("config.toml")).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.request_timeout, 90);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_file_is_read_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[request]\ntimeout_secs = 12\n").unwrap();

        let env: HashMap<&str, &str> = HashMap::from([("LOG_LEVEL", "debug")]);
        let config =
            Config::from_sources(|key| env.get(key).map(|v| v.to_string()), &path).unwrap();
        assert_eq!(config.request_timeout, 12);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("AUDIT_SERVER_URL", "http://localhost:1234"),
            ("REQUEST_TIMEOUT", "5"),
            ("CHART_EXTRA_AXES", "server"),
        ]);
        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.analyze_url(), "http://localhost:1234/analyze");
        assert_eq!(config.request_timeout, 5);
        assert_eq!(config.extra_axes, ExtraAxes::Server);
    }

    #[test]
    fn test_env_override_bad_timeout() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "REQUEST_TIMEOUT").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }
}
