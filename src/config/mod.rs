//! Configuration management for `issue_tracker`.
//!
//! Configuration is resolved in layers, later layers winning:
//! - Built-in defaults
//! - YAML file (`--config <path>` or `./issue-tracker.yaml`)
//! - Environment variable overrides
//! - CLI flag overrides

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiConfig;
use crate::logging::LogFormat;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "issue-tracker.yaml";

pub const ENV_BIND: &str = "ISSUE_TRACKER_BIND";
pub const ENV_PORT: &str = "PORT";
pub const ENV_DATA: &str = "ISSUE_TRACKER_DATA";
pub const ENV_LOG_FORMAT: &str = "ISSUE_TRACKER_LOG_FORMAT";

/// Errors raised while resolving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Effective server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
    /// JSONL file backing the store; in-memory only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
    pub log_format: LogFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency_limit: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            data_path: None,
            log_format: LogFormat::Text,
            request_timeout_secs: None,
            concurrency_limit: None,
        }
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind: Option<String>,
    pub data: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
}

impl ServerConfig {
    /// Router limits derived from this configuration.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            request_timeout: self
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            concurrency_limit: self.concurrency_limit.filter(|limit| *limit > 0),
        }
    }

    /// Render as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    fn apply_env(
        &mut self,
        env: &impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(bind) = env(ENV_BIND).filter(|v| !v.trim().is_empty()) {
            self.bind = bind.trim().to_string();
        }
        if let Some(port) = env(ENV_PORT).filter(|v| !v.trim().is_empty()) {
            let port: u16 = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_PORT,
                value: port.clone(),
            })?;
            self.bind = with_port(&self.bind, port);
        }
        if let Some(data) = env(ENV_DATA).filter(|v| !v.trim().is_empty()) {
            self.data_path = Some(PathBuf::from(data));
        }
        if let Some(format) = env(ENV_LOG_FORMAT).filter(|v| !v.trim().is_empty()) {
            self.log_format = match format.trim().to_ascii_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: ENV_LOG_FORMAT,
                        value: format,
                    });
                }
            };
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(bind) = &overrides.bind {
            self.bind.clone_from(bind);
        }
        if let Some(data) = &overrides.data {
            self.data_path = Some(data.clone());
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
    }
}

/// Replace the port of a `host:port` bind address.
fn with_port(bind: &str, port: u16) -> String {
    let host = bind.rsplit_once(':').map_or(bind, |(host, _)| host);
    let host = if host.is_empty() { "0.0.0.0" } else { host };
    format!("{host}:{port}")
}

fn read_file(path: &Path) -> Result<ServerConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(ServerConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load configuration from file, process environment and CLI overrides.
///
/// # Errors
///
/// Returns an error if an explicit config file is missing, any config file
/// fails to parse, or an environment value is invalid.
pub fn load(explicit: Option<&Path>, overrides: &CliOverrides) -> Result<ServerConfig, ConfigError> {
    load_with_env(explicit, overrides, |key| std::env::var(key).ok())
}

/// Like [`load`], with the environment supplied by `env`.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env(
    explicit: Option<&Path>,
    overrides: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ServerConfig, ConfigError> {
    let mut config = match explicit {
        Some(path) => read_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.is_file() {
                read_file(default_path)?
            } else {
                ServerConfig::default()
            }
        }
    };

    config.apply_env(&env)?;
    config.apply_overrides(overrides);
    tracing::debug!(?config, "Resolved configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "0.0.0.0:3000");
        assert!(config.data_path.is_none());
        assert_eq!(config.api_config().request_timeout, None);
        assert_eq!(config.api_config().concurrency_limit, None);
    }

    #[test]
    fn test_yaml_file_layer() {
        let file = yaml_file(
            "bind: 127.0.0.1:8080\ndata_path: /tmp/issues.jsonl\nlog_format: json\nrequest_timeout_secs: 5\nconcurrency_limit: 32\n",
        );
        let config = load_with_env(Some(file.path()), &CliOverrides::default(), no_env).unwrap();
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.data_path, Some(PathBuf::from("/tmp/issues.jsonl")));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.api_config().request_timeout,
            Some(Duration::from_secs(5))
        );
        assert_eq!(config.api_config().concurrency_limit, Some(32));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let file = yaml_file("");
        let config = load_with_env(Some(file.path()), &CliOverrides::default(), no_env).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let file = yaml_file("bnd: 1.2.3.4:1\n");
        let err = load_with_env(Some(file.path()), &CliOverrides::default(), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_explicit_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = load_with_env(Some(&missing), &CliOverrides::default(), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = yaml_file("bind: 127.0.0.1:8080\nlog_format: text\n");
        let env = env_from(&[
            (ENV_BIND, "10.0.0.1:9000"),
            (ENV_DATA, "/data/t.jsonl"),
            (ENV_LOG_FORMAT, "JSON"),
        ]);
        let config = load_with_env(Some(file.path()), &CliOverrides::default(), env).unwrap();
        assert_eq!(config.bind, "10.0.0.1:9000");
        assert_eq!(config.data_path, Some(PathBuf::from("/data/t.jsonl")));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_port_env_replaces_port_only() {
        let file = yaml_file("bind: 127.0.0.1:8080\n");
        let env = env_from(&[(ENV_PORT, "4321")]);
        let config = load_with_env(Some(file.path()), &CliOverrides::default(), env).unwrap();
        assert_eq!(config.bind, "127.0.0.1:4321");
    }

    #[test]
    fn test_invalid_port_env() {
        let file = yaml_file("");
        let env = env_from(&[(ENV_PORT, "http")]);
        let err = load_with_env(Some(file.path()), &CliOverrides::default(), env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: ENV_PORT, .. }));
    }

    #[test]
    fn test_cli_overrides_win() {
        let file = yaml_file("bind: 127.0.0.1:8080\n");
        let env = env_from(&[(ENV_BIND, "10.0.0.1:9000")]);
        let overrides = CliOverrides {
            bind: Some("0.0.0.0:1234".into()),
            data: Some(PathBuf::from("cli.jsonl")),
            log_format: Some(LogFormat::Json),
        };
        let config = load_with_env(Some(file.path()), &overrides, env).unwrap();
        assert_eq!(config.bind, "0.0.0.0:1234");
        assert_eq!(config.data_path, Some(PathBuf::from("cli.jsonl")));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_zero_limits_disable_layers() {
        let config = ServerConfig {
            request_timeout_secs: Some(0),
            concurrency_limit: Some(0),
            ..ServerConfig::default()
        };
        let api = config.api_config();
        assert!(api.request_timeout.is_none());
        assert!(api.concurrency_limit.is_none());
    }

    #[test]
    fn test_with_port() {
        assert_eq!(with_port("127.0.0.1:80", 81), "127.0.0.1:81");
        assert_eq!(with_port("[::1]:80", 81), "[::1]:81");
        assert_eq!(with_port("localhost", 81), "localhost:81");
        assert_eq!(with_port(":80", 81), "0.0.0.0:81");
    }

    #[test]
    fn test_yaml_output_round_trips() {
        let config = ServerConfig {
            data_path: Some(PathBuf::from("issues.jsonl")),
            ..ServerConfig::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("0.0.0.0:3000"));
        assert!(yaml.contains("log_format: text"));
        let back: ServerConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }
}
