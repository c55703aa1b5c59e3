//! Runtime configuration read from the process environment.
//!
//! # Environment Variables
//!
//! - `LAMBDA_TASK_ROOT`: set by the Lambda runtime; its absence keeps the
//!   entry detached (see [`crate::LambdaEntry`])
//! - `LOG_FORMAT`: output format, either `json` (default) or `text`
//! - `RUST_LOG`: log level filter (default: `info`)
//! - `AWS_LAMBDA_FUNCTION_NAME`: function name attached to log output

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Variable whose presence marks the Lambda execution environment.
pub const TASK_ROOT_VAR: &str = "LAMBDA_TASK_ROOT";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON structured logging (default, CloudWatch).
    #[default]
    Json,
    /// Human-readable text logging (local runs).
    Text,
}

impl LogFormat {
    /// Map a `LOG_FORMAT` value to a format. `text` and `pretty` select
    /// human-readable output, any other value keeps JSON.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Log level filter used when `RUST_LOG` is not set (e.g. "info", "debug").
    pub level: String,
    /// Function name included in log entries.
    pub service: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "info".to_string(),
            service: None,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let format = lookup("LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or_default();
        let level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());
        let service = lookup("AWS_LAMBDA_FUNCTION_NAME");

        Self {
            format,
            level,
            service,
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }
}

/// Environment the entry orchestrator runs in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Root of the deployed function; `None` outside of Lambda.
    pub task_root: Option<PathBuf>,
    pub logging: LoggingConfig,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let task_root = lookup(TASK_ROOT_VAR)
            .filter(|root| !root.is_empty())
            .map(PathBuf::from);

        Self {
            task_root,
            logging: LoggingConfig::from_lookup(lookup),
        }
    }

    /// Configuration of a function running inside Lambda at `task_root`.
    pub fn lambda(task_root: impl AsRef<Path>) -> Self {
        Self {
            task_root: Some(task_root.as_ref().to_path_buf()),
            logging: LoggingConfig::default(),
        }
    }

    /// Configuration of a local run (tests, tooling).
    pub fn local() -> Self {
        Self::default()
    }

    pub fn is_lambda(&self) -> bool {
        self.task_root.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn log_format_is_json_unless_text_is_asked_for() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("TEXT"), LogFormat::Text);
        assert_eq!(LogFormat::parse("Pretty"), LogFormat::Text);
        assert_eq!(LogFormat::parse("unknown"), LogFormat::Json);
        assert_eq!(LogFormat::parse(""), LogFormat::Json);
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
        assert!(config.service.is_none());
    }

    #[test]
    fn test_logging_config_from_lookup() {
        let config = LoggingConfig::from_lookup(lookup(&[
            ("LOG_FORMAT", "text"),
            ("RUST_LOG", "debug"),
            ("AWS_LAMBDA_FUNCTION_NAME", "greeter"),
        ]));
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.level, "debug");
        assert_eq!(config.service.as_deref(), Some("greeter"));
    }

    #[test]
    fn test_task_root_marks_lambda_environment() {
        let config = RuntimeConfig::from_lookup(lookup(&[("LAMBDA_TASK_ROOT", "/var/task")]));
        assert!(config.is_lambda());
        assert_eq!(config.task_root, Some(PathBuf::from("/var/task")));

        let config = RuntimeConfig::from_lookup(lookup(&[]));
        assert!(!config.is_lambda());

        let config = RuntimeConfig::from_lookup(lookup(&[("LAMBDA_TASK_ROOT", "")]));
        assert!(!config.is_lambda());
    }

    #[test]
    fn test_constructors() {
        assert!(RuntimeConfig::lambda("/").is_lambda());
        assert!(!RuntimeConfig::local().is_lambda());
        assert_eq!(
            LoggingConfig::default().with_service("route").service,
            Some("route".to_string())
        );
    }
}
