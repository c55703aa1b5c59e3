//! Test utilities for Lambda function testing.
//!
//! Available in this crate's tests and, through the `test-utils` feature, in
//! the tests of crates that define functions.
//!
//! ```ignore
//! use lambdakit::test_utils::{lambda_config, mock_context, proxy_event};
//!
//! let entry = LambdaEntry::<MyFunction>::with_config(&lambda_config())?;
//! let response = entry.invoke(json!({ "body": "{}" }), mock_context("1")).await;
//! ```

use std::fmt;
use std::sync::Mutex;

use serde_json::Value;

use crate::config::RuntimeConfig;
use crate::error_handler::BoxError;
use crate::event::{InvocationContext, ProxyEvent};
use crate::logger::RequestLogger;

/// Task root used by [`lambda_config`].
pub const TEST_TASK_ROOT: &str = "/var/task";

/// Logger recording every line as `"LEVEL message"`.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<String>>,
    attach_failure: Option<String>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A logger whose `attach_request` fails with `message`.
    pub fn failing_attach(message: impl Into<String>) -> Self {
        Self {
            lines: Mutex::default(),
            attach_failure: Some(message.into()),
        }
    }

    /// Recorded lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    fn record(&self, level: &str, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(format!("{level} {message}"));
        }
    }
}

impl RequestLogger for RecordingLogger {
    fn info(&self, message: &str, _payload: Option<&dyn fmt::Debug>) {
        self.record("INFO", message);
    }

    fn warn(&self, message: &str, _payload: Option<&dyn fmt::Debug>) {
        self.record("WARN", message);
    }

    fn error(&self, message: &str, _payload: Option<&dyn fmt::Debug>) {
        self.record("ERROR", message);
    }

    fn attach_request(
        &self,
        _event: &ProxyEvent,
        _context: &InvocationContext,
    ) -> Result<(), BoxError> {
        match &self.attach_failure {
            Some(message) => Err(message.clone().into()),
            None => Ok(()),
        }
    }
}

/// Create a mock request ID for testing.
///
/// Returns a request ID string in the format "test-request-{suffix}".
pub fn mock_request_id(suffix: &str) -> String {
    format!("test-request-{}", suffix)
}

/// Invocation context carrying [`mock_request_id`] for `suffix`.
///
/// `lambda_runtime::Context` is non-exhaustive, so tests build the crate's
/// own [`InvocationContext`] instead.
pub fn mock_context(suffix: &str) -> InvocationContext {
    InvocationContext {
        request_id: mock_request_id(suffix),
        invoked_function_arn: "arn:aws:lambda:us-east-1:000000000000:function:test".to_string(),
        deadline_ms: 0,
        xray_trace_id: None,
    }
}

/// Configuration of an entry running inside Lambda.
pub fn lambda_config() -> RuntimeConfig {
    RuntimeConfig::lambda(TEST_TASK_ROOT)
}

/// Configuration of an entry running outside Lambda.
pub fn local_config() -> RuntimeConfig {
    RuntimeConfig::local()
}

/// Decode a proxy event from a JSON literal.
pub fn proxy_event(value: Value) -> ProxyEvent {
    serde_json::from_value(value).expect("test event should decode as a proxy event")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mock_request_id_formats_correctly() {
        assert_eq!(mock_request_id("123"), "test-request-123");
        assert_eq!(mock_context("abc").request_id, "test-request-abc");
    }

    #[test]
    fn recording_logger_keeps_order() {
        let logger = RecordingLogger::new();
        logger.info("one", None);
        logger.error("two", Some(&3));
        assert_eq!(logger.lines(), vec!["INFO one", "ERROR two"]);
    }

    #[test]
    fn failing_attach_reports_its_message() {
        let logger = RecordingLogger::failing_attach("no request scope");
        let error = logger
            .attach_request(&ProxyEvent::default(), &mock_context("1"))
            .unwrap_err();
        assert_eq!(error.to_string(), "no request scope");
    }

    #[test]
    fn configs_differ_in_environment() {
        assert!(lambda_config().is_lambda());
        assert!(!local_config().is_lambda());
        assert_eq!(
            proxy_event(json!({ "headers": { "A": "b" } })).header("a"),
            Some("b")
        );
    }
}
