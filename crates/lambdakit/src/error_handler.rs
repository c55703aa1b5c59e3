//! Conversion of failures into responses.
//!
//! Two paths exist and they never mix:
//!
//! - request failures happen before the handler runs and map to a fixed
//!   response from a closed set (400, 415 or a generic 500);
//! - handler failures go through the function's [`ErrorRules`], falling back
//!   to a generic 500.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use thiserror::Error;

use crate::event::ProxyResponse;
use crate::logger::RequestLogger;
use crate::params::RequestError;
use crate::response::ResponseEntity;

/// Boxed error type, identical to `lambda_runtime::Error`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Body of the 500 response for unmatched handler failures.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Body of the 500 response for unexpected failures before the handler ran.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Value raised by a handler in place of a result.
#[derive(Debug)]
pub enum Failure {
    /// A failure carrying no value at all.
    Null,
    Error(BoxError),
}

#[derive(Debug, Error)]
#[error("{0}")]
struct Message(String);

impl Failure {
    pub fn null() -> Self {
        Failure::Null
    }

    /// A failure carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Failure::Error(Box::new(Message(message.into())))
    }

    pub fn from_boxed(error: BoxError) -> Self {
        Failure::Error(error)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Failure::Null)
    }

    /// Message of the underlying error; `None` for [`Failure::Null`].
    pub fn message(&self) -> Option<String> {
        match self {
            Failure::Null => None,
            Failure::Error(error) => Some(error.to_string()),
        }
    }

    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Failure::Null => None,
            Failure::Error(error) => error.downcast_ref::<E>(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Null => f.write_str("null"),
            Failure::Error(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl<E> From<E> for Failure
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Failure::Error(Box::new(error))
    }
}

type Predicate = Box<dyn Fn(&Failure) -> bool + Send + Sync>;
type Provider = Box<dyn Fn(&Failure) -> ResponseEntity + Send + Sync>;

/// One (predicate, response provider) pair.
pub struct ErrorRule {
    predicate: Predicate,
    provider: Provider,
}

impl ErrorRule {
    pub fn matches(&self, failure: &Failure) -> bool {
        (self.predicate)(failure)
    }

    pub fn respond(&self, failure: &Failure) -> ResponseEntity {
        (self.provider)(failure)
    }
}

impl fmt::Debug for ErrorRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRule").finish_non_exhaustive()
    }
}

/// Ordered error matching chain; the first matching rule wins.
///
/// ```
/// use http::StatusCode;
/// use lambdakit::{ErrorRules, Failure, ResponseEntity};
///
/// let rules = ErrorRules::new()
///     .on(Failure::is_null, |_| ResponseEntity::text(StatusCode::BAD_REQUEST, "nothing"))
///     .on(
///         |err| err.message().as_deref() == Some("Hello"),
///         |err| {
///             let message = err.message().unwrap_or_default();
///             ResponseEntity::text(StatusCode::NOT_FOUND, format!("Error is: {message}"))
///         },
///     );
///
/// let response = rules.respond(&Failure::msg("Hello")).unwrap();
/// assert_eq!(response.status_code, 404);
/// ```
#[derive(Debug, Default)]
pub struct ErrorRules {
    rules: Vec<ErrorRule>,
}

impl ErrorRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    pub fn on<P, R>(mut self, predicate: P, provider: R) -> Self
    where
        P: Fn(&Failure) -> bool + Send + Sync + 'static,
        R: Fn(&Failure) -> ResponseEntity + Send + Sync + 'static,
    {
        self.rules.push(ErrorRule {
            predicate: Box::new(predicate),
            provider: Box::new(provider),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Response of the first rule matching `failure`.
    pub fn respond(&self, failure: &Failure) -> Option<ResponseEntity> {
        self.rules
            .iter()
            .find(|rule| rule.matches(failure))
            .map(|rule| rule.respond(failure))
    }
}

/// Failure raised before the handler was invoked.
#[derive(Debug)]
pub enum RequestFailure {
    /// The request itself was rejected by parameter resolution.
    Rejected(RequestError),
    /// Anything else, such as a failing logger or an undecodable event.
    Unexpected(Failure),
}

/// Turns failures into wire responses, logging them on the way.
pub struct ErrorResponder {
    rules: Option<ErrorRules>,
    logger: Arc<dyn RequestLogger>,
}

impl ErrorResponder {
    pub fn new(rules: Option<ErrorRules>, logger: Arc<dyn RequestLogger>) -> Self {
        Self { rules, logger }
    }

    /// Response for a failure raised by the handler.
    pub fn handler_failure(&self, failure: &Failure) -> ProxyResponse {
        self.logger
            .warn("Handler returned a failure", Some(failure as &dyn fmt::Debug));

        self.rules
            .as_ref()
            .and_then(|rules| rules.respond(failure))
            .map(ResponseEntity::into_proxy_response)
            .unwrap_or_else(|| {
                ResponseEntity::text(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_ERROR_MESSAGE)
                    .into_proxy_response()
            })
    }

    /// Response for a failure raised before the handler was invoked.
    ///
    /// User rules are never consulted here.
    pub fn request_failure(&self, failure: &RequestFailure) -> ProxyResponse {
        match failure {
            RequestFailure::Rejected(error) => {
                let message = error.to_string();
                self.logger.error(&message, Some(error as &dyn fmt::Debug));
                ResponseEntity::text(error.status(), message).into_proxy_response()
            }
            RequestFailure::Unexpected(failure) => {
                match failure.message() {
                    Some(message) => self
                        .logger
                        .error(&message, Some(failure as &dyn fmt::Debug)),
                    None => self.logger.error(&format!("{failure:?}"), None),
                }
                ResponseEntity::text(StatusCode::INTERNAL_SERVER_ERROR, UNKNOWN_ERROR_MESSAGE)
                    .into_proxy_response()
            }
        }
    }
}

impl fmt::Debug for ErrorResponder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorResponder")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
