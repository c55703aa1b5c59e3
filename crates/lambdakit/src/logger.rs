//! Logger capability used by the entry orchestrator.
//!
//! The default [`TracingLogger`] forwards to `tracing`. A function may
//! declare its own [`RequestLogger`] in its definition, for example to bind
//! request metadata into a different logging library.

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::error_handler::BoxError;
use crate::event::{InvocationContext, ProxyEvent};

/// Logging capability of the entry orchestrator.
pub trait RequestLogger: Send + Sync {
    fn info(&self, message: &str, payload: Option<&dyn fmt::Debug>);

    fn warn(&self, message: &str, payload: Option<&dyn fmt::Debug>);

    fn error(&self, message: &str, payload: Option<&dyn fmt::Debug>);

    /// Called with every inbound event before parameters are resolved.
    ///
    /// An error here rejects the request with a generic 500 response.
    fn attach_request(
        &self,
        event: &ProxyEvent,
        context: &InvocationContext,
    ) -> Result<(), BoxError>;
}

/// Default logger backed by `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl RequestLogger for TracingLogger {
    fn info(&self, message: &str, payload: Option<&dyn fmt::Debug>) {
        match payload {
            Some(payload) => info!(payload = ?payload, "{message}"),
            None => info!("{message}"),
        }
    }

    fn warn(&self, message: &str, payload: Option<&dyn fmt::Debug>) {
        match payload {
            Some(payload) => warn!(payload = ?payload, "{message}"),
            None => warn!("{message}"),
        }
    }

    fn error(&self, message: &str, payload: Option<&dyn fmt::Debug>) {
        match payload {
            Some(payload) => error!(payload = ?payload, "{message}"),
            None => error!("{message}"),
        }
    }

    fn attach_request(
        &self,
        _event: &ProxyEvent,
        context: &InvocationContext,
    ) -> Result<(), BoxError> {
        debug!(
            request_id = %context.request_id,
            function_arn = %context.invoked_function_arn,
            "request attached"
        );
        Ok(())
    }
}
