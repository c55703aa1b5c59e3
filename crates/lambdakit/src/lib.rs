//! Declarative request dispatch for AWS Lambda proxy handlers.
//!
//! This crate binds one handler type to an API Gateway proxy event:
//!
//! - [`BindingTable`]: which part of the request goes to which argument slot
//! - [`resolve`]: builds the ordered [`Arguments`] for one event
//! - [`ResponseEntity`]: normalizes return values into a [`ProxyResponse`]
//! - [`ErrorRules`] / [`ErrorResponder`]: turn a [`Failure`] into a response
//! - [`LambdaEntry`] and [`run`]: cold start, per-event pipeline and the runtime loop
//! - [`init_tracing`]: JSON-formatted tracing for CloudWatch Logs
//!
//! # Example
//!
//! ```no_run
//! use lambdakit::{Arguments, BindingTable, Definition, Failure, LambdaFunction};
//! use serde_json::{json, Value};
//!
//! #[derive(Default)]
//! struct Hello;
//!
//! impl Hello {
//!     async fn hello(&self, args: Arguments) -> Result<Value, Failure> {
//!         Ok(json!({ "hello": args.str(0).unwrap_or("world") }))
//!     }
//! }
//!
//! impl LambdaFunction for Hello {
//!     fn definition() -> Definition<Self> {
//!         Definition::new()
//!             .handler(|this: &Hello, args| Box::pin(this.hello(args)))
//!             .bindings(BindingTable::builder().path_param("name", 0))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lambda_runtime::Error> {
//!     lambdakit::run::<Hello>().await
//! }
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides a recording logger and mock contexts.
//! Enable the `test-utils` feature to access it from dependent crates.

mod binding;
mod config;
mod content_type;
mod definition;
mod entry;
mod error;
mod error_handler;
mod event;
mod logger;
mod params;
mod response;
mod tracing_init;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use binding::{BindingTable, BindingTableBuilder, BodyBinding, Role, Slot, MAX_SLOT};
pub use config::{LogFormat, LoggingConfig, RuntimeConfig, TASK_ROOT_VAR};
pub use content_type::{
    extract_media_type, is_supported, should_parse_json, JsonPolicy, MediaTypeRule,
    APPLICATION_JSON, TEXT_PLAIN,
};
pub use definition::{
    function_props, Definition, FunctionProps, HandlerFn, InitOutcome, LambdaFunction,
};
pub use entry::{run, LambdaEntry, DIAGNOSTIC_MESSAGE};
pub use error::{BindingError, InitError};
pub use error_handler::{
    BoxError, ErrorResponder, ErrorRule, ErrorRules, Failure, RequestFailure,
    UNEXPECTED_ERROR_MESSAGE, UNKNOWN_ERROR_MESSAGE,
};
pub use event::{InvocationContext, ProxyEvent, ProxyRequestContext, ProxyResponse};
pub use logger::{RequestLogger, TracingLogger};
pub use params::{resolve, Argument, Arguments, RequestError};
pub use response::{ResponseEntity, CONTENT_TYPE_HEADER};
pub use tracing_init::init_tracing;
