//! Entry orchestrator: environment gate, cold start and the per-event pipeline.
//!
//! A [`LambdaEntry`] is built once per process. Outside of Lambda (no
//! `LAMBDA_TASK_ROOT`) it stays detached and answers every event with a
//! diagnostic text. Inside Lambda it constructs the function, validates its
//! definition and runs the initializer, then serves events:
//!
//! 1. decode the payload into a [`ProxyEvent`],
//! 2. attach the request to the logger,
//! 3. resolve the handler arguments,
//! 4. await the handler,
//! 5. normalize its output, or map its failure through the error rules.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use http::StatusCode;
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::binding::{BindingTable, BindingTableBuilder};
use crate::config::RuntimeConfig;
use crate::definition::{Definition, HandlerFn, InitFn, InitOutcome, LambdaFunction};
use crate::error::InitError;
use crate::error_handler::{ErrorResponder, Failure, RequestFailure};
use crate::event::{InvocationContext, ProxyEvent, ProxyResponse};
use crate::logger::{RequestLogger, TracingLogger};
use crate::params::resolve;
use crate::response::ResponseEntity;
use crate::tracing_init::init_tracing;

/// Body of every response of a detached entry.
pub const DIAGNOSTIC_MESSAGE: &str = "This function is not running inside AWS Lambda: the \
LAMBDA_TASK_ROOT environment variable is not defined. Define LAMBDA_TASK_ROOT to initialize \
the function and serve events.";

/// Orchestrates the lifecycle of the function type `T`.
pub struct LambdaEntry<T> {
    state: State<T>,
}

enum State<T> {
    Detached,
    Ready(Ready<T>),
}

struct Ready<T> {
    instance: T,
    handler: HandlerFn<T>,
    bindings: BindingTable,
    response_code: u16,
    logger: Arc<dyn RequestLogger>,
    responder: ErrorResponder,
}

impl<T: LambdaFunction> LambdaEntry<T> {
    /// Build the entry from the process environment.
    pub fn new() -> Result<Self, InitError> {
        Self::with_config(&RuntimeConfig::from_env())
    }

    /// Build the entry for `config`.
    ///
    /// Inside Lambda this is the cold start: any [`InitError`] is logged and
    /// returned, and the function must not serve events.
    pub fn with_config(config: &RuntimeConfig) -> Result<Self, InitError> {
        if !config.is_lambda() {
            warn!("LAMBDA_TASK_ROOT is not defined, entry stays detached");
            return Ok(Self {
                state: State::Detached,
            });
        }

        let start = Instant::now();
        let mut instance = T::default();
        let Definition {
            handler,
            bindings,
            initializer,
            response_code,
            error_rules,
            logger,
            function,
        } = T::definition();

        let logger = logger.unwrap_or_else(|| Arc::new(TracingLogger));
        if let Some(props) = &function {
            info!(function = %props.name, "cold start");
        }

        let (handler, bindings) =
            match prepare(&mut instance, handler, bindings, initializer, logger.as_ref()) {
                Ok(parts) => parts,
                Err(error) => {
                    logger.error(&error.to_string(), Some(&error as &dyn fmt::Debug));
                    return Err(error);
                }
            };

        info!(
            init_ms = start.elapsed().as_millis() as u64,
            bindings = bindings.arity(),
            "function ready"
        );

        Ok(Self {
            state: State::Ready(Ready {
                instance,
                handler,
                bindings,
                response_code,
                responder: ErrorResponder::new(error_rules, Arc::clone(&logger)),
                logger,
            }),
        })
    }
}

impl<T: Send + Sync> LambdaEntry<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Process one raw proxy event.
    ///
    /// Never fails: every failure is turned into a response.
    pub async fn invoke(&self, payload: Value, context: InvocationContext) -> ProxyResponse {
        match &self.state {
            State::Detached => {
                ResponseEntity::text(StatusCode::OK, DIAGNOSTIC_MESSAGE).into_proxy_response()
            }
            State::Ready(ready) => {
                let span = info_span!("invocation", request_id = %context.request_id);
                let response = ready.invoke(payload, context).instrument(span).await;
                debug!(status = response.status_code, "invocation finished");
                response
            }
        }
    }
}

impl<T: Send + Sync> Ready<T> {
    async fn invoke(&self, payload: Value, context: InvocationContext) -> ProxyResponse {
        let event = match serde_json::from_value::<ProxyEvent>(payload) {
            Ok(event) => Arc::new(event),
            Err(error) => {
                return self
                    .responder
                    .request_failure(&RequestFailure::Unexpected(error.into()))
            }
        };
        let context = Arc::new(context);

        if let Err(error) = self.logger.attach_request(&event, &context) {
            return self
                .responder
                .request_failure(&RequestFailure::Unexpected(Failure::from_boxed(error)));
        }

        let arguments = match resolve(&self.bindings, &event, &context) {
            Ok(arguments) => arguments,
            Err(error) => {
                return self
                    .responder
                    .request_failure(&RequestFailure::Rejected(error))
            }
        };

        let outcome = AssertUnwindSafe(async { (self.handler)(&self.instance, arguments).await })
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(Failure::msg(panic_message(panic.as_ref()))));

        match outcome {
            Ok(output) => {
                ResponseEntity::normalize(output, self.response_code).into_proxy_response()
            }
            Err(failure) => self.responder.handler_failure(&failure),
        }
    }
}

impl<T> fmt::Debug for LambdaEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Detached => f.debug_struct("LambdaEntry").field("state", &"Detached").finish(),
            State::Ready(ready) => f
                .debug_struct("LambdaEntry")
                .field("state", &"Ready")
                .field("bindings", &ready.bindings)
                .field("response_code", &ready.response_code)
                .finish_non_exhaustive(),
        }
    }
}

fn prepare<T: 'static>(
    instance: &mut T,
    handler: Option<HandlerFn<T>>,
    bindings: BindingTableBuilder,
    initializer: Option<InitFn<T>>,
    logger: &dyn RequestLogger,
) -> Result<(HandlerFn<T>, BindingTable), InitError> {
    let handler = handler.ok_or(InitError::MissingHandler)?;
    let bindings = bindings.build()?;

    match initializer {
        None => logger.info("No init method declared, moving on", None),
        Some(initializer) => match initializer(instance) {
            Ok(InitOutcome::Complete) => {}
            Ok(InitOutcome::Pending(_)) => return Err(InitError::InitializerPending),
            Err(failure) => return Err(InitError::Initializer(failure.to_string())),
        },
    }

    Ok((handler, bindings))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

/// Serve `T` on the Lambda runtime.
///
/// Initializes tracing, builds the entry from the environment, then hands
/// every event to [`LambdaEntry::invoke`]. A failing cold start aborts before
/// the first event is polled.
///
/// ```no_run
/// # use lambdakit::{Definition, LambdaFunction};
/// # #[derive(Default)]
/// # struct Hello;
/// # impl LambdaFunction for Hello {
/// #     fn definition() -> Definition<Self> { Definition::new() }
/// # }
/// #[tokio::main]
/// async fn main() -> Result<(), lambda_runtime::Error> {
///     lambdakit::run::<Hello>().await
/// }
/// ```
pub async fn run<T: LambdaFunction>() -> Result<(), lambda_runtime::Error> {
    let config = RuntimeConfig::from_env();
    init_tracing(&config.logging);

    let entry = Arc::new(LambdaEntry::<T>::with_config(&config)?);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let entry = Arc::clone(&entry);
        async move {
            let (payload, context) = event.into_parts();
            let context = InvocationContext::from(&context);
            Ok::<_, lambda_runtime::Error>(entry.invoke(payload, context).await)
        }
    }))
    .await
}
