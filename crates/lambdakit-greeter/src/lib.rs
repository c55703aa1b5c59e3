//! Greeter function: a small API Gateway proxy handler served by lambdakit.
//!
//! `GET /greet/{name}?style=shout` answers with a greeting. A `POST` with a
//! JSON body may override the name and answers with `201 Created`.

mod models;

use http::StatusCode;
use lambda_runtime::Error;
use lambdakit::{
    Arguments, BindingTable, BodyBinding, Definition, ErrorRules, Failure, FunctionProps,
    LambdaFunction, ResponseEntity,
};
use serde_json::{json, Map, Value};
use tracing::debug;

pub use models::{Greeting, GreetingError, GreetingRequest};

/// Environment variable holding the salutation used in every greeting.
pub const SALUTATION_VAR: &str = "GREETING_SALUTATION";

pub const DEFAULT_SALUTATION: &str = "Hello";

/// Longest accepted name, in characters.
pub const MAX_NAME_LEN: usize = 64;

const NAME: usize = 0;
const STYLE: usize = 1;
const TRACE_ID: usize = 2;
const CALLER: usize = 3;
const CONTEXT: usize = 4;
const BODY: usize = 5;

#[derive(Debug, Default)]
pub struct Greeter {
    salutation: String,
}

impl Greeter {
    /// Read the salutation through `lookup`, falling back to [`DEFAULT_SALUTATION`].
    pub fn configure(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), GreetingError> {
        let salutation = lookup(SALUTATION_VAR).unwrap_or_else(|| DEFAULT_SALUTATION.to_string());
        if salutation.trim().is_empty() {
            return Err(GreetingError::BlankSalutation);
        }
        self.salutation = salutation.trim().to_string();
        Ok(())
    }

    pub fn salutation(&self) -> &str {
        &self.salutation
    }

    pub async fn greet(&self, args: Arguments) -> Result<Value, Failure> {
        let request: Option<GreetingRequest> = match args.value(BODY) {
            Some(_) => Some(args.deserialize(BODY)?),
            None => None,
        };

        let name = request
            .as_ref()
            .and_then(|request| request.name.as_deref())
            .or_else(|| args.str(NAME))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(GreetingError::MissingName)?;
        if name.chars().count() > MAX_NAME_LEN {
            return Err(GreetingError::NameTooLong {
                name: name.to_string(),
                max: MAX_NAME_LEN,
            }
            .into());
        }

        let mut message = format!("{}, {}", self.salutation, name);
        if args.str(STYLE) == Some("shout") {
            message = message.to_uppercase();
        }
        let excited = request.as_ref().is_some_and(|request| request.excited);
        message.push(if excited { '!' } else { '.' });

        let greeting = Greeting {
            message,
            request_id: args
                .context(CONTEXT)
                .map(|context| context.request_id.clone())
                .unwrap_or_default(),
            caller: args.value(CALLER).cloned(),
            trace_id: args.str(TRACE_ID).map(str::to_string),
        };
        debug!(request_id = %greeting.request_id, "greeting built");

        if request.is_some() {
            Ok(ResponseEntity::json(StatusCode::CREATED, &greeting)?
                .with_header("Location", format!("/greet/{name}"))
                .into())
        } else {
            Ok(serde_json::to_value(&greeting)?)
        }
    }
}

impl LambdaFunction for Greeter {
    fn definition() -> Definition<Self> {
        Definition::new()
            .handler(|this: &Greeter, args| Box::pin(this.greet(args)))
            .bindings(
                BindingTable::builder()
                    .path_param("name", NAME)
                    .query_param("style", STYLE)
                    .header("X-Trace-Id", TRACE_ID)
                    .authorizer(CALLER)
                    .context(CONTEXT)
                    .body(BodyBinding::at(BODY).content_types([Some("application/json"), None])),
            )
            .init(|this: &mut Greeter| {
                this.configure(|key| std::env::var(key).ok())?;
                Ok(())
            })
            .error_rules(error_rules())
            .function(FunctionProps {
                name: "greeter".to_string(),
                entry: "crates/lambdakit-greeter/src/main.rs".to_string(),
                memory_mb: 128,
                timeout_ms: 3_000,
                misc: Map::new(),
            })
    }
}

fn error_rules() -> ErrorRules {
    ErrorRules::new()
        .on(
            |err| {
                matches!(
                    err.downcast_ref::<GreetingError>(),
                    Some(GreetingError::MissingName)
                )
            },
            |err| {
                ResponseEntity::new(
                    StatusCode::BAD_REQUEST,
                    json!({ "error": err.to_string() }),
                )
            },
        )
        .on(
            |err| {
                matches!(
                    err.downcast_ref::<GreetingError>(),
                    Some(GreetingError::NameTooLong { .. })
                )
            },
            |err| {
                ResponseEntity::new(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({ "error": err.to_string() }),
                )
            },
        )
        .on(
            |err| err.downcast_ref::<serde_json::Error>().is_some(),
            |_| ResponseEntity::text(StatusCode::BAD_REQUEST, "Malformed greeting request"),
        )
}

/// Entry point used by the Lambda runtime.
pub async fn run() -> Result<(), Error> {
    lambdakit::run::<Greeter>().await
}
