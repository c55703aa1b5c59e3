//! Declarative description of a Lambda function type.
//!
//! A [`LambdaFunction`] returns a [`Definition`] naming its handler, its
//! parameter bindings, an optional one-time initializer, error rules and
//! logger. The entry orchestrator reads it once per cold start.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::binding::BindingTableBuilder;
use crate::error_handler::{ErrorRules, Failure};
use crate::logger::RequestLogger;
use crate::params::Arguments;

/// Stored reference to the handler entry point of `T`.
pub type HandlerFn<T> =
    Arc<dyn for<'a> Fn(&'a T, Arguments) -> BoxFuture<'a, Result<Value, Failure>> + Send + Sync>;

pub(crate) type InitFn<T> = Box<dyn Fn(&mut T) -> Result<InitOutcome, Failure> + Send + Sync>;

/// Result of a one-time initializer.
pub enum InitOutcome {
    /// Initialization finished synchronously.
    Complete,
    /// Initialization handed back work that has not finished yet.
    ///
    /// This is a configuration error: the entry refuses to start.
    Pending(BoxFuture<'static, ()>),
}

impl From<()> for InitOutcome {
    fn from(_: ()) -> Self {
        InitOutcome::Complete
    }
}

impl fmt::Debug for InitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitOutcome::Complete => f.write_str("Complete"),
            InitOutcome::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Deployment properties of a function, for packaging tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionProps {
    pub name: String,
    /// Path of the source or binary implementing the function.
    pub entry: String,
    pub memory_mb: u32,
    pub timeout_ms: u64,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub misc: Map<String, Value>,
}

/// Declarative description of a [`LambdaFunction`].
pub struct Definition<T> {
    pub(crate) handler: Option<HandlerFn<T>>,
    pub(crate) bindings: BindingTableBuilder,
    pub(crate) initializer: Option<InitFn<T>>,
    pub(crate) response_code: u16,
    pub(crate) error_rules: Option<ErrorRules>,
    pub(crate) logger: Option<Arc<dyn RequestLogger>>,
    pub(crate) function: Option<FunctionProps>,
}

impl<T> Default for Definition<T> {
    fn default() -> Self {
        Self {
            handler: None,
            bindings: BindingTableBuilder::default(),
            initializer: None,
            response_code: StatusCode::OK.as_u16(),
            error_rules: None,
            logger: None,
            function: None,
        }
    }
}

impl<T: 'static> Definition<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the handler entry point.
    ///
    /// ```
    /// use lambdakit::{Arguments, Definition, Failure};
    /// use serde_json::Value;
    ///
    /// struct Echo;
    ///
    /// impl Echo {
    ///     async fn echo(&self, args: Arguments) -> Result<Value, Failure> {
    ///         Ok(args.value(0).cloned().unwrap_or(Value::Null))
    ///     }
    /// }
    ///
    /// let definition = Definition::<Echo>::new().handler(|this, args| Box::pin(this.echo(args)));
    /// assert!(definition.has_handler());
    /// ```
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: for<'a> Fn(&'a T, Arguments) -> BoxFuture<'a, Result<Value, Failure>>
            + Send
            + Sync
            + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Declare which request parts the handler receives, and where.
    pub fn bindings(mut self, bindings: BindingTableBuilder) -> Self {
        self.bindings = bindings;
        self
    }

    /// Declare a one-time initializer, run at cold start before any event.
    pub fn init<F, R>(mut self, initializer: F) -> Self
    where
        F: Fn(&mut T) -> Result<R, Failure> + Send + Sync + 'static,
        R: Into<InitOutcome>,
    {
        self.initializer = Some(Box::new(move |instance: &mut T| {
            initializer(instance).map(Into::into)
        }));
        self
    }

    /// Status code used when the handler returns a plain value.
    pub fn response_code(mut self, status: StatusCode) -> Self {
        self.response_code = status.as_u16();
        self
    }

    pub fn error_rules(mut self, rules: ErrorRules) -> Self {
        self.error_rules = Some(rules);
        self
    }

    /// Replace the default tracing logger.
    pub fn logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn function(mut self, props: FunctionProps) -> Self {
        self.function = Some(props);
        self
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub fn function_props(&self) -> Option<&FunctionProps> {
        self.function.as_ref()
    }
}

impl<T> fmt::Debug for Definition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("has_handler", &self.handler.is_some())
            .field("bindings", &self.bindings)
            .field("has_initializer", &self.initializer.is_some())
            .field("response_code", &self.response_code)
            .field("error_rules", &self.error_rules)
            .field("has_logger", &self.logger.is_some())
            .field("function", &self.function)
            .finish()
    }
}

/// A type that can be served as a Lambda function.
///
/// The instance is created with [`Default`] once per cold start and shared
/// by every invocation afterwards.
pub trait LambdaFunction: Default + Send + Sync + Sized + 'static {
    fn definition() -> Definition<Self>;
}

/// Deployment properties of `T`, read without a cold start.
pub fn function_props<T: LambdaFunction>() -> Option<FunctionProps> {
    T::definition().function
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingTable;
    use serde_json::json;

    #[derive(Default)]
    struct Sample {
        warmed: bool,
    }

    impl Sample {
        async fn handle(&self, _args: Arguments) -> Result<Value, Failure> {
            Ok(json!({ "warmed": self.warmed }))
        }
    }

    impl LambdaFunction for Sample {
        fn definition() -> Definition<Self> {
            Definition::new()
                .handler(|this: &Sample, args| Box::pin(this.handle(args)))
                .bindings(BindingTable::builder().event(0))
                .init(|this: &mut Sample| {
                    this.warmed = true;
                    Ok(())
                })
                .response_code(StatusCode::CREATED)
                .function(FunctionProps {
                    name: "sample".to_string(),
                    entry: "src/main.rs".to_string(),
                    memory_mb: 256,
                    timeout_ms: 3_000,
                    misc: Map::new(),
                })
        }
    }

    #[test]
    fn builder_records_declarations() {
        let definition = Sample::definition();
        assert!(definition.has_handler());
        assert!(definition.initializer.is_some());
        assert_eq!(definition.response_code, 201);
        assert!(definition.error_rules.is_none());
        assert!(definition.logger.is_none());
    }

    #[test]
    fn default_definition_is_empty() {
        let definition = Definition::<Sample>::new();
        assert!(!definition.has_handler());
        assert_eq!(definition.response_code, 200);
        assert!(definition.function_props().is_none());
    }

    #[test]
    fn initializer_outcome_is_complete_for_unit() {
        let definition = Sample::definition();
        let mut instance = Sample::default();
        let init = definition.initializer.as_ref().unwrap();
        assert!(matches!(init(&mut instance), Ok(InitOutcome::Complete)));
        assert!(instance.warmed);
    }

    #[tokio::test]
    async fn stored_handler_is_invocable() {
        let definition = Sample::definition();
        let handler = definition.handler.unwrap();
        let instance = Sample { warmed: true };
        let output = handler(&instance, Arguments::default()).await.unwrap();
        assert_eq!(output, json!({ "warmed": true }));
    }

    #[test]
    fn function_props_are_readable_without_cold_start() {
        let props = function_props::<Sample>().unwrap();
        assert_eq!(props.name, "sample");
        assert_eq!(
            serde_json::to_value(&props).unwrap(),
            json!({
                "name": "sample",
                "entry": "src/main.rs",
                "memoryMb": 256,
                "timeoutMs": 3000
            })
        );
    }
}
