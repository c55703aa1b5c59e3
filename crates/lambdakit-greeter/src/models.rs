//! Request and response payloads of the greeter function.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Optional JSON body of a greeting request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreetingRequest {
    /// Overrides the `name` path parameter.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub excited: bool,
}

/// Greeting returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Greeting {
    pub message: String,
    pub request_id: String,
    /// Claims of the API Gateway authorizer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Reasons a greeting cannot be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GreetingError {
    #[error("a name is required")]
    MissingName,

    #[error("name '{name}' is longer than {max} characters")]
    NameTooLong { name: String, max: usize },

    #[error("GREETING_SALUTATION must not be blank")]
    BlankSalutation,
}
