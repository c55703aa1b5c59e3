//! Inbound proxy event, invocation context and outbound proxy response.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// API Gateway proxy event, as far as parameter binding reads it.
///
/// Every field is optional. Fields this crate does not interpret are kept in
/// `extra`, so serializing the event again gives back the original payload.
///
/// Header and parameter maps keep their raw JSON values in event order. Entries
/// that are not strings read as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    /// Text body, or an already structured JSON value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_parameters: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string_parameters: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_context: Option<ProxyRequestContext>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProxyEvent {
    /// Look up a header by name, ignoring ASCII case.
    ///
    /// When several headers match, the last one in the event wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        string_entries(self.headers.as_ref())
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .last()
            .map(|(_, value)| value)
    }

    /// String-valued headers keyed by their lowercased name, last one winning.
    pub fn lowercase_headers(&self) -> HashMap<String, &str> {
        string_entries(self.headers.as_ref())
            .map(|(key, value)| (key.to_lowercase(), value))
            .collect()
    }

    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters.as_ref()?.get(name)?.as_str()
    }

    pub fn query_parameter(&self, name: &str) -> Option<&str> {
        self.query_string_parameters.as_ref()?.get(name)?.as_str()
    }

    /// Claims placed on the request by an API Gateway authorizer.
    pub fn authorizer(&self) -> Option<&Value> {
        self.request_context
            .as_ref()?
            .authorizer
            .as_ref()
            .filter(|claims| !claims.is_null())
    }
}

fn string_entries<'a>(
    map: Option<&'a Map<String, Value>>,
) -> impl Iterator<Item = (&'a str, &'a str)> {
    map.into_iter()
        .flatten()
        .filter_map(|(key, value)| Some((key.as_str(), value.as_str()?)))
}

/// The `requestContext` object of a proxy event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequestContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorizer: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Invocation metadata handed over by the Lambda runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationContext {
    pub request_id: String,
    pub invoked_function_arn: String,
    /// Execution deadline in milliseconds since the Unix epoch.
    pub deadline_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xray_trace_id: Option<String>,
}

impl From<&lambda_runtime::Context> for InvocationContext {
    fn from(context: &lambda_runtime::Context) -> Self {
        Self {
            request_id: context.request_id.clone(),
            invoked_function_arn: context.invoked_function_arn.clone(),
            deadline_ms: context.deadline,
            xray_trace_id: context.xray_trace_id.clone(),
        }
    }
}

/// Wire-level proxy response returned to API Gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub body: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ProxyResponse {
    /// Value of the response header `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
