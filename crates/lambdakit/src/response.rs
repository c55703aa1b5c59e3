//! Response normalization.
//!
//! Handlers either return a plain value, which is wrapped with the default
//! status code, or a value shaped like a [`ResponseEntity`], which is used as
//! is. Either way the entity is serialized into a [`ProxyResponse`] with a
//! text body and an inferred `Content-Type`.

use std::collections::BTreeMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content_type::{APPLICATION_JSON, TEXT_PLAIN};
use crate::event::ProxyResponse;

/// Header name used when inferring the response content type.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

const STATUS_CODE_KEY: &str = "statusCode";
const BODY_KEY: &str = "body";
const HEADERS_KEY: &str = "headers";

/// Status, body and optional headers of a response before serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEntity {
    pub status_code: u16,
    pub body: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

impl ResponseEntity {
    pub fn new(status: StatusCode, body: impl Into<Value>) -> Self {
        Self {
            status_code: status.as_u16(),
            body: body.into(),
            headers: None,
        }
    }

    /// A 200 response.
    pub fn ok(body: impl Into<Value>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// A response with a text body.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status, Value::String(body.into()))
    }

    /// A response whose body is the JSON form of `body`.
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(status, serde_json::to_value(body)?))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Interpret a handler output as a response entity, if it has that shape.
    ///
    /// The output must be an object with `statusCode` and a non-null `body`,
    /// optionally `headers` with string values, and no other keys. The status
    /// code may be an integral number or a numeric string naming a valid
    /// HTTP status.
    pub fn from_output(output: &Value) -> Option<Self> {
        let object = output.as_object()?;
        if !(2..=3).contains(&object.len())
            || object
                .keys()
                .any(|key| ![STATUS_CODE_KEY, BODY_KEY, HEADERS_KEY].contains(&key.as_str()))
        {
            return None;
        }

        let status_code = status_code(object.get(STATUS_CODE_KEY)?)?;
        let body = object.get(BODY_KEY).filter(|body| !body.is_null())?.clone();
        let headers = match object.get(HEADERS_KEY) {
            None => None,
            Some(headers) => Some(string_map(headers)?),
        };

        Some(Self {
            status_code,
            body,
            headers,
        })
    }

    /// Use `output` as an entity if it is one, else wrap it with `default_status`.
    pub fn normalize(output: Value, default_status: u16) -> Self {
        Self::from_output(&output).unwrap_or(Self {
            status_code: default_status,
            body: output,
            headers: None,
        })
    }

    /// Serialize into the wire format.
    ///
    /// Text bodies pass through and default to `text/plain`; anything else is
    /// JSON-encoded and defaults to `application/json`. A declared
    /// `Content-Type` header, in any letter case, is never overridden.
    pub fn into_proxy_response(self) -> ProxyResponse {
        let mut headers = self.headers.unwrap_or_default();
        let (body, inferred) = match self.body {
            Value::String(text) => (text, TEXT_PLAIN),
            other => (other.to_string(), APPLICATION_JSON),
        };

        if !headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE_HEADER))
        {
            headers.insert(CONTENT_TYPE_HEADER.to_string(), inferred.to_string());
        }

        ProxyResponse {
            status_code: self.status_code,
            body,
            headers,
        }
    }
}

impl From<ResponseEntity> for Value {
    fn from(entity: ResponseEntity) -> Self {
        let mut object = Map::new();
        object.insert(STATUS_CODE_KEY.to_string(), Value::from(entity.status_code));
        object.insert(BODY_KEY.to_string(), entity.body);
        if let Some(headers) = entity.headers {
            let headers = headers
                .into_iter()
                .map(|(name, value)| (name, Value::String(value)))
                .collect();
            object.insert(HEADERS_KEY.to_string(), Value::Object(headers));
        }
        Value::Object(object)
    }
}

fn status_code(value: &Value) -> Option<u16> {
    let code = match value {
        Value::Number(number) => match number.as_u64() {
            Some(code) => u16::try_from(code).ok()?,
            None => {
                let code = number.as_f64()?;
                if code.fract() != 0.0 || !(0.0..=f64::from(u16::MAX)).contains(&code) {
                    return None;
                }
                code as u16
            }
        },
        Value::String(text) => text.trim().parse::<u16>().ok()?,
        _ => return None,
    };
    StatusCode::from_u16(code).ok().map(|status| status.as_u16())
}

fn string_map(value: &Value) -> Option<BTreeMap<String, String>> {
    value
        .as_object()?
        .iter()
        .map(|(name, value)| Some((name.clone(), value.as_str()?.to_string())))
        .collect()
}
