//! Resolution of a [`BindingTable`] against one inbound event.
//!
//! [`resolve`] gathers a value for every declared role, then places each
//! value on its slot. Slots nobody claimed are filled with
//! [`Argument::Null`], so the handler always sees `max(slot) + 1` arguments.

use std::sync::Arc;

use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::binding::{BindingTable, BodyBinding, Role, Slot};
use crate::content_type::{extract_media_type, is_supported, should_parse_json, MediaTypeRule};
use crate::error_handler::Failure;
use crate::event::{InvocationContext, ProxyEvent};

/// One resolved handler argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// No role was bound to this slot.
    Null,
    /// A role was bound but the request carried no value for it.
    Absent,
    Value(Value),
    Event(Arc<ProxyEvent>),
    Context(Arc<InvocationContext>),
}

impl Argument {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Argument::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Whether this argument carries anything.
    pub fn is_present(&self) -> bool {
        !matches!(self, Argument::Null | Argument::Absent)
    }
}

/// Ordered argument list handed to the handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Vec<Argument>);

impl Arguments {
    pub fn new(arguments: Vec<Argument>) -> Self {
        Self(arguments)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, slot: Slot) -> Option<&Argument> {
        self.0.get(slot)
    }

    pub fn value(&self, slot: Slot) -> Option<&Value> {
        self.get(slot).and_then(Argument::as_value)
    }

    pub fn str(&self, slot: Slot) -> Option<&str> {
        self.get(slot).and_then(Argument::as_str)
    }

    pub fn event(&self, slot: Slot) -> Option<&ProxyEvent> {
        match self.get(slot)? {
            Argument::Event(event) => Some(event),
            _ => None,
        }
    }

    pub fn context(&self, slot: Slot) -> Option<&InvocationContext> {
        match self.get(slot)? {
            Argument::Context(context) => Some(context),
            _ => None,
        }
    }

    /// Deserialize the value at `slot`.
    ///
    /// Missing values deserialize from JSON `null`, so `Option<T>` targets
    /// accept them. Event and context slots deserialize from their JSON form.
    pub fn deserialize<T: DeserializeOwned>(&self, slot: Slot) -> Result<T, Failure> {
        let value = match self.get(slot) {
            Some(Argument::Value(value)) => value.clone(),
            Some(Argument::Event(event)) => serde_json::to_value(event.as_ref())?,
            Some(Argument::Context(context)) => serde_json::to_value(context.as_ref())?,
            Some(Argument::Null | Argument::Absent) | None => Value::Null,
        };
        Ok(serde_json::from_value(value)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Argument> {
        self.0
    }
}

impl IntoIterator for Arguments {
    type Item = Argument;
    type IntoIter = std::vec::IntoIter<Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Request rejected before the handler was called.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// JSON parsing was required but the body is not valid JSON.
    #[error("Unreadable request body, need valid JSON")]
    UnreadableBody,

    /// The request media type is not among the accepted ones.
    #[error("{}", unsupported_media_type_message(.accepted))]
    UnsupportedMediaType { accepted: Vec<MediaTypeRule> },
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::UnreadableBody => StatusCode::BAD_REQUEST,
            RequestError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}

fn unsupported_media_type_message(accepted: &[MediaTypeRule]) -> String {
    let named: Vec<&str> = accepted
        .iter()
        .filter_map(|rule| match rule {
            MediaTypeRule::Named(name) => Some(name.as_str()),
            MediaTypeRule::Omitted => None,
        })
        .collect();

    let mut message = format!(
        "Unsupported Media Type. Supported media types are: {}.",
        named.join(", ")
    );
    if accepted.contains(&MediaTypeRule::Omitted) {
        message.push_str(" This endpoint also supports omitting the Content-Type header.");
    }
    message
}

/// Build the handler's argument list for one event.
///
/// Fails only on the body binding: with a media type outside the accepted
/// list, or with a body that must be parsed as JSON but is not valid JSON.
pub fn resolve(
    table: &BindingTable,
    event: &Arc<ProxyEvent>,
    context: &Arc<InvocationContext>,
) -> Result<Arguments, RequestError> {
    if table.is_empty() {
        return Ok(Arguments::default());
    }

    let headers = event.lowercase_headers();
    let mut resolved: Vec<(Slot, Argument)> = table
        .bindings()
        .map(|(role, slot)| {
            let argument = match role {
                Role::Header(name) => text_argument(headers.get(&name.to_lowercase()).copied()),
                Role::PathParam(name) => text_argument(event.path_parameter(name)),
                Role::QueryParam(name) => text_argument(event.query_parameter(name)),
                Role::Authorizer => event
                    .authorizer()
                    .map_or(Argument::Absent, |claims| Argument::Value(claims.clone())),
                Role::Event => Argument::Event(Arc::clone(event)),
                Role::Context => Argument::Context(Arc::clone(context)),
                Role::Body => Argument::Absent,
            };
            (slot, argument)
        })
        .collect();

    if let Some(body) = table.body() {
        let media_type = extract_media_type(headers.get("content-type").copied());
        resolved.push((body.slot, body_argument(body, event, media_type)?));
    }

    let mut arguments = vec![Argument::Null; table.arity()];
    for (slot, argument) in resolved {
        arguments[slot] = argument;
    }
    Ok(Arguments(arguments))
}

fn text_argument(value: Option<&str>) -> Argument {
    value.map_or(Argument::Absent, |text| {
        Argument::Value(Value::String(text.to_string()))
    })
}

fn body_argument(
    binding: &BodyBinding,
    event: &ProxyEvent,
    media_type: Option<&str>,
) -> Result<Argument, RequestError> {
    if let Some(accepted) = &binding.content_types {
        if !is_supported(accepted, media_type) {
            return Err(RequestError::UnsupportedMediaType {
                accepted: accepted.clone(),
            });
        }
    }

    let body = match &event.body {
        None | Some(Value::Null) => return Ok(Argument::Absent),
        Some(body) => body,
    };

    if !should_parse_json(binding.parse_json.as_ref(), media_type) {
        return Ok(Argument::Value(body.clone()));
    }

    match body {
        Value::String(text) => serde_json::from_str(text)
            .map(Argument::Value)
            .map_err(|_| RequestError::UnreadableBody),
        structured => Ok(Argument::Value(structured.clone())),
    }
}
