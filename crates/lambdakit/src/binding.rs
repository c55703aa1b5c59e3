//! Declarative binding of request parts to handler argument slots.

use std::fmt;

use crate::content_type::{JsonPolicy, MediaTypeRule};
use crate::error::BindingError;

/// Zero-based position in the handler's argument list.
pub type Slot = usize;

/// Logical request part that can be bound to an argument slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    /// The raw inbound event.
    Event,
    /// The Lambda invocation context.
    Context,
    /// Claims from `requestContext.authorizer`.
    Authorizer,
    /// A request header, looked up case-insensitively.
    Header(String),
    /// A path parameter.
    PathParam(String),
    /// A query-string parameter.
    QueryParam(String),
    /// The request body.
    Body,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Event => f.write_str("the raw event"),
            Role::Context => f.write_str("the invocation context"),
            Role::Authorizer => f.write_str("the authorizer claims"),
            Role::Header(name) => write!(f, "header '{name}'"),
            Role::PathParam(name) => write!(f, "path parameter '{name}'"),
            Role::QueryParam(name) => write!(f, "query parameter '{name}'"),
            Role::Body => f.write_str("the request body"),
        }
    }
}

/// Binding of the request body, with its media-type and parsing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyBinding {
    pub slot: Slot,
    /// When set, requests with any other media type are rejected with 415.
    pub content_types: Option<Vec<MediaTypeRule>>,
    /// When unset, JSON is parsed for `application/json` or a missing header.
    pub parse_json: Option<JsonPolicy>,
}

impl BodyBinding {
    /// Bind the body to `slot` with default options.
    pub fn at(slot: Slot) -> Self {
        Self {
            slot,
            content_types: None,
            parse_json: None,
        }
    }

    /// Set the JSON parsing policy.
    pub fn parse_json(mut self, policy: impl Into<JsonPolicy>) -> Self {
        self.parse_json = Some(policy.into());
        self
    }

    /// Restrict the accepted media types.
    pub fn content_types<I, M>(mut self, accepted: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MediaTypeRule>,
    {
        self.content_types = Some(accepted.into_iter().map(Into::into).collect());
        self
    }
}

/// Validated mapping from request parts to argument slots for one handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    bindings: Vec<(Role, Slot)>,
    body: Option<BodyBinding>,
}

impl BindingTable {
    pub fn builder() -> BindingTableBuilder {
        BindingTableBuilder::default()
    }

    /// Non-body bindings in declaration order.
    pub fn bindings(&self) -> impl Iterator<Item = (&Role, Slot)> {
        self.bindings.iter().map(|(role, slot)| (role, *slot))
    }

    pub fn body(&self) -> Option<&BodyBinding> {
        self.body.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.body.is_none()
    }

    /// Length of the argument list this table resolves to.
    pub fn arity(&self) -> usize {
        self.bindings()
            .map(|(_, slot)| slot)
            .chain(self.body.iter().map(|body| body.slot))
            .map(|slot| slot.saturating_add(1))
            .max()
            .unwrap_or(0)
    }
}

/// Highest argument slot a binding may target.
pub const MAX_SLOT: Slot = 255;

/// Builder for [`BindingTable`].
///
/// Declaring the same role twice keeps the latest slot. Two different roles
/// on one slot, or a slot above [`MAX_SLOT`], are rejected by
/// [`BindingTableBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct BindingTableBuilder {
    bindings: Vec<(Role, Slot)>,
    body: Option<BodyBinding>,
}

impl BindingTableBuilder {
    pub fn event(self, slot: Slot) -> Self {
        self.bind(Role::Event, slot)
    }

    pub fn context(self, slot: Slot) -> Self {
        self.bind(Role::Context, slot)
    }

    pub fn authorizer(self, slot: Slot) -> Self {
        self.bind(Role::Authorizer, slot)
    }

    pub fn header(self, name: impl Into<String>, slot: Slot) -> Self {
        self.bind(Role::Header(name.into()), slot)
    }

    pub fn path_param(self, name: impl Into<String>, slot: Slot) -> Self {
        self.bind(Role::PathParam(name.into()), slot)
    }

    pub fn query_param(self, name: impl Into<String>, slot: Slot) -> Self {
        self.bind(Role::QueryParam(name.into()), slot)
    }

    /// Bind the body. A second call replaces the first.
    pub fn body(mut self, body: BodyBinding) -> Self {
        self.body = Some(body);
        self
    }

    fn bind(mut self, role: Role, slot: Slot) -> Self {
        match self.bindings.iter_mut().find(|(existing, _)| *existing == role) {
            Some(entry) => entry.1 = slot,
            None => self.bindings.push((role, slot)),
        }
        self
    }

    pub fn build(self) -> Result<BindingTable, BindingError> {
        let mut claimed: Vec<(&Role, Slot)> = Vec::new();
        let body_role = Role::Body;
        let all = self
            .bindings
            .iter()
            .map(|(role, slot)| (role, *slot))
            .chain(self.body.iter().map(|body| (&body_role, body.slot)));

        for (role, slot) in all {
            if slot > MAX_SLOT {
                return Err(BindingError::SlotOutOfRange {
                    slot,
                    role: role.clone(),
                    max: MAX_SLOT,
                });
            }
            if let Some((first, _)) = claimed.iter().find(|(_, taken)| *taken == slot) {
                return Err(BindingError::SlotConflict {
                    slot,
                    first: Role::clone(first),
                    second: role.clone(),
                });
            }
            claimed.push((role, slot));
        }

        Ok(BindingTable {
            bindings: self.bindings,
            body: self.body,
        })
    }
}
