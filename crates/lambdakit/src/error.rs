use thiserror::Error;

use crate::binding::{Role, Slot};

/// Raised while validating a binding table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// Two different request parts target the same argument slot.
    #[error("argument slot {slot} is bound to both {first} and {second}")]
    SlotConflict { slot: Slot, first: Role, second: Role },

    /// A binding targets a slot past the supported argument count.
    #[error("{role} is bound to argument slot {slot}, the highest allowed slot is {max}")]
    SlotOutOfRange { slot: Slot, role: Role, max: Slot },
}

/// Fatal configuration error raised during cold start.
///
/// No response is produced for these: the runtime aborts startup instead.
#[derive(Debug, Error)]
pub enum InitError {
    /// The definition never declared a handler entry point.
    #[error("no entry point was declared, did you forget to call Definition::handler?")]
    MissingHandler,

    /// The declared parameter bindings are inconsistent.
    #[error("invalid parameter bindings: {0}")]
    Bindings(#[from] BindingError),

    /// The init method reported a failure.
    #[error("the init method failed: {0}")]
    Initializer(String),

    /// The init method handed back a computation that has not completed.
    #[error(
        "the init method returned a pending computation; it must complete synchronously \
         and store any futures on the instance instead"
    )]
    InitializerPending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_conflict_names_both_roles() {
        let err = BindingError::SlotConflict {
            slot: 2,
            first: Role::Header("X-Trace".to_string()),
            second: Role::QueryParam("trace".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("slot 2"));
        assert!(message.contains("header 'X-Trace'"));
        assert!(message.contains("query parameter 'trace'"));
    }

    #[test]
    fn init_error_wraps_binding_error() {
        let err: InitError = BindingError::SlotConflict {
            slot: 0,
            first: Role::Event,
            second: Role::Context,
        }
        .into();
        assert!(matches!(err, InitError::Bindings(_)));
        assert!(err.to_string().starts_with("invalid parameter bindings"));
    }
}
