//! Errors for session setup, configuration, and compartments

use thiserror::Error;

/// Errors returned by operations that configure or reshape a session.
///
/// Integration outcomes are not errors: [`Session::advance`](crate::Session::advance)
/// reports them through [`Status`](crate::Status).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The session could not be created; no handle exists.
    #[error("session construction failed: {0}")]
    Construction(String),

    /// A configuration value was out of range. The previous value is kept.
    #[error("invalid value for `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The operation is not allowed in the session's current state.
    #[error("invalid session state: {0}")]
    InvalidState(String),

    /// A buffer did not match the session's state length.
    #[error("expected a vector of length {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Linking the compartment would make it its own ancestor.
    #[error("compartment '{child}' cannot be placed inside '{parent}': it would contain itself")]
    CompartmentCycle { child: String, parent: String },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
