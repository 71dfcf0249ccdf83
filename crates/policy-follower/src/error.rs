use thiserror::Error;

use crate::names::{display_list, Name};
use crate::violation::Violation;

/// Errors raised while declaring or applying followed policies.
///
/// Only [`PolicyError::Violation`] is an expected outcome of applying a
/// policy. Every other kind is a defect of the declaration or of the caller
/// and is never swallowed by this crate.
#[derive(Error, Debug, Clone)]
pub enum PolicyError {
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("policy not found: {policy} in namespace {namespace:?}")]
    PolicyNotFound { namespace: String, policy: String },

    #[error(
        "{policy} requires {required} attribute(s). {} cannot be assigned.",
        display_list(.attributes)
    )]
    ArityMismatch {
        policy: String,
        required: usize,
        attributes: Vec<Name>,
    },

    #[error("follower {follower} has no attribute {attribute}")]
    UnknownAttribute { follower: String, attribute: Name },

    #[error("invalid attribute {field} for {policy}: {reason}")]
    InvalidAttribute {
        policy: String,
        field: String,
        reason: String,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Violation(#[from] Violation),
}

impl PolicyError {
    /// Whether this is the recoverable application-time failure.
    pub fn is_violation(&self) -> bool {
        matches!(self, PolicyError::Violation(_))
    }

    pub fn as_violation(&self) -> Option<&Violation> {
        match self {
            PolicyError::Violation(violation) => Some(violation),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PolicyError {
    fn from(err: serde_json::Error) -> Self {
        PolicyError::Serialization(err.to_string())
    }
}

/// Result type for policy operations
pub type Result<T> = std::result::Result<T, PolicyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_mismatch_message_format() {
        let err = PolicyError::ArityMismatch {
            policy: "Namespace::Policy".into(),
            required: 2,
            attributes: vec![Name::new("foo").unwrap()],
        };
        assert_eq!(
            err.to_string(),
            "Namespace::Policy requires 2 attribute(s). [foo] cannot be assigned."
        );
    }

    #[test]
    fn policy_not_found_display() {
        let err = PolicyError::PolicyNotFound {
            namespace: "Policies".into(),
            policy: "Missing".into(),
        };
        assert!(err.to_string().contains("Missing"));
        assert!(!err.is_violation());
        assert!(err.as_violation().is_none());
    }
}
