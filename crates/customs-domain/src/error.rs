//! Error taxonomy shared by every layer of the engine

use thiserror::Error;

/// Result alias used across the engine
pub type Result<T> = std::result::Result<T, CustomsError>;

/// Category of a [`CustomsError`], for callers that branch on the kind of
/// failure rather than on its message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input
    Validation,
    /// Uniqueness violation
    Conflict,
    /// Stage-ordering violation
    Precondition,
    /// Referenced entity absent
    NotFound,
    /// Authorization denied
    Forbidden,
    /// Storage or infrastructure failure
    Storage,
}

/// Failures returned by engine operations
///
/// Every variant except [`CustomsError::Storage`] is recoverable by the
/// caller; none of them leave partially applied state behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CustomsError {
    /// Malformed or missing input; fix and retry
    #[error("Validation error: {0}")]
    Validation(String),

    /// A globally unique value is already taken, or a stage is already recorded
    #[error("Conflict: {field} '{value}' is already recorded")]
    Conflict {
        /// Field that collided
        field: String,
        /// Offending value
        value: String,
    },

    /// A previous stage has to be completed first
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("customer", "folder", "declaration")
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The actor lacks the required capability
    #[error("Forbidden: missing capability '{capability}'")]
    Forbidden {
        /// Capability that was checked
        capability: String,
    },

    /// Storage layer failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CustomsError {
    /// Shorthand for a conflict on a named field
    pub fn conflict(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Conflict {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Shorthand for a missing entity
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Precondition(_) => ErrorKind::Precondition,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_actionable() {
        let err = CustomsError::conflict("receipt_number", "R-1");
        assert_eq!(err.to_string(), "Conflict: receipt_number 'R-1' is already recorded");
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = CustomsError::not_found("folder", "abc");
        assert_eq!(err.to_string(), "folder not found: abc");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
