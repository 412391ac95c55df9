//! Procedure error taxonomy.
//!
//! # Invariants
//! - `NotFound` covers both absent and foreign-owned resources.
//! - Persistence failures propagate annotated, never swallowed.

use crate::model::ValidationError;
use crate::repo::RepoError;
use crate::transport::wire::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure outcome of one procedure call.
#[derive(Debug)]
pub enum ProcedureError {
    /// Input payload failed schema decoding.
    InvalidInput(String),
    /// Input decoded but violated a domain rule.
    Validation(ValidationError),
    /// Protected operation called without a resolved identity.
    Unauthorized,
    /// Resource absent or not owned by the caller.
    NotFound,
    /// Persistence constraint rejection.
    Conflict(String),
    /// Opaque persistence-gateway failure.
    Internal(String),
}

impl ProcedureError {
    /// Wire code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidInput(_) | Self::Validation(_) => ErrorCode::Validation,
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::NotFound => ErrorCode::NotFound,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }
}

impl Display for ProcedureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Unauthorized => write!(f, "User is not authenticated"),
            Self::NotFound => write!(f, "resource not found"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl Error for ProcedureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ProcedureError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ProcedureError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(_) => Self::NotFound,
            RepoError::Constraint(message) => Self::Conflict(message),
            RepoError::Db(err) => Self::Internal(err.to_string()),
            RepoError::InvalidData(message) => Self::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProcedureError;
    use crate::model::ValidationError;
    use crate::repo::RepoError;
    use crate::transport::wire::ErrorCode;
    use uuid::Uuid;

    #[test]
    fn codes_follow_taxonomy() {
        assert_eq!(
            ProcedureError::InvalidInput("bad".into()).code(),
            ErrorCode::Validation
        );
        assert_eq!(
            ProcedureError::Validation(ValidationError::ProjectNameTooShort { actual_chars: 4 })
                .code(),
            ErrorCode::Validation
        );
        assert_eq!(ProcedureError::Unauthorized.code(), ErrorCode::Unauthorized);
        assert_eq!(ProcedureError::NotFound.code(), ErrorCode::NotFound);
    }

    #[test]
    fn repo_not_found_merges_into_not_found() {
        let err = ProcedureError::from(RepoError::NotFound(Uuid::new_v4()));
        assert_eq!(err.code(), ErrorCode::NotFound);
        // The id is deliberately dropped from the message.
        assert_eq!(err.to_string(), "resource not found");
    }
}
