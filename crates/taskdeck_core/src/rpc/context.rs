//! Per-call request context and the authorization gate.
//!
//! # Responsibility
//! - Carry the identity resolved by the external identity collaborator.
//! - Short-circuit protected calls that lack an identity, before any handler
//!   or persistence work runs.
//!
//! # Invariants
//! - Handlers receive the resolved identity as a parameter and never
//!   re-derive it.
//! - The gate performs no I/O.

use crate::rpc::error::ProcedureError;

/// Ephemeral per-call context built by the caller.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    user_id: Option<String>,
}

impl RequestContext {
    /// Context for a caller with a resolved identity.
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    /// Context for an unauthenticated caller.
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// Resolved identity, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

/// Returns the resolved caller identity, or a uniform `Unauthorized` failure.
pub fn require_identity(ctx: &RequestContext) -> Result<&str, ProcedureError> {
    ctx.user_id().ok_or(ProcedureError::Unauthorized)
}
