//! API-side authorization guard.
//!
//! Checks run at the handler boundary, before the store is locked, so the
//! inventory domain stays auth-agnostic.

use stockarium_auth::{AuthzError, Permission, authorize};

use crate::context::PrincipalContext;

/// Check that the request principal holds `required`.
pub fn require(principal: &PrincipalContext, required: &Permission) -> Result<(), AuthzError> {
    authorize(&principal.principal(), required).inspect_err(|_| {
        tracing::warn!(
            username = principal.username(),
            role = %principal.role(),
            permission = required.as_str(),
            "permission denied"
        );
    })
}
