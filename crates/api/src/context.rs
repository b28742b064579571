use stockarium_auth::{JwtClaims, Principal, Role};
use stockarium_core::UserId;

/// Authenticated identity for a request, derived from the bearer token.
///
/// Inserted by the auth middleware; present for every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    username: String,
    name: String,
    role: Role,
}

impl PrincipalContext {
    pub fn from_claims(claims: JwtClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            name: claims.name,
            role: claims.role,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Display name recorded as the actor of stock movements.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn principal(&self) -> Principal {
        Principal::from_role(self.user_id, self.role)
    }
}
