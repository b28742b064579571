//! `stockarium-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows about
//! roles, permissions, user credentials and token claims, nothing else.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, Principal, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256Jwt, JwtValidator, TokenError, peek_expiry};
pub use permissions::Permission;
pub use roles::Role;
pub use user::{Account, DirectoryError, Registration, User, UserDirectory};
