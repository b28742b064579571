use std::collections::HashSet;

use thiserror::Error;

use stockarium_core::UserId;

use crate::{Permission, Role};

/// A resolved principal for authorization decisions.
///
/// Construction is decoupled from storage and transport: the API derives it
/// from verified token claims, the local workspace from its session user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl Principal {
    /// Principal holding exactly the permissions its role grants.
    pub fn from_role(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
            permissions: role.permissions(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a principal for one permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let perms: HashSet<&str> = principal.permissions.iter().map(|p| p.as_str()).collect();

    if perms.contains("*") || perms.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_wildcard_grants_everything() {
        let admin = Principal::from_role(UserId::new(), Role::Admin);
        assert!(authorize(&admin, &Permission::PRODUCTS_WRITE).is_ok());
        assert!(authorize(&admin, &Permission::STOCK_ADJUST).is_ok());
        assert!(authorize(&admin, &Permission::new("anything.else")).is_ok());
    }

    #[test]
    fn employee_reads_and_acknowledges_but_cannot_write() {
        let employee = Principal::from_role(UserId::new(), Role::Employee);
        assert!(authorize(&employee, &Permission::PRODUCTS_READ).is_ok());
        assert!(authorize(&employee, &Permission::ALERTS_ACKNOWLEDGE).is_ok());
        assert_eq!(
            authorize(&employee, &Permission::STOCK_ADJUST),
            Err(AuthzError::Forbidden("stock.adjust".to_string()))
        );
        assert!(authorize(&employee, &Permission::PRODUCTS_WRITE).is_err());
    }
}
