use serde::{Deserialize, Serialize};

use crate::Permission;

/// Role of a user within the inventory.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages the catalogue and records stock movements.
    Admin,
    /// Read access plus alert acknowledgement.
    #[default]
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }

    /// Permissions granted by this role.
    ///
    /// Convention: "admin" holds the wildcard.
    pub fn permissions(&self) -> Vec<Permission> {
        match self {
            Role::Admin => vec![Permission::new("*")],
            Role::Employee => vec![
                Permission::PRODUCTS_READ,
                Permission::STOCK_READ,
                Permission::ALERTS_READ,
                Permission::ALERTS_ACKNOWLEDGE,
            ],
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}
