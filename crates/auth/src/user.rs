//! Users and the credential directory.

use std::collections::BTreeMap;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockarium_core::{Entity, UserId};

use crate::Role;

/// An authenticated user as seen by the rest of the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Display name.
    pub name: String,
    pub role: Role,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Registration request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// A stored user with its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    user: User,
    password_hash: String,
}

impl Account {
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Check `password` against the stored hash. CPU-bound; callers on an
    /// async runtime run it off the reactor.
    pub fn verify(self, password: &str) -> Result<User, DirectoryError> {
        if verify_password(password, &self.password_hash)? {
            Ok(self.user)
        } else {
            Err(DirectoryError::InvalidCredentials)
        }
    }
}

impl Registration {
    /// Validate the fields and hash the password into a ready-to-insert
    /// account. Does not consult any directory.
    pub fn into_account(self) -> Result<Account, DirectoryError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(DirectoryError::Validation("username cannot be empty".to_string()));
        }
        if self.password.is_empty() {
            return Err(DirectoryError::Validation("password cannot be empty".to_string()));
        }

        let name = match self.name.trim() {
            "" => username.to_string(),
            n => n.to_string(),
        };
        let user = User {
            id: UserId::new(),
            username: username.to_string(),
            name,
            role: self.role.unwrap_or_default(),
        };
        let password_hash = hash_password(&self.password)?;
        Ok(Account { user, password_hash })
    }
}

/// Username → account map with Argon2 password hashes.
///
/// Usernames are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserDirectory {
    accounts: BTreeMap<String, Account>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory with the two demo accounts; each logs in with its username
    /// as password.
    pub fn demo() -> Result<Self, DirectoryError> {
        let mut dir = Self::new();
        dir.register(Registration {
            username: "admin".to_string(),
            password: "admin".to_string(),
            name: "Administrador".to_string(),
            role: Some(Role::Admin),
        })?;
        dir.register(Registration {
            username: "empleado".to_string(),
            password: "empleado".to_string(),
            name: "Juan Pérez".to_string(),
            role: Some(Role::Employee),
        })?;
        Ok(dir)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.accounts.get(&key(username)).map(|a| &a.user)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.accounts.values().map(|a| &a.user)
    }

    /// Fail fast when `username` is blank or already registered.
    pub fn ensure_available(&self, username: &str) -> Result<(), DirectoryError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DirectoryError::Validation("username cannot be empty".to_string()));
        }
        if self.accounts.contains_key(&key(username)) {
            return Err(DirectoryError::UsernameTaken(username.to_string()));
        }
        Ok(())
    }

    /// Add a prepared account; the username is re-checked since hashing may
    /// have happened outside any lock.
    pub fn insert(&mut self, account: Account) -> Result<User, DirectoryError> {
        self.ensure_available(&account.user.username)?;
        let user = account.user.clone();
        tracing::debug!(username = %user.username, role = %user.role, "user registered");
        self.accounts.insert(key(&user.username), account);
        Ok(user)
    }

    /// Create an account. The role defaults to employee and the display name
    /// to the username.
    pub fn register(&mut self, reg: Registration) -> Result<User, DirectoryError> {
        self.ensure_available(&reg.username)?;
        let account = reg.into_account()?;
        self.insert(account)
    }

    /// Stored account for `username`, cloned so the hash check can run
    /// without borrowing the directory.
    pub fn account(&self, username: &str) -> Result<Account, DirectoryError> {
        self.accounts
            .get(&key(username))
            .cloned()
            .ok_or(DirectoryError::InvalidCredentials)
    }

    /// Check a username/password pair.
    pub fn verify(&self, username: &str, password: &str) -> Result<User, DirectoryError> {
        self.account(username)?.verify(password)
    }
}

fn key(username: &str) -> String {
    username.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String, DirectoryError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DirectoryError::Hash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, DirectoryError> {
    let parsed = PasswordHash::new(hash).map_err(|e| DirectoryError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
