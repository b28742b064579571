//! Persisted session: the signed-in user and, for the API client, its token.

use stockarium_auth::User;

use crate::kv::{KeyValueStore, StorageError, key};

const USER: &str = "user";
const TOKEN: &str = "token";

#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn user(&self) -> Result<Option<User>, StorageError> {
        match self.store.get(&key(USER))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(&key(TOKEN))
    }

    pub fn set_user(&self, user: &User) -> Result<(), StorageError> {
        self.store.set(&key(USER), serde_json::to_string(user)?)
    }

    /// Store token and user together.
    pub fn set_login(&self, token: &str, user: &User) -> Result<(), StorageError> {
        self.store.set_many(vec![
            (key(TOKEN), token.to_string()),
            (key(USER), serde_json::to_string(user)?),
        ])
    }

    /// Forget the session (logout).
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(&key(TOKEN))?;
        self.store.remove(&key(USER))
    }
}

#[cfg(test)]
mod tests {
    use stockarium_auth::Role;
    use stockarium_core::UserId;

    use super::*;
    use crate::kv::InMemoryKeyValueStore;

    fn user() -> User {
        User {
            id: UserId::new(),
            username: "admin".to_string(),
            name: "Administrador".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn login_then_clear() {
        let session = SessionStore::new(InMemoryKeyValueStore::new());
        let u = user();

        session.set_login("tok", &u).unwrap();
        assert_eq!(session.token().unwrap().as_deref(), Some("tok"));
        assert_eq!(session.user().unwrap(), Some(u));

        session.clear().unwrap();
        assert_eq!(session.token().unwrap(), None);
        assert_eq!(session.user().unwrap(), None);
    }
}
