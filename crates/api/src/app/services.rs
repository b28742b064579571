//! Shared service state: the inventory store, the user directory and the
//! token issuer, with persistence behind a key-value store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use stockarium_auth::{Hs256Jwt, Registration, Role, User, UserDirectory};
use stockarium_core::DomainResult;
use stockarium_inventory::{InventorySnapshot, InventoryStore, seed};
use stockarium_local::{InventoryRepository, KeyValueStore, StorageError};

use crate::app::errors::ApiError;

/// Persisted entry holding the user directory.
pub const USERS: &str = "users";

type Store = Arc<dyn KeyValueStore>;

struct State {
    inventory: InventoryStore,
    users: UserDirectory,
}

/// One store for the whole process.
///
/// Each request holds the lock for mutate + persist, so writes are
/// serialized and a failed save never leaves memory ahead of storage.
pub struct AppServices {
    state: Mutex<State>,
    repo: InventoryRepository<Store>,
    jwt: Arc<Hs256Jwt>,
}

impl AppServices {
    /// Load persisted state from `store`, seeding demo data into an empty
    /// store when `seed_demo` is set.
    pub fn open(
        store: Store,
        jwt: Arc<Hs256Jwt>,
        seed_demo: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, ApiError> {
        let repo = InventoryRepository::new(store);

        let inventory = match repo.load()? {
            Some(snapshot) => InventoryStore::from_snapshot(snapshot, now),
            None => {
                let snapshot = if seed_demo {
                    tracing::info!("empty store; seeding demo catalogue");
                    seed::demo_snapshot(now)
                } else {
                    InventorySnapshot::default()
                };
                let inventory = InventoryStore::from_snapshot(snapshot, now);
                repo.save(&inventory.snapshot())?;
                inventory
            }
        };

        let users = match repo.load_json::<UserDirectory>(USERS)? {
            Some(users) => users,
            None => {
                let users = if seed_demo { UserDirectory::demo()? } else { UserDirectory::new() };
                repo.save_json(USERS, &users)?;
                users
            }
        };

        tracing::info!(
            products = inventory.products().len(),
            users = users.len(),
            "services ready"
        );

        Ok(Self {
            state: Mutex::new(State { inventory, users }),
            repo,
            jwt,
        })
    }

    /// Run a read-only query against the store.
    pub async fn read<T>(&self, f: impl FnOnce(&InventoryStore) -> T) -> T {
        let state = self.state.lock().await;
        f(&state.inventory)
    }

    /// Apply `op` and persist the result; on a storage failure the store is
    /// restored to its state before `op`.
    pub async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut InventoryStore) -> DomainResult<T>,
    ) -> Result<T, ApiError> {
        let mut state = self.state.lock().await;
        let before = state.inventory.clone();
        let out = op(&mut state.inventory)?;

        if let Err(e) = self.repo.save(&state.inventory.snapshot()) {
            tracing::error!(error = %e, "failed to persist inventory; rolling back");
            state.inventory = before;
            return Err(e.into());
        }
        Ok(out)
    }

    /// Verify credentials and issue a bearer token.
    ///
    /// The Argon2 check runs on the blocking pool against a cloned account,
    /// so the state lock is only held for the lookup.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<(String, User), ApiError> {
        let account = {
            let state = self.state.lock().await;
            state.users.account(username)
        };
        let password = password.to_string();
        let user = match account {
            Ok(account) => tokio::task::spawn_blocking(move || account.verify(&password)).await?,
            Err(e) => Err(e),
        };
        let user = user.inspect_err(|_| tracing::warn!(username, "login refused"))?;

        let token = self.jwt.issue(&user, now)?;
        tracing::info!(username = %user.username, role = %user.role, "signed in");
        Ok((token, user))
    }

    /// Self-service sign-up. Always creates an employee whatever role the
    /// caller asked for.
    pub async fn register(&self, mut registration: Registration) -> Result<User, ApiError> {
        if registration.role.is_some_and(|r| r != Role::Employee) {
            tracing::warn!(username = %registration.username, "self-registration asked for a role; ignored");
        }
        registration.role = Some(Role::Employee);
        self.add_account(registration).await
    }

    /// Account creation by an administrator; the requested role is kept.
    pub async fn create_user(&self, registration: Registration) -> Result<User, ApiError> {
        self.add_account(registration).await
    }

    async fn add_account(&self, registration: Registration) -> Result<User, ApiError> {
        self.state.lock().await.users.ensure_available(&registration.username)?;
        let account = tokio::task::spawn_blocking(move || registration.into_account()).await??;

        let mut state = self.state.lock().await;
        let mut users = state.users.clone();
        let user = users.insert(account)?;

        self.save_users(&users)?;
        state.users = users;
        tracing::info!(username = %user.username, role = %user.role, "account created");
        Ok(user)
    }

    fn save_users(&self, users: &UserDirectory) -> Result<(), StorageError> {
        self.repo.save_json(USERS, users).inspect_err(|e| {
            tracing::error!(error = %e, "failed to persist user directory");
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use chrono::Duration;
    use stockarium_auth::DirectoryError;
    use stockarium_core::DomainError;
    use stockarium_inventory::{MovementDirection, ProductPatch, RecordMovement};
    use stockarium_local::InMemoryKeyValueStore;

    use super::*;

    /// Store whose writes fail while `broken` is set.
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: InMemoryKeyValueStore,
        broken: Arc<AtomicBool>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), StorageError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(StorageError::QuotaExceeded { limit: 0 });
            }
            self.inner.set_many(entries)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    fn registration(username: &str, role: Option<Role>) -> Registration {
        Registration {
            username: username.to_string(),
            password: "pw".to_string(),
            name: String::new(),
            role,
        }
    }

    fn jwt() -> Arc<Hs256Jwt> {
        Arc::new(Hs256Jwt::new(b"test-secret", Duration::minutes(5)))
    }

    #[tokio::test]
    async fn empty_store_is_seeded_once() {
        let kv = InMemoryKeyValueStore::new();
        let services = AppServices::open(Arc::new(kv.clone()), jwt(), true, Utc::now()).unwrap();
        assert_eq!(services.read(|inv| inv.products().len()).await, 8);
        assert!(kv.keys().unwrap().contains(&"stockarium_users".to_string()));

        services
            .mutate(|inv| {
                inv.delete_product(&seed::demo_product_id(1), Utc::now())
                    .ok_or(DomainError::NotFound)
            })
            .await
            .unwrap();

        let reopened = AppServices::open(Arc::new(kv), jwt(), true, Utc::now()).unwrap();
        assert_eq!(reopened.read(|inv| inv.products().len()).await, 7);
    }

    #[tokio::test]
    async fn unseeded_store_starts_empty() {
        let services =
            AppServices::open(Arc::new(InMemoryKeyValueStore::new()), jwt(), false, Utc::now()).unwrap();
        assert_eq!(services.read(|inv| inv.products().len()).await, 0);
        assert!(services.login("admin", "admin", Utc::now()).await.is_err());
    }

    #[tokio::test]
    async fn failed_mutation_leaves_store_untouched() {
        let services =
            AppServices::open(Arc::new(InMemoryKeyValueStore::new()), jwt(), true, Utc::now()).unwrap();
        let before = services.read(|inv| inv.clone()).await;

        let err = services
            .mutate(|inv| {
                inv.update_product(&seed::demo_product_id(1), ProductPatch::stock(-1), Utc::now())
                    .map(|_| ())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain(_)));
        assert_eq!(services.read(|inv| inv.clone()).await, before);
    }

    #[tokio::test]
    async fn storage_failure_rolls_the_mutation_back() {
        let kv = FlakyStore::default();
        let services = AppServices::open(Arc::new(kv.clone()), jwt(), true, Utc::now()).unwrap();
        let before = services.read(|inv| inv.clone()).await;

        kv.broken.store(true, Ordering::SeqCst);
        let err = services
            .mutate(|inv| {
                let cmd = RecordMovement::new(
                    seed::demo_product_id(1),
                    1,
                    MovementDirection::Out,
                    "sale",
                    Utc::now(),
                );
                inv.record_movement(cmd).map(|m| m.id)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));
        assert_eq!(services.read(|inv| inv.clone()).await, before);

        let err = services.mutate(|inv| Ok(inv.acknowledge_all())).await.unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));
        assert_eq!(services.read(|inv| inv.clone()).await, before);

        kv.broken.store(false, Ordering::SeqCst);
        let reopened = AppServices::open(Arc::new(kv), jwt(), true, Utc::now()).unwrap();
        assert_eq!(reopened.read(|inv| inv.clone()).await.snapshot(), before.snapshot());
    }

    #[tokio::test]
    async fn failed_user_save_keeps_directory_unchanged() {
        let kv = FlakyStore::default();
        let services = AppServices::open(Arc::new(kv.clone()), jwt(), false, Utc::now()).unwrap();

        kv.broken.store(true, Ordering::SeqCst);
        let err = services.register(registration("maria", None)).await.unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));

        kv.broken.store(false, Ordering::SeqCst);
        assert!(services.login("maria", "pw", Utc::now()).await.is_err());
        services.register(registration("maria", None)).await.unwrap();
    }

    #[tokio::test]
    async fn self_registration_cannot_pick_admin() {
        let services =
            AppServices::open(Arc::new(InMemoryKeyValueStore::new()), jwt(), false, Utc::now()).unwrap();

        let user = services.register(registration("mallory", Some(Role::Admin))).await.unwrap();
        assert_eq!(user.role, Role::Employee);

        let (_, logged_in) = services.login("mallory", "pw", Utc::now()).await.unwrap();
        assert_eq!(logged_in.role, Role::Employee);

        let admin = services.create_user(registration("boss", Some(Role::Admin))).await.unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected_before_hashing() {
        let services =
            AppServices::open(Arc::new(InMemoryKeyValueStore::new()), jwt(), true, Utc::now()).unwrap();
        let err = services.register(registration("ADMIN", None)).await.unwrap_err();
        assert!(matches!(err, ApiError::Directory(DirectoryError::UsernameTaken(_))));
    }

    #[tokio::test]
    async fn registered_users_can_log_in() {
        let services =
            AppServices::open(Arc::new(InMemoryKeyValueStore::new()), jwt(), false, Utc::now()).unwrap();
        let user = services
            .register(Registration {
                username: "maria".to_string(),
                password: "pw".to_string(),
                name: "María".to_string(),
                role: None,
            })
            .await
            .unwrap();

        let (token, logged_in) = services.login("maria", "pw", Utc::now()).await.unwrap();
        assert_eq!(logged_in, user);
        assert!(!token.is_empty());
    }
}
