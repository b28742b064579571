//! Local workspace: the controller used by a front end running without a
//! backend.
//!
//! Every successful mutation is followed by an explicit save of all three
//! collections. When that save fails the in-memory state is rolled back, so
//! memory and storage never disagree after a call returns.

use chrono::{DateTime, Utc};
use thiserror::Error;

use stockarium_auth::{AuthzError, DirectoryError, Permission, Principal, User, UserDirectory, authorize};
use stockarium_core::{AlertId, DomainError, DomainResult, ProductId};
use stockarium_inventory::{
    DashboardSummary, InventoryStore, MovementDirection, NewProduct, Product, ProductPatch,
    RecordMovement, StockMovement, seed,
};

use crate::kv::{KeyValueStore, StorageError};
use crate::repository::InventoryRepository;
use crate::session::SessionStore;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error("no user is signed in")]
    NotSignedIn,
}

pub struct LocalWorkspace<S> {
    inventory: InventoryStore,
    repo: InventoryRepository<S>,
    session: SessionStore<S>,
    users: UserDirectory,
    user: Option<User>,
}

impl<S: KeyValueStore + Clone> LocalWorkspace<S> {
    /// Open a workspace over `store`.
    ///
    /// An empty store is seeded with the demo catalogue (and saved); a
    /// persisted session user is restored.
    pub fn open(store: S, users: UserDirectory, now: DateTime<Utc>) -> Result<Self, WorkspaceError> {
        let repo = InventoryRepository::new(store.clone());
        let session = SessionStore::new(store);

        let inventory = match repo.load()? {
            Some(snapshot) => InventoryStore::from_snapshot(snapshot, now),
            None => {
                tracing::info!("no persisted inventory; seeding demo catalogue");
                let inventory = InventoryStore::from_snapshot(seed::demo_snapshot(now), now);
                repo.save(&inventory.snapshot())?;
                inventory
            }
        };
        let user = session.user()?;

        Ok(Self {
            inventory,
            repo,
            session,
            users,
            user,
        })
    }

    /// [`open`](Self::open) with the demo user directory.
    pub fn open_demo(store: S, now: DateTime<Utc>) -> Result<Self, WorkspaceError> {
        Self::open(store, UserDirectory::demo()?, now)
    }

    pub fn inventory(&self) -> &InventoryStore {
        &self.inventory
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::from_store(&self.inventory)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    // -------------------------
    // Session
    // -------------------------

    pub fn login(&mut self, username: &str, password: &str) -> Result<&User, WorkspaceError> {
        let user = match self.users.verify(username, password) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(username, "login refused");
                return Err(e.into());
            }
        };
        self.session.set_user(&user)?;
        tracing::info!(username = %user.username, role = %user.role, "signed in");
        Ok(&*self.user.insert(user))
    }

    pub fn logout(&mut self) -> Result<(), WorkspaceError> {
        self.session.clear()?;
        if let Some(user) = self.user.take() {
            tracing::info!(username = %user.username, "signed out");
        }
        Ok(())
    }

    // -------------------------
    // Mutations
    // -------------------------

    pub fn add_product(&mut self, data: NewProduct, now: DateTime<Utc>) -> Result<Product, WorkspaceError> {
        self.require(&Permission::PRODUCTS_WRITE)?;
        self.commit(|inv| inv.add_product(data, now).cloned())
    }

    /// `Ok(None)` when the product does not exist (nothing is saved).
    pub fn update_product(
        &mut self,
        id: &ProductId,
        patch: ProductPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, WorkspaceError> {
        self.require(&Permission::PRODUCTS_WRITE)?;
        if self.inventory.product(id).is_none() {
            return Ok(None);
        }
        self.commit(|inv| Ok(inv.update_product(id, patch, now)?.cloned()))
    }

    pub fn delete_product(&mut self, id: &ProductId, now: DateTime<Utc>) -> Result<Option<Product>, WorkspaceError> {
        self.require(&Permission::PRODUCTS_WRITE)?;
        if self.inventory.product(id).is_none() {
            return Ok(None);
        }
        self.commit(|inv| Ok(inv.delete_product(id, now)))
    }

    /// Record a movement attributed to the signed-in user.
    pub fn record_movement(
        &mut self,
        product_id: ProductId,
        quantity: i64,
        direction: MovementDirection,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<StockMovement, WorkspaceError> {
        let actor = self.require(&Permission::STOCK_ADJUST)?.name.clone();
        let cmd = RecordMovement::new(product_id, quantity, direction, reason, now).by(actor);

        let result = self.commit(|inv| inv.record_movement(cmd).cloned());
        if let Err(WorkspaceError::Domain(DomainError::InsufficientStock { requested, available })) = &result {
            tracing::warn!(%product_id, requested, available, "movement refused: insufficient stock");
        }
        result
    }

    pub fn acknowledge_alert(&mut self, id: &AlertId) -> Result<bool, WorkspaceError> {
        self.require(&Permission::ALERTS_ACKNOWLEDGE)?;
        if !self.inventory.alerts().iter().any(|a| &a.id == id) {
            return Ok(false);
        }
        self.commit(|inv| Ok(inv.acknowledge_alert(id)))
    }

    pub fn acknowledge_all(&mut self) -> Result<usize, WorkspaceError> {
        self.require(&Permission::ALERTS_ACKNOWLEDGE)?;
        self.commit(|inv| Ok(inv.acknowledge_all()))
    }

    /// Write the current collections.
    pub fn save(&self) -> Result<(), WorkspaceError> {
        self.repo.save(&self.inventory.snapshot())?;
        Ok(())
    }

    fn require(&self, permission: &Permission) -> Result<&User, WorkspaceError> {
        let user = self.user.as_ref().ok_or(WorkspaceError::NotSignedIn)?;
        authorize(&Principal::from_role(user.id, user.role), permission)?;
        Ok(user)
    }

    fn commit<T>(
        &mut self,
        op: impl FnOnce(&mut InventoryStore) -> DomainResult<T>,
    ) -> Result<T, WorkspaceError> {
        let before = self.inventory.clone();
        let out = op(&mut self.inventory)?;

        if let Err(e) = self.repo.save(&self.inventory.snapshot()) {
            tracing::error!(error = %e, "failed to persist inventory; rolling back");
            self.inventory = before;
            return Err(e.into());
        }
        Ok(out)
    }
}
