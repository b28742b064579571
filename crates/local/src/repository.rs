//! Persistence of the inventory collections.

use serde::Serialize;
use serde::de::DeserializeOwned;

use stockarium_inventory::InventorySnapshot;

use crate::kv::{KeyValueStore, StorageError, key};

pub const PRODUCTS: &str = "products";
pub const MOVEMENTS: &str = "movements";
pub const ALERTS: &str = "alerts";

/// Loads and saves [`InventorySnapshot`]s as three JSON entries.
///
/// The three entries are written in a single `set_many` batch, so products,
/// movements and alerts cannot drift apart on a failed write.
#[derive(Debug, Clone)]
pub struct InventoryRepository<S> {
    store: S,
}

impl<S: KeyValueStore> InventoryRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the persisted snapshot.
    ///
    /// Returns `None` when no product collection was ever saved; missing
    /// movement or alert entries read as empty.
    pub fn load(&self) -> Result<Option<InventorySnapshot>, StorageError> {
        let Some(products) = self.load_json(PRODUCTS)? else {
            return Ok(None);
        };
        Ok(Some(InventorySnapshot {
            products,
            movements: self.load_json(MOVEMENTS)?.unwrap_or_default(),
            alerts: self.load_json(ALERTS)?.unwrap_or_default(),
        }))
    }

    pub fn save(&self, snapshot: &InventorySnapshot) -> Result<(), StorageError> {
        self.store.set_many(vec![
            (key(PRODUCTS), serde_json::to_string(&snapshot.products)?),
            (key(MOVEMENTS), serde_json::to_string(&snapshot.movements)?),
            (key(ALERTS), serde_json::to_string(&snapshot.alerts)?),
        ])?;
        tracing::debug!(
            products = snapshot.products.len(),
            movements = snapshot.movements.len(),
            alerts = snapshot.alerts.len(),
            "inventory saved"
        );
        Ok(())
    }

    /// Read and deserialize one namespaced entry.
    pub fn load_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StorageError> {
        match self.store.get(&key(name))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize and write one namespaced entry.
    pub fn save_json<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StorageError> {
        self.store.set(&key(name), serde_json::to_string(value)?)
    }
}
