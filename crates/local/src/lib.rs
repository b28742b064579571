//! `stockarium-local`: the locally persisted variant.
//!
//! - `kv`: key-value store abstraction (in-memory and file-backed)
//! - `repository`: atomic save/load of the three inventory collections
//! - `session`: persisted session user and bearer token
//! - `workspace`: controller tying store, persistence and session together

pub mod kv;
pub mod repository;
pub mod session;
pub mod workspace;

pub use kv::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, StorageError};
pub use repository::InventoryRepository;
pub use session::SessionStore;
pub use workspace::{LocalWorkspace, WorkspaceError};
