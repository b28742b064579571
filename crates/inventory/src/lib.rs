//! Inventory domain module.
//!
//! This crate contains the business rules for products, stock movements and
//! low-stock alerts, implemented purely as deterministic domain logic (no IO,
//! no HTTP, no storage). Callers pass `now` explicitly.

pub mod alert;
pub mod movement;
pub mod product;
pub mod seed;
pub mod store;
pub mod summary;

pub use alert::{Alert, recompute_alerts};
pub use movement::{MovementDirection, RecordMovement, StockMovement, UNKNOWN_ACTOR};
pub use product::{NewProduct, Product, ProductFilter, ProductPatch, StockStatus};
pub use store::{InventorySnapshot, InventoryStore};
pub use summary::DashboardSummary;
