use serde::{Deserialize, Serialize};

use crate::movement::StockMovement;
use crate::product::{Product, StockStatus};
use crate::store::InventoryStore;

const LOW_STOCK_PREVIEW: usize = 5;
const RECENT_MOVEMENTS: usize = 5;

/// Headline figures for the dashboard view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_products: usize,
    pub total_stock: i64,
    pub inventory_value: f64,
    pub unread_alerts: usize,
    pub out_of_stock: usize,
    /// Low but not empty, at most five, in catalogue order.
    pub low_stock: Vec<Product>,
    pub recent_movements: Vec<StockMovement>,
}

impl DashboardSummary {
    pub fn from_store(store: &InventoryStore) -> Self {
        let products = store.products();
        Self {
            total_products: products.len(),
            // Saturates: individual stocks may each be near `i64::MAX`.
            total_stock: products.iter().fold(0i64, |acc, p| acc.saturating_add(p.stock)),
            inventory_value: products.iter().map(Product::stock_value).sum(),
            unread_alerts: store.unread_count(),
            out_of_stock: products
                .iter()
                .filter(|p| p.status() == StockStatus::OutOfStock)
                .count(),
            low_stock: products
                .iter()
                .filter(|p| p.status() == StockStatus::Low)
                .take(LOW_STOCK_PREVIEW)
                .cloned()
                .collect(),
            recent_movements: store
                .movements()
                .iter()
                .take(RECENT_MOVEMENTS)
                .cloned()
                .collect(),
        }
    }
}
