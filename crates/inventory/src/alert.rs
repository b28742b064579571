//! Low-stock alerts and their derivation from the product list.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockarium_core::{AlertId, Entity, ProductId};

use crate::product::Product;

/// Notice that a product was at or below its threshold when detected.
///
/// `current_stock` and `min_stock` are a snapshot taken at detection time and
/// are not refreshed while the alert stays unread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: AlertId,
    pub product_id: ProductId,
    pub product_name: String,
    pub current_stock: i64,
    pub min_stock: i64,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

impl Alert {
    /// Synthesize a fresh unread alert for `product`.
    pub fn detect(product: &Product, now: DateTime<Utc>) -> Self {
        Self {
            id: AlertId::new(),
            product_id: product.id,
            product_name: product.name.clone(),
            current_stock: product.stock,
            min_stock: product.min_stock,
            timestamp: now,
            read: false,
        }
    }

    pub fn acknowledge(&mut self) {
        self.read = true;
    }
}

impl Entity for Alert {
    type Id = AlertId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Derive the new alert list after the product collection changed.
///
/// - every low product (`stock <= min_stock`) keeps its first unread alert, or
///   gets a new one detected at `now`;
/// - unread alerts for products that are no longer low (or no longer exist)
///   are kept as they are;
/// - read alerts are kept unchanged.
///
/// At most one unread alert per product survives. Result order: alerts for
/// low products in product order, then the other unread alerts, then read ones.
pub fn recompute_alerts(products: &[Product], existing: &[Alert], now: DateTime<Utc>) -> Vec<Alert> {
    let mut unread_by_product: HashMap<ProductId, &Alert> = HashMap::new();
    for alert in existing.iter().filter(|a| !a.read) {
        unread_by_product.entry(alert.product_id).or_insert(alert);
    }

    let mut claimed: HashSet<ProductId> = HashSet::new();
    let mut next: Vec<Alert> = Vec::with_capacity(existing.len());

    for product in products.iter().filter(|p| p.is_low()) {
        if !claimed.insert(product.id) {
            continue;
        }
        match unread_by_product.get(&product.id) {
            Some(alert) => next.push((*alert).clone()),
            None => next.push(Alert::detect(product, now)),
        }
    }

    for alert in existing.iter().filter(|a| !a.read) {
        if claimed.insert(alert.product_id) {
            next.push(alert.clone());
        }
    }

    next.extend(existing.iter().filter(|a| a.read).cloned());
    next
}
