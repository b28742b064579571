//! The inventory state store.
//!
//! `InventoryStore` owns the product list, the movement log and the derived
//! alert list. Every mutation goes through `&mut self`, and every change to
//! the product collection re-derives the alerts before returning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockarium_core::{AlertId, DomainError, DomainResult, MovementId, ProductId};

use crate::alert::{Alert, recompute_alerts};
use crate::movement::{RecordMovement, StockMovement, UNKNOWN_ACTOR};
use crate::product::{NewProduct, Product, ProductFilter, ProductPatch};

/// The three persisted collections taken together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub products: Vec<Product>,
    /// Newest first.
    #[serde(default)]
    pub movements: Vec<StockMovement>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryStore {
    products: Vec<Product>,
    movements: Vec<StockMovement>,
    alerts: Vec<Alert>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted collections.
    ///
    /// Alerts are re-derived once, so a snapshot saved before a threshold was
    /// crossed comes back with its alerts up to date.
    pub fn from_snapshot(snapshot: InventorySnapshot, now: DateTime<Utc>) -> Self {
        let mut store = Self {
            products: snapshot.products,
            movements: snapshot.movements,
            alerts: snapshot.alerts,
        };
        store.recompute_alerts(now);
        store
    }

    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            products: self.products.clone(),
            movements: self.movements.clone(),
            alerts: self.alerts.clone(),
        }
    }

    // -------------------------
    // Queries
    // -------------------------

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        stockarium_core::entity::find_by_id(&self.products, id)
    }

    /// Movement log, newest first.
    pub fn movements(&self) -> &[StockMovement] {
        &self.movements
    }

    /// Movements referencing `product_id`, newest first. Works for deleted
    /// products as well.
    pub fn movements_for<'a>(
        &'a self,
        product_id: &'a ProductId,
    ) -> impl Iterator<Item = &'a StockMovement> + 'a {
        self.movements
            .iter()
            .filter(move |m| &m.product_id == product_id)
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn unread_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| !a.read)
    }

    pub fn unread_count(&self) -> usize {
        self.unread_alerts().count()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for p in &self.products {
            if !seen.contains(&p.category.as_str()) {
                seen.push(&p.category);
            }
        }
        seen
    }

    pub fn search(&self, filter: &ProductFilter) -> Vec<&Product> {
        self.products.iter().filter(|p| filter.matches(p)).collect()
    }

    // -------------------------
    // Mutations
    // -------------------------

    /// Add a product with a fresh identity. SKUs are not required to be unique.
    pub fn add_product(&mut self, data: NewProduct, now: DateTime<Utc>) -> DomainResult<&Product> {
        data.validate()?;
        let id = ProductId::new();
        self.products.push(data.into_product(id, now));
        self.recompute_alerts(now);
        self.product(&id).ok_or(DomainError::NotFound)
    }

    /// Merge `patch` into the product with `id`.
    ///
    /// Returns `Ok(None)` without touching state when no such product exists.
    pub fn update_product(
        &mut self,
        id: &ProductId,
        patch: ProductPatch,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<&Product>> {
        let Some(idx) = self.position(id) else {
            return Ok(None);
        };
        patch.apply_to(&mut self.products[idx], now)?;
        self.recompute_alerts(now);
        Ok(self.products.get(idx))
    }

    /// Remove a product. Movements and alerts referencing it are kept.
    pub fn delete_product(&mut self, id: &ProductId, now: DateTime<Utc>) -> Option<Product> {
        let idx = self.position(id)?;
        let removed = self.products.remove(idx);
        self.recompute_alerts(now);
        Some(removed)
    }

    /// Apply a stock movement and prepend it to the log.
    ///
    /// An outbound movement larger than the stock on hand fails with
    /// [`DomainError::InsufficientStock`] and changes nothing.
    pub fn record_movement(&mut self, cmd: RecordMovement) -> DomainResult<&StockMovement> {
        cmd.validate()?;
        let idx = self.position(&cmd.product_id).ok_or(DomainError::NotFound)?;

        let product = &self.products[idx];
        let new_stock = product
            .stock
            .checked_add(cmd.direction.delta(cmd.quantity))
            .ok_or_else(|| DomainError::invariant("stock overflow"))?;
        if new_stock < 0 {
            return Err(DomainError::insufficient_stock(cmd.quantity, product.stock));
        }

        let movement = StockMovement {
            id: MovementId::new(),
            product_id: cmd.product_id,
            product_name: product.name.clone(),
            direction: cmd.direction,
            quantity: cmd.quantity,
            date: cmd.occurred_at,
            user: cmd.actor.unwrap_or_else(|| UNKNOWN_ACTOR.to_string()),
            reason: cmd.reason,
        };

        let product = &mut self.products[idx];
        product.stock = new_stock;
        product.last_updated = cmd.occurred_at;
        self.recompute_alerts(cmd.occurred_at);

        self.movements.insert(0, movement);
        Ok(&self.movements[0])
    }

    /// Mark one alert as read. Returns `false` when no such alert exists.
    pub fn acknowledge_alert(&mut self, id: &AlertId) -> bool {
        match self.alerts.iter_mut().find(|a| &a.id == id) {
            Some(alert) => {
                alert.acknowledge();
                true
            }
            None => false,
        }
    }

    /// Mark every alert as read. Returns how many were unread before.
    pub fn acknowledge_all(&mut self) -> usize {
        let mut flipped = 0;
        for alert in self.alerts.iter_mut().filter(|a| !a.read) {
            alert.acknowledge();
            flipped += 1;
        }
        flipped
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.products.iter().position(|p| &p.id == id)
    }

    fn recompute_alerts(&mut self, now: DateTime<Utc>) {
        self.alerts = recompute_alerts(&self.products, &self.alerts, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::MovementDirection;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn new_product(stock: i64, min_stock: i64) -> NewProduct {
        NewProduct {
            name: "Mouse Logitech MX Master 3".to_string(),
            sku: "ACC-002".to_string(),
            category: "Accessories".to_string(),
            stock,
            min_stock,
            price: 99.99,
            description: "Wireless ergonomic mouse".to_string(),
        }
    }

    fn store_with(stock: i64, min_stock: i64) -> (InventoryStore, ProductId) {
        let mut store = InventoryStore::new();
        let id = store.add_product(new_product(stock, min_stock), test_time()).unwrap().id;
        (store, id)
    }

    fn movement(id: ProductId, quantity: i64, direction: MovementDirection) -> RecordMovement {
        RecordMovement::new(id, quantity, direction, "test", test_time())
    }

    #[test]
    fn add_product_assigns_identity_and_timestamp() {
        let mut store = InventoryStore::new();
        let now = test_time();
        let p = store.add_product(new_product(8, 5), now).unwrap().clone();

        assert_eq!(p.last_updated, now);
        assert_eq!(store.products().len(), 1);
        assert_eq!(store.product(&p.id), Some(&p));
    }

    #[test]
    fn add_product_allows_duplicate_skus() {
        let mut store = InventoryStore::new();
        store.add_product(new_product(8, 5), test_time()).unwrap();
        store.add_product(new_product(8, 5), test_time()).unwrap();
        assert_eq!(store.products().len(), 2);
        assert_ne!(store.products()[0].id, store.products()[1].id);
    }

    #[test]
    fn add_product_rejects_negative_stock() {
        let mut store = InventoryStore::new();
        let err = store.add_product(new_product(-1, 5), test_time()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert!(store.products().is_empty());
    }

    #[test]
    fn update_unknown_product_is_a_silent_noop() {
        let (mut store, _) = store_with(8, 5);
        let before = store.clone();
        let result = store
            .update_product(&ProductId::new(), ProductPatch::stock(1), test_time())
            .unwrap();
        assert!(result.is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn update_refreshes_timestamp_and_rederives_alerts() {
        let (mut store, id) = store_with(8, 5);
        assert_eq!(store.unread_count(), 0);

        let later = test_time() + chrono::Duration::minutes(1);
        let p = store
            .update_product(&id, ProductPatch::stock(2), later)
            .unwrap()
            .unwrap();
        assert_eq!(p.stock, 2);
        assert_eq!(p.last_updated, later);
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn update_rejecting_negative_stock_changes_nothing() {
        let (mut store, id) = store_with(8, 5);
        let before = store.clone();
        let err = store
            .update_product(&id, ProductPatch::stock(-4), test_time())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(store, before);
    }

    #[test]
    fn outbound_beyond_stock_fails_and_changes_nothing() {
        let (mut store, id) = store_with(3, 1);
        let before = store.clone();

        let err = store
            .record_movement(movement(id, 4, MovementDirection::Out))
            .unwrap_err();

        assert_eq!(err, DomainError::insufficient_stock(4, 3));
        assert_eq!(store, before);
        assert!(store.movements().is_empty());
    }

    #[test]
    fn outbound_to_exactly_zero_is_allowed() {
        let (mut store, id) = store_with(3, 1);
        store
            .record_movement(movement(id, 3, MovementDirection::Out))
            .unwrap();
        assert_eq!(store.product(&id).unwrap().stock, 0);
    }

    #[test]
    fn movement_on_unknown_product_is_not_found() {
        let mut store = InventoryStore::new();
        let err = store
            .record_movement(movement(ProductId::new(), 1, MovementDirection::In))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn movements_are_prepended_newest_first() {
        let (mut store, id) = store_with(10, 1);
        let first = store
            .record_movement(movement(id, 2, MovementDirection::In))
            .unwrap()
            .id;
        let second = store
            .record_movement(movement(id, 1, MovementDirection::Out))
            .unwrap()
            .id;

        let ids: Vec<_> = store.movements().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn movement_records_denormalized_name_and_actor() {
        let (mut store, id) = store_with(10, 1);
        let m = store
            .record_movement(movement(id, 2, MovementDirection::In).by("Juan Pérez"))
            .unwrap();
        assert_eq!(m.product_name, "Mouse Logitech MX Master 3");
        assert_eq!(m.user, "Juan Pérez");

        let m = store
            .record_movement(movement(id, 2, MovementDirection::In))
            .unwrap();
        assert_eq!(m.user, UNKNOWN_ACTOR);
    }

    #[test]
    fn low_stock_example_keeps_stale_alert_after_restock() {
        let (mut store, id) = store_with(3, 10);
        let alert = store.unread_alerts().next().unwrap().clone();
        assert_eq!(alert.current_stock, 3);

        store
            .record_movement(movement(id, 20, MovementDirection::In))
            .unwrap();

        assert_eq!(store.product(&id).unwrap().stock, 23);
        assert_eq!(store.alerts(), std::slice::from_ref(&alert));
    }

    #[test]
    fn acknowledged_alert_is_not_duplicated_until_products_change() {
        let (mut store, id) = store_with(3, 10);
        let alert_id = store.alerts()[0].id;

        assert!(store.acknowledge_alert(&alert_id));
        assert_eq!(store.unread_count(), 0);
        assert_eq!(store.alerts().len(), 1);

        store
            .record_movement(movement(id, 1, MovementDirection::Out))
            .unwrap();
        assert_eq!(store.unread_count(), 1);
        assert_eq!(store.alerts().len(), 2);
    }

    #[test]
    fn acknowledge_unknown_alert_returns_false() {
        let (mut store, _) = store_with(3, 10);
        assert!(!store.acknowledge_alert(&AlertId::new()));
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn acknowledge_all_keeps_history_and_zeroes_unread() {
        let mut store = InventoryStore::new();
        store.add_product(new_product(3, 10), test_time()).unwrap();
        store.add_product(new_product(0, 8), test_time()).unwrap();
        store.add_product(new_product(20, 8), test_time()).unwrap();
        let total = store.alerts().len();

        assert_eq!(store.acknowledge_all(), 2);
        assert_eq!(store.alerts().len(), total);
        assert_eq!(store.unread_count(), 0);
        assert_eq!(store.acknowledge_all(), 0);
    }

    #[test]
    fn delete_leaves_movements_and_alerts_orphaned() {
        let (mut store, id) = store_with(3, 10);
        store
            .record_movement(movement(id, 1, MovementDirection::Out))
            .unwrap();

        let removed = store.delete_product(&id, test_time()).unwrap();
        assert_eq!(removed.id, id);
        assert!(store.product(&id).is_none());
        assert_eq!(store.movements_for(&id).count(), 1);
        assert_eq!(store.unread_alerts().filter(|a| a.product_id == id).count(), 1);
    }

    #[test]
    fn delete_unknown_product_is_a_noop() {
        let (mut store, _) = store_with(3, 10);
        let before = store.clone();
        assert!(store.delete_product(&ProductId::new(), test_time()).is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() {
        let mut store = InventoryStore::new();
        for category in ["Electronics", "Accessories", "Electronics", "Audio"] {
            let mut p = new_product(5, 1);
            p.category = category.to_string();
            store.add_product(p, test_time()).unwrap();
        }
        assert_eq!(store.categories(), vec!["Electronics", "Accessories", "Audio"]);
    }

    #[test]
    fn snapshot_round_trip_rederives_alerts() {
        let (store, id) = store_with(8, 5);
        let mut snapshot = store.snapshot();
        snapshot.products[0].stock = 1;

        let restored = InventoryStore::from_snapshot(snapshot, test_time());
        assert_eq!(restored.unread_count(), 1);
        assert_eq!(restored.unread_alerts().next().unwrap().product_id, id);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn direction() -> impl Strategy<Value = MovementDirection> {
            prop_oneof![Just(MovementDirection::In), Just(MovementDirection::Out)]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: stock = initial + Σ accepted inbound − Σ accepted outbound.
            #[test]
            fn stock_is_conserved_across_movements(
                initial in 0i64..50,
                min_stock in 0i64..20,
                ops in prop::collection::vec((1i64..30, direction()), 0..40)
            ) {
                let (mut store, id) = store_with(initial, min_stock);
                let mut expected = initial;

                for (quantity, dir) in ops {
                    let before = store.clone();
                    match store.record_movement(movement(id, quantity, dir)) {
                        Ok(_) => expected += dir.delta(quantity),
                        Err(DomainError::InsufficientStock { .. }) => {
                            prop_assert_eq!(&store, &before);
                        }
                        Err(e) => prop_assert!(false, "unexpected error: {e:?}"),
                    }
                    prop_assert!(store.product(&id).unwrap().stock >= 0);
                }

                prop_assert_eq!(store.product(&id).unwrap().stock, expected);

                let replayed: i64 = store
                    .movements_for(&id)
                    .map(|m| m.direction.delta(m.quantity))
                    .sum();
                prop_assert_eq!(initial + replayed, expected);
            }

            /// Property: after any applied change a low product has exactly one
            /// unread alert, and no product ever has more than one.
            #[test]
            fn low_products_have_exactly_one_unread_alert(
                initial in 0i64..30,
                min_stock in 0i64..20,
                ops in prop::collection::vec((1i64..15, direction(), any::<bool>()), 0..30)
            ) {
                let (mut store, id) = store_with(initial, min_stock);

                for (quantity, dir, ack) in ops {
                    if ack {
                        store.acknowledge_all();
                    }
                    let applied = store.record_movement(movement(id, quantity, dir)).is_ok();

                    let unread = store.unread_alerts().filter(|a| a.product_id == id).count();
                    prop_assert!(unread <= 1);
                    if applied && store.product(&id).unwrap().is_low() {
                        prop_assert_eq!(unread, 1);
                    }
                }
            }
        }
    }
}
