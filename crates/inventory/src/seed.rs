//! Demo catalogue used to populate an empty local workspace.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use stockarium_core::{MovementId, ProductId};

use crate::movement::{MovementDirection, StockMovement};
use crate::product::Product;
use crate::store::InventorySnapshot;

/// Stable id of the `n`th demo product (1-based).
pub fn demo_product_id(n: u128) -> ProductId {
    ProductId::from_uuid(Uuid::from_u128(n))
}

/// Eight products and three historical movements, alerts left for derivation.
pub fn demo_snapshot(now: DateTime<Utc>) -> InventorySnapshot {
    let catalogue: [(&str, &str, &str, i64, i64, f64, &str); 8] = [
        ("Laptop Dell XPS 15", "LAP-001", "Electronics", 8, 5, 1299.99, "High-performance laptop for professionals"),
        ("Mouse Logitech MX Master 3", "ACC-002", "Accessories", 3, 10, 99.99, "Ergonomic wireless mouse"),
        ("Keychron K2 Mechanical Keyboard", "ACC-003", "Accessories", 15, 8, 89.99, "Wireless mechanical keyboard"),
        ("LG 27\" 4K Monitor", "MON-004", "Monitors", 2, 5, 449.99, "4K UHD monitor with HDR"),
        ("Sony WH-1000XM4 Headphones", "AUD-005", "Audio", 12, 6, 349.99, "Noise-cancelling headphones"),
        ("Logitech C920 Webcam", "ACC-006", "Accessories", 0, 8, 79.99, "Full HD 1080p webcam"),
        ("Herman Miller Ergonomic Chair", "MOB-007", "Furniture", 5, 3, 1299.99, "Premium ergonomic office chair"),
        ("iPad Air Tablet", "TAB-008", "Electronics", 6, 5, 599.99, "Tablet with Liquid Retina display"),
    ];

    let products = catalogue
        .iter()
        .zip(1u128..)
        .map(|(&(name, sku, category, stock, min_stock, price, description), n)| Product {
            id: demo_product_id(n),
            name: name.to_string(),
            sku: sku.to_string(),
            category: category.to_string(),
            stock,
            min_stock,
            price,
            description: description.to_string(),
            last_updated: now,
        })
        .collect();

    let history: [(u128, u128, &str, MovementDirection, i64, Duration, &str, &str); 3] = [
        (3, 4, "LG 27\" 4K Monitor", MovementDirection::Out, 3, Duration::hours(12), "Juan Pérez", "Retail sale"),
        (2, 2, "Mouse Logitech MX Master 3", MovementDirection::Out, 5, Duration::days(1), "Juan Pérez", "Corporate customer order"),
        (1, 1, "Laptop Dell XPS 15", MovementDirection::In, 10, Duration::days(2), "Administrador", "Monthly restock"),
    ];

    let movements = history
        .iter()
        .map(|&(mid, pid, name, direction, quantity, age, user, reason)| StockMovement {
            id: MovementId::from_uuid(Uuid::from_u128(mid)),
            product_id: demo_product_id(pid),
            product_name: name.to_string(),
            direction,
            quantity,
            date: now - age,
            user: user.to_string(),
            reason: reason.to_string(),
        })
        .collect();

    InventorySnapshot {
        products,
        movements,
        alerts: Vec::new(),
    }
}
