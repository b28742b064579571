use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockarium_core::{DomainError, DomainResult, Entity, ProductId};

/// A catalogue product and its current stock level.
///
/// `stock` and `min_stock` are never negative once a product lives in an
/// [`InventoryStore`](crate::InventoryStore); the store rejects any mutation
/// that would break this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub stock: i64,
    pub min_stock: i64,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    pub last_updated: DateTime<Utc>,
}

impl Product {
    /// Whether the product is at or below its alert threshold.
    pub fn is_low(&self) -> bool {
        self.stock <= self.min_stock
    }

    pub fn status(&self) -> StockStatus {
        StockStatus::of(self.stock, self.min_stock)
    }

    /// Value of the units on hand (`stock × price`).
    pub fn stock_value(&self) -> f64 {
        self.stock as f64 * self.price
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Fields supplied when creating a product. Identity and timestamp are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub min_stock: i64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub description: String,
}

impl NewProduct {
    pub(crate) fn validate(&self) -> DomainResult<()> {
        ensure_non_negative(self.stock, self.min_stock)
    }

    pub(crate) fn into_product(self, id: ProductId, now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            sku: self.sku,
            category: self.category,
            stock: self.stock,
            min_stock: self.min_stock,
            price: self.price,
            description: self.description,
            last_updated: now,
        }
    }
}

/// Partial update merged into an existing product. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

impl ProductPatch {
    pub fn stock(stock: i64) -> Self {
        Self {
            stock: Some(stock),
            ..Self::default()
        }
    }

    /// Merge into `product`, refreshing its timestamp.
    ///
    /// Validation happens before any field is written, so a rejected patch
    /// leaves `product` untouched.
    pub(crate) fn apply_to(self, product: &mut Product, now: DateTime<Utc>) -> DomainResult<()> {
        ensure_non_negative(
            self.stock.unwrap_or(product.stock),
            self.min_stock.unwrap_or(product.min_stock),
        )?;

        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(sku) = self.sku {
            product.sku = sku;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(min_stock) = self.min_stock {
            product.min_stock = min_stock;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        product.last_updated = now;
        Ok(())
    }
}

fn ensure_non_negative(stock: i64, min_stock: i64) -> DomainResult<()> {
    if stock < 0 {
        return Err(DomainError::invariant("stock cannot be negative"));
    }
    if min_stock < 0 {
        return Err(DomainError::invariant("minimum stock cannot be negative"));
    }
    Ok(())
}

/// Coarse stock classification used by listings and dashboards.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    Low,
    Ok,
}

impl StockStatus {
    pub fn of(stock: i64, min_stock: i64) -> Self {
        if stock == 0 {
            StockStatus::OutOfStock
        } else if stock <= min_stock {
            StockStatus::Low
        } else {
            StockStatus::Ok
        }
    }
}

/// Case-insensitive search over name/SKU, optionally within one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub search: String,
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: term.into(),
            category: None,
        }
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        let term = self.search.to_lowercase();
        let matches_search = product.name.to_lowercase().contains(&term)
            || product.sku.to_lowercase().contains(&term);
        let matches_category = self
            .category
            .as_deref()
            .is_none_or(|c| product.category == c);
        matches_search && matches_category
    }
}
