use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockarium_auth::User;
use stockarium_core::ProductId;
use stockarium_inventory::{Product, ProductFilter, StockMovement};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `?search=&category=`; an empty or `all` category means no category filter.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl ProductQuery {
    pub fn into_filter(self) -> ProductFilter {
        let filter = ProductFilter::search(self.search.unwrap_or_default());
        match self.category {
            Some(c) if !c.is_empty() && c != "all" => filter.in_category(c),
            _ => filter,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockRequest {
    pub product_id: ProductId,
    /// Positive for inbound, negative for outbound.
    pub change: i64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementQuery {
    pub product_id: Option<ProductId>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub product_id: ProductId,
    pub quantity: i64,
    pub last_updated: DateTime<Utc>,
}

impl From<&Product> for StockLevel {
    fn from(p: &Product) -> Self {
        Self {
            product_id: p.id,
            quantity: p.stock,
            last_updated: p.last_updated,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdjustStockResponse {
    pub movement: StockMovement,
    pub stock: StockLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_category_means_no_filter() {
        let q = ProductQuery {
            search: Some("lap".to_string()),
            category: Some("all".to_string()),
        };
        assert_eq!(q.into_filter(), ProductFilter::search("lap"));

        let q = ProductQuery {
            search: None,
            category: Some("Audio".to_string()),
        };
        assert_eq!(q.into_filter(), ProductFilter::search("").in_category("Audio"));
    }

    #[test]
    fn adjust_request_uses_camel_case() {
        let req: AdjustStockRequest = serde_json::from_value(serde_json::json!({
            "productId": "00000000-0000-0000-0000-000000000001",
            "change": -3,
        }))
        .unwrap();
        assert_eq!(req.change, -3);
        assert!(req.reason.is_empty());
    }
}
