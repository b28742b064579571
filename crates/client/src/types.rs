use chrono::{DateTime, Utc};
use serde::Deserialize;

use stockarium_auth::User;
use stockarium_core::ProductId;
use stockarium_inventory::StockMovement;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub product_id: ProductId,
    pub quantity: i64,
    pub last_updated: DateTime<Utc>,
}

/// Result of a signed stock adjustment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockAdjustment {
    pub movement: StockMovement,
    pub stock: StockLevel,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AcknowledgedResponse {
    pub acknowledged: usize,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
}
