use axum::{
    Router,
    routing::{get, post},
};

use stockarium_core::ProductId;

use crate::app::errors::ApiError;

pub mod alerts;
pub mod auth;
pub mod products;
pub mod stock;
pub mod system;

/// Unauthenticated endpoints.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/dashboard", get(system::dashboard))
        .route("/movements", get(stock::list_movements))
        .route("/users", post(auth::create_user))
        .nest("/products", products::router())
        .nest("/stock", stock::router())
        .nest("/alerts", alerts::router())
}

pub(crate) fn parse_product_id(raw: &str) -> Result<ProductId, ApiError> {
    Ok(raw.parse::<ProductId>()?)
}
