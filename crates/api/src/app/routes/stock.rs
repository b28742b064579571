use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use stockarium_auth::Permission;
use stockarium_core::DomainError;
use stockarium_inventory::{MovementDirection, RecordMovement};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::routes::parse_product_id;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/adjust", post(adjust_stock))
        .route("/:id", get(get_stock))
}

pub async fn get_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, ApiError> {
    require(&principal, &Permission::STOCK_READ)?;
    let id = parse_product_id(&id)?;

    match services.read(|inv| inv.product(&id).map(dto::StockLevel::from)).await {
        Some(level) => Ok((StatusCode::OK, Json(level)).into_response()),
        None => Err(ApiError::NotFound("product")),
    }
}

/// Signed adjustment: a positive change is recorded as an inbound movement,
/// a negative one as outbound.
pub async fn adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::AdjustStockRequest>,
) -> Result<axum::response::Response, ApiError> {
    require(&principal, &Permission::STOCK_ADJUST)?;

    let (direction, quantity) = MovementDirection::from_change(body.change)
        .ok_or_else(|| DomainError::validation("change must be non-zero"))?;
    let cmd = RecordMovement::new(body.product_id, quantity, direction, body.reason, Utc::now())
        .by(principal.name());

    let result = services
        .mutate(|inv| {
            let movement = inv.record_movement(cmd)?.clone();
            let stock = inv
                .product(&movement.product_id)
                .map(dto::StockLevel::from)
                .ok_or(DomainError::NotFound)?;
            Ok(dto::AdjustStockResponse { movement, stock })
        })
        .await;

    match result {
        Ok(body) => {
            tracing::info!(
                product_id = %body.stock.product_id,
                direction = %body.movement.direction,
                quantity = body.movement.quantity,
                stock = body.stock.quantity,
                "stock adjusted"
            );
            Ok((StatusCode::OK, Json(body)).into_response())
        }
        Err(e @ ApiError::Domain(DomainError::InsufficientStock { requested, available })) => {
            tracing::warn!(
                product_id = %body.product_id,
                requested,
                available,
                "adjustment refused: insufficient stock"
            );
            Err(e)
        }
        Err(ApiError::Domain(DomainError::NotFound)) => Err(ApiError::NotFound("product")),
        Err(e) => Err(e),
    }
}

/// Movement log, newest first; `?productId=` narrows it to one product.
pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::MovementQuery>,
) -> Result<axum::response::Response, ApiError> {
    require(&principal, &Permission::STOCK_READ)?;

    let movements = services
        .read(|inv| match &query.product_id {
            Some(id) => inv.movements_for(id).cloned().collect::<Vec<_>>(),
            None => inv.movements().to_vec(),
        })
        .await;
    Ok((StatusCode::OK, Json(movements)).into_response())
}
