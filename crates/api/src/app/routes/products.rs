use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use stockarium_auth::Permission;
use stockarium_core::DomainError;
use stockarium_inventory::{NewProduct, ProductPatch};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::routes::parse_product_id;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).put(update_product).delete(delete_product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ProductQuery>,
) -> Result<axum::response::Response, ApiError> {
    require(&principal, &Permission::PRODUCTS_READ)?;

    let filter = query.into_filter();
    let items = services
        .read(|inv| inv.search(&filter).into_iter().cloned().collect::<Vec<_>>())
        .await;
    Ok((StatusCode::OK, Json(items)).into_response())
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, ApiError> {
    require(&principal, &Permission::PRODUCTS_READ)?;
    let id = parse_product_id(&id)?;

    match services.read(|inv| inv.product(&id).cloned()).await {
        Some(product) => Ok((StatusCode::OK, Json(product)).into_response()),
        None => Err(ApiError::NotFound("product")),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<NewProduct>,
) -> Result<axum::response::Response, ApiError> {
    require(&principal, &Permission::PRODUCTS_WRITE)?;

    let product = services
        .mutate(|inv| inv.add_product(body, Utc::now()).cloned())
        .await?;
    tracing::info!(product_id = %product.id, sku = %product.sku, "product created");
    Ok((StatusCode::CREATED, Json(product)).into_response())
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<axum::response::Response, ApiError> {
    require(&principal, &Permission::PRODUCTS_WRITE)?;
    let id = parse_product_id(&id)?;

    // Unknown ids abort before anything is persisted.
    let product = services
        .mutate(|inv| {
            inv.update_product(&id, patch, Utc::now())?
                .cloned()
                .ok_or(DomainError::NotFound)
        })
        .await
        .map_err(not_found_as_product)?;
    Ok((StatusCode::OK, Json(product)).into_response())
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, ApiError> {
    require(&principal, &Permission::PRODUCTS_WRITE)?;
    let id = parse_product_id(&id)?;

    let removed = services
        .mutate(|inv| inv.delete_product(&id, Utc::now()).ok_or(DomainError::NotFound))
        .await
        .map_err(not_found_as_product)?;
    tracing::info!(product_id = %removed.id, sku = %removed.sku, "product deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

fn not_found_as_product(err: ApiError) -> ApiError {
    match err {
        ApiError::Domain(DomainError::NotFound) => ApiError::NotFound("product"),
        other => other,
    }
}
