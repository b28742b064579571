use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};

use stockarium_auth::Permission;
use stockarium_inventory::DashboardSummary;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "userId": principal.user_id().to_string(),
        "username": principal.username(),
        "name": principal.name(),
        "role": principal.role().as_str(),
        "permissions": principal
            .role()
            .permissions()
            .iter()
            .map(|p| p.as_str().to_string())
            .collect::<Vec<_>>(),
    }))
}

pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<axum::response::Response, ApiError> {
    require(&principal, &Permission::PRODUCTS_READ)?;

    let summary = services.read(DashboardSummary::from_store).await;
    Ok((StatusCode::OK, Json(summary)).into_response())
}
