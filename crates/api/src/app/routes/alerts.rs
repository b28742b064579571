use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use stockarium_auth::Permission;
use stockarium_core::{AlertId, DomainError};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_alerts))
        .route("/ack-all", post(acknowledge_all))
        .route("/:id/ack", post(acknowledge_alert))
}

/// Unread alerts only.
pub async fn list_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<axum::response::Response, ApiError> {
    require(&principal, &Permission::ALERTS_READ)?;

    let alerts = services
        .read(|inv| inv.unread_alerts().cloned().collect::<Vec<_>>())
        .await;
    Ok((StatusCode::OK, Json(alerts)).into_response())
}

pub async fn acknowledge_alert(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, ApiError> {
    require(&principal, &Permission::ALERTS_ACKNOWLEDGE)?;
    let id: AlertId = id.parse()?;

    services
        .mutate(|inv| {
            if inv.acknowledge_alert(&id) {
                Ok(())
            } else {
                Err(DomainError::NotFound)
            }
        })
        .await
        .map_err(|e| match e {
            ApiError::Domain(DomainError::NotFound) => ApiError::NotFound("alert"),
            other => other,
        })?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn acknowledge_all(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<axum::response::Response, ApiError> {
    require(&principal, &Permission::ALERTS_ACKNOWLEDGE)?;

    let acknowledged = services.mutate(|inv| Ok(inv.acknowledge_all())).await?;
    tracing::info!(acknowledged, username = principal.username(), "alerts acknowledged");
    Ok((StatusCode::OK, Json(json!({ "acknowledged": acknowledged }))).into_response())
}
