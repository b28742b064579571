use std::sync::Arc;

use axum::{Extension, Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use stockarium_auth::{Permission, Registration};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> Result<axum::response::Response, ApiError> {
    let (token, user) = services.login(&body.username, &body.password, Utc::now()).await?;
    Ok((StatusCode::OK, Json(dto::LoginResponse { token, user })).into_response())
}

/// Public sign-up; the account is always an employee.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<Registration>,
) -> Result<axum::response::Response, ApiError> {
    let user = services.register(body).await?;
    Ok((StatusCode::CREATED, Json(dto::UserResponse { user })).into_response())
}

/// Administrator-created account with an explicit role.
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<Registration>,
) -> Result<axum::response::Response, ApiError> {
    require(&principal, &Permission::USERS_WRITE)?;
    let user = services.create_user(body).await?;
    Ok((StatusCode::CREATED, Json(dto::UserResponse { user })).into_response())
}
