//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared store, user directory and persistence
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router, routing::get};
use chrono::Utc;
use tower::ServiceBuilder;

use stockarium_auth::Hs256Jwt;
use stockarium_local::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore};

use crate::config::{ApiConfig, StorageConfig};
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let store: Arc<dyn KeyValueStore> = match &config.storage {
        StorageConfig::InMemory => Arc::new(InMemoryKeyValueStore::new()),
        StorageConfig::Directory(dir) => {
            let store = FileKeyValueStore::open_in(dir)?;
            tracing::info!(path = ?store.path(), "using file store");
            Arc::new(store)
        }
    };

    let jwt = Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes(), config.token_ttl));
    let services = services::AppServices::open(store, Arc::clone(&jwt), config.seed_demo, Utc::now())
        .context("failed to open inventory services")?;

    Ok(router(Arc::new(services), jwt))
}

/// Assemble routes around already-built services.
pub fn router(services: Arc<services::AppServices>, jwt: Arc<Hs256Jwt>) -> Router {
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require a valid bearer token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    let api = routes::public_router()
        .merge(protected)
        .layer(Extension(services));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", api)
        .layer(ServiceBuilder::new())
}
