//! Management API handlers (tunnel CRUD)
//!
//! CRUD failures stay local to the call that made them: nothing here
//! touches in-flight proxied traffic beyond invalidating the routing
//! snapshot after a successful write.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::models::*;
use crate::AppState;
use burrow_proto::{Tunnel, TunnelDraft};
use burrow_store::StoreError;

fn store_error_response(e: StoreError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match &e {
        StoreError::Validation(_) => (StatusCode::BAD_REQUEST, "INVALID_TUNNEL"),
        StoreError::Conflict { .. } => (StatusCode::CONFLICT, "DUPLICATE_ROUTE"),
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "TUNNEL_NOT_FOUND"),
        StoreError::Unavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_UNAVAILABLE"),
    };
    (status, Json(ErrorResponse::new(e.to_string(), code)))
}

/// Health check
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// List all tunnels in routing priority order
#[utoipa::path(
    get,
    path = "/api/tunnels",
    responses(
        (status = 200, description = "Ordered list of tunnels", body = Vec<Tunnel>),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    ),
    tag = "tunnels"
)]
pub async fn list_tunnels(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Tunnel>>, (StatusCode, Json<ErrorResponse>)> {
    debug!("listing tunnels");

    let tunnels = state.store.list().await.map_err(store_error_response)?;
    Ok(Json(tunnels))
}

/// Create a tunnel
#[utoipa::path(
    post,
    path = "/api/tunnels",
    request_body = TunnelDraft,
    responses(
        (status = 201, description = "Tunnel created", body = Tunnel),
        (status = 400, description = "Malformed route or target", body = ErrorResponse),
        (status = 409, description = "Duplicate route", body = ErrorResponse)
    ),
    tag = "tunnels"
)]
pub async fn create_tunnel(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<TunnelDraft>,
) -> Result<(StatusCode, Json<Tunnel>), (StatusCode, Json<ErrorResponse>)> {
    let tunnel = state
        .store
        .create(draft)
        .await
        .map_err(store_error_response)?;

    state.tunnels.invalidate().await;
    Ok((StatusCode::CREATED, Json(tunnel)))
}

/// Update a tunnel, preserving its id and creation timestamp
#[utoipa::path(
    put,
    path = "/api/tunnels/{id}",
    params(
        ("id" = String, Path, description = "Tunnel ID")
    ),
    request_body = TunnelDraft,
    responses(
        (status = 200, description = "Tunnel updated", body = Tunnel),
        (status = 400, description = "Malformed route or target", body = ErrorResponse),
        (status = 404, description = "Unknown tunnel id", body = ErrorResponse),
        (status = 409, description = "Duplicate route", body = ErrorResponse)
    ),
    tag = "tunnels"
)]
pub async fn update_tunnel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(draft): Json<TunnelDraft>,
) -> Result<Json<Tunnel>, (StatusCode, Json<ErrorResponse>)> {
    let tunnel = state
        .store
        .update(&id, draft)
        .await
        .map_err(store_error_response)?;

    state.tunnels.invalidate().await;
    Ok(Json(tunnel))
}

/// Delete a tunnel
#[utoipa::path(
    delete,
    path = "/api/tunnels/{id}",
    params(
        ("id" = String, Path, description = "Tunnel ID")
    ),
    responses(
        (status = 204, description = "Tunnel deleted"),
        (status = 404, description = "Unknown tunnel id", body = ErrorResponse)
    ),
    tag = "tunnels"
)]
pub async fn delete_tunnel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .store
        .delete(&id)
        .await
        .map_err(store_error_response)?;

    state.tunnels.invalidate().await;
    Ok(StatusCode::NO_CONTENT)
}
