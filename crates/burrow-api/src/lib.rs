//! HTTP surface of the proxy
//!
//! One axum router serves both faces: the management API under the
//! reserved `/api` namespace, and the gateway fallback that proxies
//! everything else through the matched tunnel.

pub mod gateway;
pub mod handlers;
pub mod models;

use axum::{
    http::{header, Method},
    routing::{get, put},
    Json, Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;

use burrow_proxy::Forwarder;
use burrow_store::{CachedTunnels, TunnelStore};

/// Application state shared across handlers
pub struct AppState {
    /// Source of truth for tunnel records (CRUD surface)
    pub store: Arc<dyn TunnelStore>,
    /// Bounded-staleness snapshot used on the routing hot path
    pub tunnels: CachedTunnels,
    /// Shared upstream client
    pub forwarder: Forwarder,
}

impl AppState {
    pub fn new(store: Arc<dyn TunnelStore>, forwarder: Forwarder, snapshot_ttl: Duration) -> Self {
        Self {
            tunnels: CachedTunnels::new(store.clone(), snapshot_ttl),
            store,
            forwarder,
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Burrow API",
        version = "0.1.0",
        description = "REST API for managing reverse proxy tunnels"
    ),
    paths(
        handlers::health_check,
        handlers::list_tunnels,
        handlers::create_tunnel,
        handlers::update_tunnel,
        handlers::delete_tunnel,
    ),
    components(
        schemas(
            burrow_proto::Tunnel,
            burrow_proto::TunnelKind,
            burrow_proto::TunnelDraft,
            models::ErrorResponse,
            models::HealthResponse,
        )
    ),
    tags(
        (name = "tunnels", description = "Tunnel management endpoints"),
        (name = "system", description = "System health and info endpoints")
    )
)]
struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full router: management API plus gateway fallback
pub fn build_router(state: Arc<AppState>) -> Router {
    // The dashboard is a separate origin; plain permissive CORS, no
    // credentials involved
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);

    let api = Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/openapi.json", get(openapi_json))
        .route(
            "/api/tunnels",
            get(handlers::list_tunnels).post(handlers::create_tunnel),
        )
        .route(
            "/api/tunnels/{id}",
            put(handlers::update_tunnel).delete(handlers::delete_tunnel),
        )
        .layer(cors);

    api.fallback(gateway::gateway)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(bind_addr: SocketAddr, state: Arc<AppState>) -> Result<(), anyhow::Error> {
    let router = build_router(state);

    info!("listening on {}", bind_addr);
    info!("management API at http://{}/api/tunnels", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("server error: {}", e))?;

    Ok(())
}
