//! Gateway entry point
//!
//! Installed as the axum fallback, so it sees every request the
//! management routes did not claim: load the routing snapshot, match,
//! then forward or answer 404.

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::AppState;
use burrow_proxy::{outbound_headers, relayed_response_headers, ForwardError};
use burrow_router::{resolve, RouteMatch};

pub async fn gateway(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    let tunnels = state.tunnels.snapshot().await;
    match resolve(&tunnels, &host, &path, query.as_deref()) {
        RouteMatch::Forward { tunnel, target } => {
            debug!(host = %host, path = %path, tunnel = %tunnel.id, target = %target,
                   "request matched tunnel");
            proxy(&state, req, target, &host).await
        }
        RouteMatch::NoMatch => {
            debug!(host = %host, path = %path, "no tunnel matched");
            if burrow_router::is_reserved_path(&path) {
                // Unknown management endpoint, not a missing tunnel
                (StatusCode::NOT_FOUND, "API endpoint not found").into_response()
            } else {
                not_found_response()
            }
        }
    }
}

/// Execute the upstream call and relay the response as a stream
async fn proxy(state: &AppState, req: Request, target: Url, original_host: &str) -> Response {
    // ConnectInfo is present when served over a real socket; tests that
    // drive the router directly may omit it
    let client_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip());
    // The scheme stamped upstream is the one this server terminated,
    // never a client-supplied claim. TLS termination happens elsewhere,
    // so the inbound scheme here is always plain HTTP.
    let headers = outbound_headers(req.headers(), original_host, client_ip, "http");
    let method = req.method().clone();
    let body = reqwest::Body::wrap_stream(req.into_body().into_data_stream());

    match state.forwarder.forward(method, target, headers, Some(body)).await {
        Ok(upstream) => {
            let status = upstream.status();
            let headers = relayed_response_headers(upstream.headers());

            let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
            *response.status_mut() = status;
            *response.headers_mut() = headers;
            response
        }
        Err(ForwardError::Timeout(e)) => {
            warn!(host = %original_host, error = %e, "upstream timed out");
            error_response(
                StatusCode::GATEWAY_TIMEOUT,
                "504 Gateway Timeout",
                "The upstream server did not respond in time.",
                &e,
            )
        }
        Err(ForwardError::Upstream(e)) => {
            warn!(host = %original_host, error = %e, "upstream request failed");
            error_response(
                StatusCode::BAD_GATEWAY,
                "502 Bad Gateway",
                "The proxy server received an invalid response from the upstream server.",
                &e,
            )
        }
    }
}

fn not_found_response() -> Response {
    let body = "<html><body style=\"font-family: sans-serif; padding: 20px; \
                background-color: #1a202c; color: #e2e8f0;\">\
                <h1>404 - Not Found</h1>\
                <p>The requested resource or tunnel configuration could not be found on this server.</p>\
                <p>Please check the URL or the tunnel configuration.</p>\
                </body></html>";
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}

fn error_response(status: StatusCode, title: &str, detail: &str, cause: &str) -> Response {
    let body = format!(
        "<html><body style=\"font-family: sans-serif; padding: 20px;\">\
         <h1>{title}</h1><p>{detail}</p><p>Error: {}</p></body></html>",
        escape_html(cause)
    );
    (
        status,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
