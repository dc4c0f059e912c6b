//! Tunnel Data Model
//!
//! This crate defines the tunnel record shared by the store, the route
//! matcher and the management API. The serde layout doubles as the
//! persisted file format, so field names stay camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Matching strategy for a tunnel route
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TunnelKind {
    /// Exact host match (e.g. `app.example.com`)
    Subdomain,
    /// URL path prefix match (e.g. `/report`)
    Path,
}

impl std::fmt::Display for TunnelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TunnelKind::Subdomain => write!(f, "subdomain"),
            TunnelKind::Path => write!(f, "path"),
        }
    }
}

/// A registered tunnel: one route mapped to one upstream target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Tunnel {
    /// Unique identifier, assigned at creation
    pub id: String,
    /// Matching strategy
    #[serde(rename = "type")]
    pub kind: TunnelKind,
    /// Exact host for `subdomain` tunnels, `/`-prefixed path prefix for `path` tunnels
    pub route: String,
    /// Absolute upstream URL (scheme + host required)
    pub target: String,
    /// Optional friendly label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Creation timestamp, never mutated
    pub created_at: DateTime<Utc>,
}

/// Fields an operator supplies when creating or updating a tunnel
///
/// `id` and `created_at` are owned by the store and never accepted from
/// the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TunnelDraft {
    #[serde(rename = "type")]
    pub kind: TunnelKind,
    pub route: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
}

/// Sort tunnels into routing priority order.
///
/// Subdomain tunnels come before path tunnels; within each group routes
/// sort ascending. Listing order doubles as first-match precedence, so
/// this must stay deterministic.
pub fn sort_tunnels(tunnels: &mut [Tunnel]) {
    tunnels.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.route.cmp(&b.route)));
}
