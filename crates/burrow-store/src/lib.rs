//! Tunnel Store
//!
//! Durable mapping from tunnel id to tunnel record, with CRUD, validation
//! and uniqueness invariants. The store is the single owner of tunnel
//! state; writes are serialized so concurrent read-modify-write sequences
//! never lose an update.
//!
//! Two backends are provided: [`JsonFileStore`] (a single JSON array file,
//! durable across restarts) and [`MemoryStore`] (volatile, used by tests).
//! Routing reads go through [`CachedTunnels`], a time-bounded snapshot so
//! proxied requests avoid a store round-trip each time.

pub mod cache;
pub mod json_file;
pub mod memory;
mod validate;

pub use cache::CachedTunnels;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use burrow_proto::{Tunnel, TunnelDraft, TunnelKind};
use thiserror::Error;

/// Tunnel store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed route or target, rejected before persistence
    #[error("{0}")]
    Validation(String),

    /// Duplicate `(type, route)` pair
    #[error("a {kind} tunnel for route {route:?} already exists")]
    Conflict { kind: TunnelKind, route: String },

    /// Unknown tunnel id on update/delete
    #[error("tunnel {0} not found")]
    NotFound(String),

    /// Underlying persistence unreachable; callers on the request path
    /// should degrade to "no tunnels matched" rather than crash
    #[error("tunnel store unavailable: {0}")]
    Unavailable(String),
}

/// CRUD contract over a collection of tunnel records
///
/// Implementations must serialize writes with respect to each other:
/// two concurrent updates may be ordered either way, but the final state
/// is always exactly one of the two writes, never a mix.
#[async_trait]
pub trait TunnelStore: Send + Sync {
    /// All tunnels in routing priority order (subdomain before path,
    /// then ascending route). Never returns a partial list.
    async fn list(&self) -> Result<Vec<Tunnel>, StoreError>;

    /// Create a tunnel, assigning id and creation timestamp
    async fn create(&self, draft: TunnelDraft) -> Result<Tunnel, StoreError>;

    /// Replace every field of an existing tunnel except `id`/`created_at`
    async fn update(&self, id: &str, draft: TunnelDraft) -> Result<Tunnel, StoreError>;

    /// Remove a tunnel by id
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
