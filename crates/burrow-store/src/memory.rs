//! In-memory tunnel store
//!
//! Volatile backend with the same validation path as the file store.
//! Used by tests and available when durability is handled elsewhere.

use crate::validate::{check_conflict, normalize_draft};
use crate::{StoreError, TunnelStore};
use async_trait::async_trait;
use burrow_proto::{sort_tunnels, Tunnel, TunnelDraft};
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    tunnels: RwLock<Vec<Tunnel>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records, for tests
    pub fn with_tunnels(tunnels: Vec<Tunnel>) -> Self {
        Self {
            tunnels: RwLock::new(tunnels),
        }
    }
}

#[async_trait]
impl TunnelStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Tunnel>, StoreError> {
        let mut tunnels = self.tunnels.read().await.clone();
        sort_tunnels(&mut tunnels);
        Ok(tunnels)
    }

    async fn create(&self, draft: TunnelDraft) -> Result<Tunnel, StoreError> {
        let draft = normalize_draft(draft)?;

        let mut tunnels = self.tunnels.write().await;
        check_conflict(&tunnels, &draft, None)?;

        let tunnel = Tunnel {
            id: Uuid::new_v4().to_string(),
            kind: draft.kind,
            route: draft.route,
            target: draft.target,
            name: draft.name,
            created_at: Utc::now(),
        };

        tunnels.push(tunnel.clone());
        Ok(tunnel)
    }

    async fn update(&self, id: &str, draft: TunnelDraft) -> Result<Tunnel, StoreError> {
        let draft = normalize_draft(draft)?;

        let mut tunnels = self.tunnels.write().await;
        let index = tunnels
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        check_conflict(&tunnels, &draft, Some(id))?;

        let existing = &tunnels[index];
        let tunnel = Tunnel {
            id: existing.id.clone(),
            kind: draft.kind,
            route: draft.route,
            target: draft.target,
            name: draft.name,
            created_at: existing.created_at,
        };

        tunnels[index] = tunnel.clone();
        Ok(tunnel)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut tunnels = self.tunnels.write().await;

        let before = tunnels.len();
        tunnels.retain(|t| t.id != id);
        if tunnels.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
