//! JSON-file-backed tunnel store
//!
//! The persisted layout is a single JSON array of tunnel records. A
//! missing file reads as an empty store and is created on first write.
//! Writes go through a per-store mutex and land with a
//! write-temp-then-rename so a concurrent reader never observes a torn
//! file and concurrent writers never lose an update.

use crate::validate::{check_conflict, normalize_draft};
use crate::{StoreError, TunnelStore};
use async_trait::async_trait;
use burrow_proto::{sort_tunnels, Tunnel, TunnelDraft};
use chrono::Utc;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<Tunnel>, StoreError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "tunnels file missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StoreError::Unavailable(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_slice(&data).map_err(|e| {
            StoreError::Unavailable(format!("failed to parse {}: {}", self.path.display(), e))
        })
    }

    /// Replace the file contents atomically: write a sibling temp file,
    /// then rename it over the target.
    async fn persist(&self, tunnels: &[Tunnel]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    StoreError::Unavailable(format!(
                        "failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let data = serde_json::to_vec_pretty(tunnels)
            .map_err(|e| StoreError::Unavailable(format!("failed to encode tunnels: {}", e)))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &data).await.map_err(|e| {
            StoreError::Unavailable(format!("failed to write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            StoreError::Unavailable(format!(
                "failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }
}

#[async_trait]
impl TunnelStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<Tunnel>, StoreError> {
        let mut tunnels = self.load().await?;
        sort_tunnels(&mut tunnels);
        Ok(tunnels)
    }

    async fn create(&self, draft: TunnelDraft) -> Result<Tunnel, StoreError> {
        let draft = normalize_draft(draft)?;

        let _guard = self.write_lock.lock().await;
        let mut tunnels = self.load().await?;
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
        self.persist(&tunnels).await?;

        info!(id = %tunnel.id, kind = %tunnel.kind, route = %tunnel.route, "tunnel created");
        Ok(tunnel)
    }

    async fn update(&self, id: &str, draft: TunnelDraft) -> Result<Tunnel, StoreError> {
        let draft = normalize_draft(draft)?;

        let _guard = self.write_lock.lock().await;
        let mut tunnels = self.load().await?;

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
        self.persist(&tunnels).await?;

        info!(id = %tunnel.id, kind = %tunnel.kind, route = %tunnel.route, "tunnel updated");
        Ok(tunnel)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut tunnels = self.load().await?;

        let before = tunnels.len();
        tunnels.retain(|t| t.id != id);
        if tunnels.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }

        self.persist(&tunnels).await?;

        info!(id = %id, "tunnel deleted");
        Ok(())
    }
}
