//! Time-bounded snapshot of the tunnel list for the routing hot path
//!
//! Routing consults the tunnel set on every proxied request; going to the
//! store each time is a round-trip we do not need. The cache holds the
//! last ordered listing for a bounded interval. Staleness is capped at
//! the TTL, and CRUD handlers call [`CachedTunnels::invalidate`] after a
//! successful write so changes apply on the next request.

use crate::TunnelStore;
use burrow_proto::Tunnel;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

struct Snapshot {
    taken_at: Option<Instant>,
    tunnels: Arc<Vec<Tunnel>>,
}

pub struct CachedTunnels {
    store: Arc<dyn TunnelStore>,
    ttl: Duration,
    inner: RwLock<Snapshot>,
}

impl CachedTunnels {
    pub fn new(store: Arc<dyn TunnelStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            inner: RwLock::new(Snapshot {
                taken_at: None,
                tunnels: Arc::new(Vec::new()),
            }),
        }
    }

    /// Current tunnel list in routing priority order.
    ///
    /// Refreshes from the store when the snapshot is older than the TTL.
    /// A failing store degrades to an empty snapshot (routing sees "no
    /// tunnels") instead of failing the request; the degraded snapshot is
    /// cached for the TTL like any other so a broken store is not hammered.
    pub async fn snapshot(&self) -> Arc<Vec<Tunnel>> {
        {
            let snapshot = self.inner.read().await;
            if Self::fresh(snapshot.taken_at, self.ttl) {
                return snapshot.tunnels.clone();
            }
        }

        let mut snapshot = self.inner.write().await;
        // Another task may have refreshed while we waited for the lock
        if Self::fresh(snapshot.taken_at, self.ttl) {
            return snapshot.tunnels.clone();
        }

        let tunnels = match self.store.list().await {
            Ok(tunnels) => tunnels,
            Err(e) => {
                warn!(error = %e, "tunnel store read failed, routing with empty tunnel set");
                Vec::new()
            }
        };

        snapshot.taken_at = Some(Instant::now());
        snapshot.tunnels = Arc::new(tunnels);
        snapshot.tunnels.clone()
    }

    /// Drop the snapshot so the next routing read hits the store
    pub async fn invalidate(&self) {
        self.inner.write().await.taken_at = None;
    }

    fn fresh(taken_at: Option<Instant>, ttl: Duration) -> bool {
        taken_at.is_some_and(|t| t.elapsed() < ttl)
    }
}
