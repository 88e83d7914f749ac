use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use hostel_core::error::CoreError;
use hostel_core::feature_toggle::FeatureGate;
use hostel_db::repositories::FeatureToggleRepo;
use hostel_db::DbPool;
use tokio::sync::RwLock;

use super::store_error;

struct Snapshot {
    loaded_at: Instant,
    toggles: HashMap<String, bool>,
}

/// Feature gate backed by the `feature_toggles` table.
///
/// The whole table is cached and reloaded once the snapshot is older than
/// `ttl`. Admin writes call [`invalidate`](Self::invalidate) so the change is
/// visible on the next check.
pub struct CachedFeatureGate {
    pool: DbPool,
    ttl: Duration,
    cache: RwLock<Option<Snapshot>>,
}

impl CachedFeatureGate {
    pub fn new(pool: DbPool, ttl: Duration) -> Self {
        Self {
            pool,
            ttl,
            cache: RwLock::new(None),
        }
    }

    /// Drop the cached snapshot.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
        tracing::debug!("Feature toggle cache invalidated");
    }

    /// Value of `key` from a snapshot that is still within the TTL.
    fn fresh_lookup(&self, snapshot: Option<&Snapshot>, key: &str) -> Option<bool> {
        snapshot
            .filter(|s| s.loaded_at.elapsed() < self.ttl)
            .map(|s| s.toggles.get(key).copied().unwrap_or(true))
    }

    async fn reload(&self) -> Result<HashMap<String, bool>, CoreError> {
        let rows = FeatureToggleRepo::list(&self.pool)
            .await
            .map_err(|e| store_error("feature toggle load", e))?;
        let toggles: HashMap<String, bool> =
            rows.into_iter().map(|t| (t.key, t.enabled)).collect();
        tracing::debug!(count = toggles.len(), "Feature toggles loaded");
        Ok(toggles)
    }
}

#[async_trait]
impl FeatureGate for CachedFeatureGate {
    async fn is_enabled(&self, key: &str) -> Result<bool, CoreError> {
        {
            let cache = self.cache.read().await;
            if let Some(enabled) = self.fresh_lookup(cache.as_ref(), key) {
                return Ok(enabled);
            }
        }

        // Reload under the write lock so an `invalidate` issued meanwhile
        // waits for the store and then clears it.
        let mut cache = self.cache.write().await;
        if let Some(enabled) = self.fresh_lookup(cache.as_ref(), key) {
            return Ok(enabled);
        }
        let toggles = self.reload().await?;
        let enabled = toggles.get(key).copied().unwrap_or(true);
        *cache = Some(Snapshot {
            loaded_at: Instant::now(),
            toggles,
        });
        Ok(enabled)
    }
}
