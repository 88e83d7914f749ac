use std::sync::Arc;
use std::time::Duration;

use hostel_core::storage::BlobStore;
use hostel_events::EventBus;

use crate::config::ServerConfig;
use crate::engine::{CachedFeatureGate, ComplaintLifecycle, PgDuplicateDetector, StoreTimeout};
use crate::notifications::NotificationDispatcher;
use crate::storage::LocalBlobStore;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: hostel_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection registry with room memberships.
    pub ws_manager: Arc<WsManager>,
    /// In-process bus carrying realtime events to the relay.
    pub event_bus: Arc<EventBus>,
    /// Complaint lifecycle engine.
    pub lifecycle: Arc<ComplaintLifecycle>,
    /// Drains lifecycle outboxes into notification rows and realtime events.
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Cached feature toggle gate; invalidated by admin toggle writes.
    pub feature_gate: Arc<CachedFeatureGate>,
    /// Storage for uploaded images.
    pub blob_store: Arc<dyn BlobStore>,
}

impl AppState {
    /// Assemble the state graph shared by the binary and integration tests.
    pub fn new(
        pool: hostel_db::DbPool,
        config: ServerConfig,
        ws_manager: Arc<WsManager>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let timeout = StoreTimeout::from_secs(config.store_timeout_secs);
        let feature_gate = Arc::new(CachedFeatureGate::new(
            pool.clone(),
            Duration::from_secs(config.feature_toggle_ttl_secs),
        ));
        let lifecycle = Arc::new(ComplaintLifecycle::new(
            pool.clone(),
            feature_gate.clone(),
            Arc::new(PgDuplicateDetector::new(pool.clone())),
            timeout,
        ));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            pool.clone(),
            Arc::clone(&event_bus),
            timeout,
        ));
        let blob_store: Arc<dyn BlobStore> =
            Arc::new(LocalBlobStore::new(config.uploads_dir.clone()));

        Self {
            pool,
            config: Arc::new(config),
            ws_manager,
            event_bus,
            lifecycle,
            dispatcher,
            feature_gate,
            blob_store,
        }
    }
}
