use std::sync::Arc;

use hostel_core::error::CoreError;
use hostel_core::outbox::{NotificationDraft, Outbox, RealtimePush, Room, EVENT_NOTIFICATION};
use hostel_db::models::notification::Notification;
use hostel_db::repositories::NotificationRepo;
use hostel_db::DbPool;
use hostel_events::{EventBus, RealtimeEvent};

use crate::engine::StoreTimeout;

/// Persists notifications and publishes realtime events.
///
/// Persistence failures surface as [`CoreError::Storage`] and are not
/// retried. Realtime delivery is best-effort: an event nobody is listening
/// for is simply dropped.
pub struct NotificationDispatcher {
    pool: DbPool,
    event_bus: Arc<EventBus>,
    timeout: StoreTimeout,
}

impl NotificationDispatcher {
    pub fn new(pool: DbPool, event_bus: Arc<EventBus>, timeout: StoreTimeout) -> Self {
        Self {
            pool,
            event_bus,
            timeout,
        }
    }

    /// Persist one notification, then announce it to the recipient's room.
    pub async fn notify(&self, draft: &NotificationDraft) -> Result<Notification, CoreError> {
        let notification = self
            .timeout
            .sql("insert notification", NotificationRepo::create(&self.pool, draft))
            .await?;

        match serde_json::to_value(&notification) {
            Ok(payload) => {
                self.event_bus.publish(
                    RealtimeEvent::new(Room::User(notification.user_id), EVENT_NOTIFICATION)
                        .with_payload(payload),
                );
            }
            Err(e) => {
                tracing::warn!(
                    notification_id = notification.id,
                    error = %e,
                    "Notification not pushed"
                );
            }
        }
        Ok(notification)
    }

    /// Publish a realtime event. Returns how many bus subscribers saw it.
    pub fn push(&self, push: RealtimePush) -> usize {
        self.event_bus.publish(RealtimeEvent::from(push))
    }

    /// Drain an outbox: realtime pushes first, then notification rows.
    ///
    /// Pushes describe a change that has already committed, so they are sent
    /// even if a notification insert later fails.
    pub async fn dispatch(&self, outbox: Outbox) -> Result<Vec<Notification>, CoreError> {
        for push in outbox.pushes {
            let event = push.event;
            let room = push.room;
            let receivers = self.push(push);
            tracing::debug!(event, room = %room, receivers, "Realtime event published");
        }

        let mut saved = Vec::with_capacity(outbox.notifications.len());
        for draft in &outbox.notifications {
            saved.push(self.notify(draft).await?);
        }
        Ok(saved)
    }

    /// Drain the outbox of a change that has already committed.
    ///
    /// The change stands either way, so a failed notification is logged
    /// rather than turned into an error response a client might retry.
    pub async fn dispatch_committed(&self, outbox: Outbox) {
        if let Err(e) = self.dispatch(outbox).await {
            tracing::error!(error = %e, "Notification delivery failed after commit");
        }
    }
}
