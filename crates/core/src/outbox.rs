//! Side effects produced by lifecycle operations.
//!
//! Lifecycle code never talks to the notification store or the realtime
//! channel directly. It returns an [`Outbox`] alongside its value and the
//! dispatcher in the API crate drains it once the write has committed.

use serde_json::Value;

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Realtime rooms and events
// ---------------------------------------------------------------------------

pub const EVENT_COMPLAINT_CREATED: &str = "complaintCreated";
pub const EVENT_COMPLAINT_STATUS_CHANGED: &str = "complaintStatusChanged";
pub const EVENT_COMPLAINT_DELETED: &str = "complaintDeleted";
pub const EVENT_NOTIFICATION: &str = "notification";

const ADMIN_ROOM: &str = "admin";
const USER_ROOM_PREFIX: &str = "user:";

/// A broadcast group on the realtime channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    /// Every connection authenticated as the given user.
    User(DbId),
    /// Every admin connection.
    Admin,
}

impl Room {
    pub fn key(&self) -> String {
        match self {
            Room::User(id) => format!("{USER_ROOM_PREFIX}{id}"),
            Room::Admin => ADMIN_ROOM.to_string(),
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        if key == ADMIN_ROOM {
            return Some(Room::Admin);
        }
        key.strip_prefix(USER_ROOM_PREFIX)?
            .parse()
            .ok()
            .map(Room::User)
    }
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

define_text_enum! {
    NotificationKind ("notification type") {
        StatusUpdate = "status_update",
        NewAdminNote = "new_admin_note",
        ComplaintResolved = "complaint_resolved",
        HighPriorityAlert = "high_priority_alert",
    }
}

define_text_enum! {
    NotificationPriority ("notification priority") {
        Normal = "normal",
        High = "high",
    }
}

impl Default for NotificationPriority {
    fn default() -> Self {
        NotificationPriority::Normal
    }
}

/// A notification waiting to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub user_id: DbId,
    pub complaint_id: Option<DbId>,
    pub message: String,
    pub kind: NotificationKind,
    pub priority: NotificationPriority,
}

/// A best-effort realtime message.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimePush {
    pub room: Room,
    pub event: &'static str,
    pub payload: Value,
}

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outbox {
    pub notifications: Vec<NotificationDraft>,
    pub pushes: Vec<RealtimePush>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, draft: NotificationDraft) {
        self.notifications.push(draft);
    }

    pub fn push(&mut self, room: Room, event: &'static str, payload: Value) {
        self.pushes.push(RealtimePush {
            room,
            event,
            payload,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty() && self.pushes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn room_keys_round_trip() {
        assert_eq!(Room::User(42).key(), "user:42");
        assert_eq!(Room::Admin.key(), "admin");
        assert_eq!(Room::parse("user:42"), Some(Room::User(42)));
        assert_eq!(Room::parse("admin"), Some(Room::Admin));
        assert_eq!(Room::parse("user:abc"), None);
        assert_eq!(Room::parse("lobby"), None);
    }

    #[test]
    fn outbox_collects_effects_in_order() {
        let mut outbox = Outbox::new();
        assert!(outbox.is_empty());

        outbox.push(Room::Admin, EVENT_COMPLAINT_CREATED, json!({"id": 1}));
        outbox.push(Room::User(3), EVENT_COMPLAINT_DELETED, json!({"complaint_id": 1}));
        outbox.notify(NotificationDraft {
            user_id: 3,
            complaint_id: Some(1),
            message: "hello".into(),
            kind: NotificationKind::StatusUpdate,
            priority: NotificationPriority::default(),
        });

        assert!(!outbox.is_empty());
        assert_eq!(outbox.pushes[0].room, Room::Admin);
        assert_eq!(outbox.pushes[1].event, "complaintDeleted");
        assert_eq!(outbox.notifications[0].priority, NotificationPriority::Normal);
    }

    #[test]
    fn notification_kind_names() {
        assert_eq!(NotificationKind::HighPriorityAlert.as_str(), "high_priority_alert");
        assert!(NotificationKind::parse("email").is_err());
    }
}
