//! Integration tests for the notification inbox and feature toggles.

use hostel_core::outbox::{NotificationDraft, NotificationKind, NotificationPriority};
use hostel_db::models::user::CreateUser;
use hostel_db::repositories::{FeatureToggleRepo, NotificationRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, email: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Inbox User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: "student".to_string(),
            room_number: None,
            hostel: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn draft(user_id: i64, message: &str) -> NotificationDraft {
    NotificationDraft {
        user_id,
        complaint_id: None,
        message: message.to_string(),
        kind: NotificationKind::StatusUpdate,
        priority: NotificationPriority::Normal,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inbox_read_state_and_ownership(pool: PgPool) {
    let owner = new_user(&pool, "owner@example.com").await;
    let other = new_user(&pool, "other@example.com").await;

    let first = NotificationRepo::create(&pool, &draft(owner, "first")).await.unwrap();
    NotificationRepo::create(&pool, &draft(owner, "second")).await.unwrap();
    assert_eq!(NotificationRepo::unread_count(&pool, owner).await.unwrap(), 2);

    let listed = NotificationRepo::list_for_user(&pool, owner, 50).await.unwrap();
    assert_eq!(listed[0].message, "second");

    // Someone else cannot read or delete the owner's notification.
    assert!(NotificationRepo::mark_read(&pool, first.id, other).await.unwrap().is_none());
    assert!(!NotificationRepo::delete(&pool, first.id, other).await.unwrap());

    let read = NotificationRepo::mark_read(&pool, first.id, owner).await.unwrap().unwrap();
    assert!(read.is_read);
    assert!(read.read_at.is_some());
    assert_eq!(NotificationRepo::unread_count(&pool, owner).await.unwrap(), 1);

    assert_eq!(NotificationRepo::mark_all_read(&pool, owner).await.unwrap(), 1);
    assert_eq!(NotificationRepo::unread_count(&pool, owner).await.unwrap(), 0);

    assert!(NotificationRepo::delete(&pool, first.id, owner).await.unwrap());
    assert_eq!(NotificationRepo::list_for_user(&pool, owner, 50).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_detection_toggle_is_seeded(pool: PgPool) {
    let toggle = FeatureToggleRepo::find_by_key(&pool, "duplicate_detection")
        .await
        .unwrap()
        .expect("seed row should exist");
    assert!(toggle.enabled);

    let off = FeatureToggleRepo::set_enabled(&pool, "duplicate_detection", false)
        .await
        .unwrap()
        .unwrap();
    assert!(!off.enabled);

    assert!(FeatureToggleRepo::set_enabled(&pool, "missing_toggle", true)
        .await
        .unwrap()
        .is_none());
    assert_eq!(FeatureToggleRepo::list(&pool).await.unwrap().len(), 1);
}
