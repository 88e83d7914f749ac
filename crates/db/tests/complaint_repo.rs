//! Integration tests for the complaint repositories.
//!
//! Exercises the repository layer against a real database to verify that:
//! - Soft-deleted complaints are hidden from live lookups and default listings
//! - Restore only applies to deleted rows
//! - `write_lifecycle` is conditional on the stored version
//! - Version snapshots are unique per `(complaint_id, version)`
//! - Listing filters, search and pagination behave as documented
//! - The duplicate history query is scoped to one student's recent live rows

use chrono::{Duration, Utc};
use hostel_core::complaint::{Category, ComplaintStatus, Priority};
use hostel_core::lifecycle::{Actor, StatusChange};
use hostel_core::pagination::Pagination;
use hostel_db::models::complaint::{ComplaintFilter, CreateComplaint};
use hostel_db::models::user::CreateUser;
use hostel_db::repositories::{ComplaintRepo, ComplaintVersionRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, email: &str, role: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role: role.to_string(),
            room_number: Some("B-12".to_string()),
            hostel: Some("North".to_string()),
        },
    )
    .await
    .unwrap()
    .id
}

fn new_complaint(student_id: i64, title: &str) -> CreateComplaint {
    CreateComplaint {
        title: title.to_string(),
        description: "The legs are cracked and it wobbles badly".to_string(),
        category: Category::Furniture,
        priority: Priority::Medium,
        student_id,
        images: vec!["/uploads/a.png".to_string()],
    }
}

// ---------------------------------------------------------------------------
// Test: create defaults
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_applies_defaults(pool: PgPool) {
    let student = new_user(&pool, "s1@example.com", "student").await;
    let complaint = ComplaintRepo::create(&pool, &new_complaint(student, "Broken chair in hostel"))
        .await
        .unwrap();

    assert_eq!(complaint.status, ComplaintStatus::Pending);
    assert_eq!(complaint.version, 1);
    assert_eq!(complaint.currency, "INR");
    assert_eq!(complaint.admin_notes, "");
    assert_eq!(complaint.images, vec!["/uploads/a.png".to_string()]);
    assert!(complaint.deleted_at.is_none());
}

// ---------------------------------------------------------------------------
// Test: soft delete and restore
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_delete_hides_and_restore_reveals(pool: PgPool) {
    let student = new_user(&pool, "s2@example.com", "student").await;
    let complaint = ComplaintRepo::create(&pool, &new_complaint(student, "Fan not working"))
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    assert!(ComplaintRepo::soft_delete(&mut tx, complaint.id, student).await.unwrap());
    assert!(
        !ComplaintRepo::soft_delete(&mut tx, complaint.id, student).await.unwrap(),
        "second soft_delete should be a no-op"
    );
    tx.commit().await.unwrap();

    assert!(ComplaintRepo::find_live(&pool, complaint.id).await.unwrap().is_none());
    let deleted = ComplaintRepo::find_by_id_include_deleted(&pool, complaint.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deleted.deleted_by, Some(student));

    let listed = ComplaintRepo::list(&pool, &ComplaintFilter::default()).await.unwrap();
    assert!(listed.iter().all(|c| c.id != complaint.id));
    let with_deleted = ComplaintRepo::list(
        &pool,
        &ComplaintFilter {
            include_deleted: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(with_deleted.iter().any(|c| c.id == complaint.id));

    let restored = ComplaintRepo::restore(&pool, complaint.id).await.unwrap().unwrap();
    assert!(restored.deleted_at.is_none());
    assert!(restored.deleted_by.is_none());
    assert!(
        ComplaintRepo::restore(&pool, complaint.id).await.unwrap().is_none(),
        "restoring a live complaint should return None"
    );
}

// ---------------------------------------------------------------------------
// Test: conditional lifecycle write + version uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_write_lifecycle_is_version_conditional(pool: PgPool) {
    let student = new_user(&pool, "s3@example.com", "student").await;
    let admin = new_user(&pool, "a3@example.com", "admin").await;
    let complaint = ComplaintRepo::create(&pool, &new_complaint(student, "Water leakage"))
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let locked = ComplaintRepo::lock_live_for_update(&mut tx, complaint.id)
        .await
        .unwrap()
        .unwrap();
    let mut state = locked.lifecycle_state();
    let applied = state
        .apply_status_change(
            StatusChange {
                status: ComplaintStatus::InProgress,
                ..Default::default()
            },
            &Actor::admin(admin),
            Utc::now(),
        )
        .unwrap();

    let updated = ComplaintRepo::write_lifecycle(&mut tx, &state, locked.version)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.status, ComplaintStatus::InProgress);
    ComplaintVersionRepo::insert(&mut tx, &applied.version).await.unwrap();

    // A stale expected version no longer matches.
    let stale = ComplaintRepo::write_lifecycle(&mut tx, &state, 1).await.unwrap();
    assert!(stale.is_none());
    tx.commit().await.unwrap();

    // Inserting the same version twice violates the unique constraint.
    let mut tx = pool.begin().await.unwrap();
    let err = ComplaintVersionRepo::insert(&mut tx, &applied.version)
        .await
        .unwrap_err();
    let constraint = err
        .as_database_error()
        .and_then(|e| e.constraint())
        .map(str::to_string);
    assert_eq!(
        constraint.as_deref(),
        Some("uq_complaint_versions_complaint_version")
    );
    drop(tx);

    let versions = ComplaintVersionRepo::list_for_complaint(&pool, complaint.id)
        .await
        .unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].version, 2);
    assert_eq!(versions[0].change_reason, "Status: pending → in_progress");
    assert_eq!(versions[0].changed_by, Some(admin));
}

// ---------------------------------------------------------------------------
// Test: listing filters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_search_and_pagination(pool: PgPool) {
    let s1 = new_user(&pool, "s4@example.com", "student").await;
    let s2 = new_user(&pool, "s5@example.com", "student").await;
    for title in ["Broken chair", "Leaky tap 50%", "Noisy fan"] {
        ComplaintRepo::create(&pool, &new_complaint(s1, title)).await.unwrap();
    }
    ComplaintRepo::create(&pool, &new_complaint(s2, "Broken window")).await.unwrap();

    let own = ComplaintFilter {
        student_id: Some(s1),
        ..Default::default()
    };
    assert_eq!(ComplaintRepo::count(&pool, &own).await.unwrap(), 3);

    let search = ComplaintFilter {
        search: Some("BROKEN".to_string()),
        ..Default::default()
    };
    assert_eq!(ComplaintRepo::count(&pool, &search).await.unwrap(), 2);

    // `%` in the search term is matched literally.
    let literal = ComplaintFilter {
        search: Some("50%".to_string()),
        ..Default::default()
    };
    let hits = ComplaintRepo::list(&pool, &literal).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Leaky tap 50%");

    let resolved_only = ComplaintFilter {
        status: Some(ComplaintStatus::Resolved),
        ..Default::default()
    };
    assert_eq!(ComplaintRepo::count(&pool, &resolved_only).await.unwrap(), 0);

    let paged = ComplaintFilter {
        student_id: Some(s1),
        pagination: Pagination::from_query(Some(2), Some(2)),
        ..Default::default()
    };
    let page_two = ComplaintRepo::list(&pool, &paged).await.unwrap();
    assert_eq!(page_two.len(), 1);
    // Newest first: the first complaint created lands on the last page.
    assert_eq!(page_two[0].title, "Broken chair");
}

// ---------------------------------------------------------------------------
// Test: duplicate lookup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_recent_for_student_scopes_owner_window_and_deletion(pool: PgPool) {
    let s1 = new_user(&pool, "s6@example.com", "student").await;
    let s2 = new_user(&pool, "s7@example.com", "student").await;
    let older = ComplaintRepo::create(&pool, &new_complaint(s1, "Broken chair in hostel"))
        .await
        .unwrap();
    let newer = ComplaintRepo::create(&pool, &new_complaint(s1, "Broken table in hostel"))
        .await
        .unwrap();
    let gone = ComplaintRepo::create(&pool, &new_complaint(s1, "Broken lamp in hostel"))
        .await
        .unwrap();
    ComplaintRepo::create(&pool, &new_complaint(s2, "Broken chair in hostel"))
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    assert!(ComplaintRepo::soft_delete(&mut tx, gone.id, s1).await.unwrap());
    tx.commit().await.unwrap();

    let since = Utc::now() - Duration::days(7);
    let recent = ComplaintRepo::recent_for_student(&pool, s1, since).await.unwrap();
    assert_eq!(
        recent.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![newer.id, older.id]
    );

    let future = Utc::now() + Duration::minutes(1);
    let none = ComplaintRepo::recent_for_student(&pool, s1, future).await.unwrap();
    assert!(none.is_empty(), "rows outside the window are excluded");
}
