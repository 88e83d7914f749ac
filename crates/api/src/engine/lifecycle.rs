//! [`ComplaintLifecycle`]: create, transition, cost, approval, soft-delete,
//! restore, student edit, feedback and listing over PostgreSQL.

use std::sync::Arc;

use chrono::Utc;
use hostel_core::complaint::{
    parse_rating, parse_status_filter, truncate_feedback, validate_description, validate_images,
    validate_title, Category, ComplaintSort, Priority,
};
use hostel_core::duplicate_detection::{
    DuplicateCandidate, DuplicateConflict, DuplicateDetector, DuplicateLookup, PREVIEW_POLICY,
    SUBMISSION_POLICY,
};
use hostel_core::error::CoreError;
use hostel_core::feature_toggle::{FeatureGate, TOGGLE_DUPLICATE_DETECTION};
use hostel_core::lifecycle::{
    authorize_feedback, authorize_soft_delete, authorize_student_edit, authorize_view,
    require_admin, Actor, Applied, ApprovalDecision, CostUpdate, LifecycleState, StatusChange,
};
use hostel_core::outbox::{
    Outbox, Room, EVENT_COMPLAINT_CREATED, EVENT_COMPLAINT_DELETED,
    EVENT_COMPLAINT_STATUS_CHANGED,
};
use hostel_core::pagination::{PageMeta, Pagination};
use hostel_core::types::DbId;
use hostel_db::models::complaint::{
    Complaint, ComplaintFilter, ComplaintResponse, CreateComplaint, UpdateComplaint,
};
use hostel_db::models::complaint_version::ComplaintVersion;
use hostel_db::repositories::{ComplaintRepo, ComplaintVersionRepo};
use hostel_db::DbPool;
use serde::Serialize;
use serde_json::{json, Value};

use super::StoreTimeout;

const ENTITY: &str = "Complaint";

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// A value plus the side effects to dispatch once it is committed.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub outbox: Outbox,
}

/// Unvalidated submission from a student.
#[derive(Debug, Clone, Default)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub images: Vec<String>,
}

/// Unvalidated student edit; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ComplaintEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

/// Raw listing parameters.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub include_deleted: bool,
    pub pagination: Pagination,
}

#[derive(Debug)]
pub struct ComplaintPage {
    pub items: Vec<Complaint>,
    pub meta: PageMeta,
}

/// Result of the non-blocking duplicate preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateCheck {
    pub is_possible_duplicate: bool,
    pub existing_id: Option<DbId>,
    pub similar_complaints: Vec<DuplicateCandidate>,
}

/// Empty strings from forms mean "not provided".
fn provided(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn complaint_payload(complaint: &Complaint) -> Result<Value, CoreError> {
    serde_json::to_value(ComplaintResponse::from(complaint.clone()))
        .map_err(|e| CoreError::Internal(format!("complaint serialization failed: {e}")))
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound { entity: ENTITY, id }
}

// ---------------------------------------------------------------------------
// Lifecycle manager
// ---------------------------------------------------------------------------

/// Owns the complaint state machine and its persistence.
pub struct ComplaintLifecycle {
    pool: DbPool,
    gate: Arc<dyn FeatureGate>,
    detector: Arc<dyn DuplicateDetector>,
    timeout: StoreTimeout,
}

impl ComplaintLifecycle {
    pub fn new(
        pool: DbPool,
        gate: Arc<dyn FeatureGate>,
        detector: Arc<dyn DuplicateDetector>,
        timeout: StoreTimeout,
    ) -> Self {
        Self {
            pool,
            gate,
            detector,
            timeout,
        }
    }

    // -- create -------------------------------------------------------------

    /// File a complaint on behalf of `actor`.
    ///
    /// Fails with [`CoreError::Duplicate`] when duplicate detection is on and
    /// the student filed something similar in the last week.
    pub async fn create(
        &self,
        actor: &Actor,
        input: NewComplaint,
    ) -> Result<Outcome<Complaint>, CoreError> {
        validate_title(&input.title)?;
        validate_description(&input.description)?;
        validate_images(&input.images)?;
        let category = provided(input.category.as_deref())
            .map(Category::parse)
            .transpose()?
            .unwrap_or_default();
        let priority = provided(input.priority.as_deref())
            .map(Priority::parse)
            .transpose()?
            .unwrap_or_default();

        let detection_on = self
            .timeout
            .run(
                "feature toggle check",
                self.gate.is_enabled(TOGGLE_DUPLICATE_DETECTION),
            )
            .await?;
        if detection_on {
            let lookup = DuplicateLookup::new(
                actor.user_id,
                &input.title,
                &input.description,
                &SUBMISSION_POLICY,
                Utc::now(),
            );
            let candidates = self
                .timeout
                .run("duplicate lookup", self.detector.find_similar(&lookup))
                .await?;
            if let Some(conflict) = DuplicateConflict::from_candidates(candidates) {
                tracing::info!(
                    student_id = actor.user_id,
                    possible_duplicate_id = conflict.possible_duplicate_id,
                    "Duplicate complaint rejected"
                );
                return Err(CoreError::Duplicate(conflict));
            }
        }

        let complaint = self
            .timeout
            .sql(
                "insert complaint",
                ComplaintRepo::create(
                    &self.pool,
                    &CreateComplaint {
                        title: input.title,
                        description: input.description,
                        category,
                        priority,
                        student_id: actor.user_id,
                        images: input.images,
                    },
                ),
            )
            .await?;
        tracing::info!(
            complaint_id = complaint.id,
            student_id = actor.user_id,
            "Complaint created"
        );

        let mut outbox = Outbox::new();
        outbox.push(Room::Admin, EVENT_COMPLAINT_CREATED, complaint_payload(&complaint)?);
        Ok(Outcome {
            value: complaint,
            outbox,
        })
    }

    // -- tracked mutations --------------------------------------------------

    /// Admin status transition with optional notes, costs and estimate.
    pub async fn transition(
        &self,
        id: DbId,
        change: StatusChange,
        actor: &Actor,
    ) -> Result<Outcome<Complaint>, CoreError> {
        require_admin(actor)?;
        let now = Utc::now();
        let mut outcome = self
            .apply_tracked(id, |state| state.apply_status_change(change, actor, now))
            .await?;

        let complaint = &outcome.value;
        outcome.outbox.push(
            Room::User(complaint.student_id),
            EVENT_COMPLAINT_STATUS_CHANGED,
            complaint_payload(complaint)?,
        );
        tracing::info!(
            complaint_id = id,
            status = %complaint.status,
            version = complaint.version,
            "Complaint status updated"
        );
        Ok(outcome)
    }

    pub async fn update_cost(
        &self,
        id: DbId,
        update: CostUpdate,
        actor: &Actor,
    ) -> Result<Outcome<Complaint>, CoreError> {
        require_admin(actor)?;
        let now = Utc::now();
        self.apply_tracked(id, |state| state.apply_cost_update(update, actor, now))
            .await
    }

    pub async fn approve(
        &self,
        id: DbId,
        decision: ApprovalDecision,
        actor: &Actor,
    ) -> Result<Outcome<Complaint>, CoreError> {
        require_admin(actor)?;
        let now = Utc::now();
        self.apply_tracked(id, |state| state.apply_approval(decision, actor, now))
            .await
    }

    /// Lock the live row, apply `apply`, write it back only if nobody else
    /// bumped the version, and record the version row, all in one transaction.
    async fn apply_tracked<F>(&self, id: DbId, apply: F) -> Result<Outcome<Complaint>, CoreError>
    where
        F: FnOnce(&mut LifecycleState) -> Result<Applied, CoreError>,
    {
        let mut tx = self.timeout.sql("begin transaction", self.pool.begin()).await?;

        let current = self
            .timeout
            .sql("lock complaint", ComplaintRepo::lock_live_for_update(&mut tx, id))
            .await?
            .ok_or_else(|| not_found(id))?;

        let expected_version = current.version;
        let mut state = current.lifecycle_state();
        let applied = apply(&mut state)?;

        let updated = self
            .timeout
            .sql(
                "write complaint",
                ComplaintRepo::write_lifecycle(&mut tx, &state, expected_version),
            )
            .await?
            .ok_or_else(|| {
                CoreError::Conflict("Complaint was modified concurrently, please retry".into())
            })?;

        self.timeout
            .sql(
                "record version",
                ComplaintVersionRepo::insert(&mut tx, &applied.version),
            )
            .await?;
        self.timeout.sql("commit", tx.commit()).await?;

        tracing::debug!(
            complaint_id = id,
            version = updated.version,
            reason = %applied.version.change_reason,
            "Complaint version recorded"
        );
        Ok(Outcome {
            value: updated,
            outbox: applied.outbox,
        })
    }

    // -- soft delete / restore ----------------------------------------------

    pub async fn soft_delete(&self, id: DbId, actor: &Actor) -> Result<Outcome<()>, CoreError> {
        let mut tx = self.timeout.sql("begin transaction", self.pool.begin()).await?;
        let current = self
            .timeout
            .sql("lock complaint", ComplaintRepo::lock_live_for_update(&mut tx, id))
            .await?
            .ok_or_else(|| not_found(id))?;

        authorize_soft_delete(current.student_id, current.status, actor)?;

        let marked = self
            .timeout
            .sql(
                "soft delete complaint",
                ComplaintRepo::soft_delete(&mut tx, id, actor.user_id),
            )
            .await?;
        if !marked {
            return Err(not_found(id));
        }
        self.timeout.sql("commit", tx.commit()).await?;
        tracing::info!(complaint_id = id, deleted_by = actor.user_id, "Complaint soft-deleted");

        let mut outbox = Outbox::new();
        outbox.push(
            Room::User(current.student_id),
            EVENT_COMPLAINT_DELETED,
            json!({ "complaint_id": id }),
        );
        Ok(Outcome { value: (), outbox })
    }

    /// Clear the soft-delete marker. Only deleted complaints can be restored.
    pub async fn restore(&self, id: DbId, actor: &Actor) -> Result<Complaint, CoreError> {
        require_admin(actor)?;
        let restored = self
            .timeout
            .sql("restore complaint", ComplaintRepo::restore(&self.pool, id))
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(complaint_id = id, restored_by = actor.user_id, "Complaint restored");
        Ok(restored)
    }

    // -- student operations -------------------------------------------------

    /// Owner edit of a pending complaint. Not versioned.
    pub async fn update(
        &self,
        id: DbId,
        edit: ComplaintEdit,
        actor: &Actor,
    ) -> Result<Complaint, CoreError> {
        let mut tx = self.timeout.sql("begin transaction", self.pool.begin()).await?;
        let current = self
            .timeout
            .sql("lock complaint", ComplaintRepo::lock_live_for_update(&mut tx, id))
            .await?
            .ok_or_else(|| not_found(id))?;

        authorize_student_edit(current.student_id, current.status, actor)?;

        if let Some(title) = &edit.title {
            validate_title(title)?;
        }
        if let Some(description) = &edit.description {
            validate_description(description)?;
        }
        let changes = UpdateComplaint {
            title: edit.title,
            description: edit.description,
            category: provided(edit.category.as_deref())
                .map(Category::parse)
                .transpose()?,
            priority: provided(edit.priority.as_deref())
                .map(Priority::parse)
                .transpose()?,
        };

        let updated = self
            .timeout
            .sql(
                "update complaint",
                ComplaintRepo::update_details(&mut tx, id, &changes),
            )
            .await?
            .ok_or_else(|| not_found(id))?;
        self.timeout.sql("commit", tx.commit()).await?;
        Ok(updated)
    }

    /// Owner rating of a resolved complaint.
    ///
    /// The rating is validated before the complaint is looked up.
    pub async fn submit_feedback(
        &self,
        id: DbId,
        rating: &Value,
        feedback: Option<&str>,
        actor: &Actor,
    ) -> Result<Complaint, CoreError> {
        let rating = parse_rating(rating)?;

        let mut tx = self.timeout.sql("begin transaction", self.pool.begin()).await?;
        let current = self
            .timeout
            .sql("lock complaint", ComplaintRepo::lock_live_for_update(&mut tx, id))
            .await?
            .ok_or_else(|| not_found(id))?;

        authorize_feedback(current.student_id, current.status, actor)?;

        let feedback = feedback.map(truncate_feedback);
        let updated = self
            .timeout
            .sql(
                "store feedback",
                ComplaintRepo::submit_feedback(&mut tx, id, rating, feedback.as_deref()),
            )
            .await?
            .ok_or_else(|| not_found(id))?;
        self.timeout.sql("commit", tx.commit()).await?;
        tracing::info!(complaint_id = id, rating, "Resolution feedback recorded");
        Ok(updated)
    }

    // -- reads --------------------------------------------------------------

    /// Students see only their own complaints; admins see everything and may
    /// opt into soft-deleted rows.
    pub async fn list(&self, query: ListQuery, actor: &Actor) -> Result<ComplaintPage, CoreError> {
        let sort = provided(query.sort_by.as_deref())
            .map(ComplaintSort::parse)
            .transpose()?
            .unwrap_or_default();
        let filter = ComplaintFilter {
            student_id: (!actor.is_admin).then_some(actor.user_id),
            status: parse_status_filter(query.status.as_deref())?,
            search: query.search,
            include_deleted: actor.is_admin && query.include_deleted,
            sort,
            pagination: query.pagination,
        };

        let items = self
            .timeout
            .sql("list complaints", ComplaintRepo::list(&self.pool, &filter))
            .await?;
        let total = self
            .timeout
            .sql("count complaints", ComplaintRepo::count(&self.pool, &filter))
            .await?;
        Ok(ComplaintPage {
            items,
            meta: filter.pagination.meta(total),
        })
    }

    pub async fn get(&self, id: DbId, actor: &Actor) -> Result<Complaint, CoreError> {
        let complaint = self
            .timeout
            .sql("load complaint", ComplaintRepo::find_live(&self.pool, id))
            .await?
            .ok_or_else(|| not_found(id))?;
        authorize_view(complaint.student_id, actor)?;
        Ok(complaint)
    }

    /// Version history, newest first. History survives soft-delete but only
    /// admins can reach it once the complaint is deleted.
    pub async fn versions(
        &self,
        id: DbId,
        actor: &Actor,
    ) -> Result<Vec<ComplaintVersion>, CoreError> {
        let complaint = self
            .timeout
            .sql(
                "load complaint",
                ComplaintRepo::find_by_id_include_deleted(&self.pool, id),
            )
            .await?
            .filter(|c| actor.is_admin || !c.is_deleted())
            .ok_or_else(|| not_found(id))?;
        authorize_view(complaint.student_id, actor)?;

        self.timeout
            .sql(
                "list versions",
                ComplaintVersionRepo::list_for_complaint(&self.pool, id),
            )
            .await
    }

    /// Preview whether a submission would look like a duplicate. Never blocks
    /// and ignores the duplicate detection toggle.
    pub async fn check_duplicate(
        &self,
        actor: &Actor,
        title: &str,
        description: &str,
    ) -> Result<DuplicateCheck, CoreError> {
        if title.trim().is_empty() || description.trim().is_empty() {
            return Err(CoreError::Validation(
                "Title and description are required".into(),
            ));
        }
        let lookup =
            DuplicateLookup::new(actor.user_id, title, description, &PREVIEW_POLICY, Utc::now());
        let similar = self
            .timeout
            .run("duplicate lookup", self.detector.find_similar(&lookup))
            .await?;
        let existing_id = similar.first().map(|c| c.id);
        Ok(DuplicateCheck {
            is_possible_duplicate: existing_id.is_some(),
            existing_id,
            similar_complaints: similar,
        })
    }
}
