//! Complaint enumerations, field bounds, and boundary validation.
//!
//! Every value that reaches the database passes through one of the parsers or
//! validators here first; the migration's CHECK constraints mirror them.

use chrono::Duration;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Field bounds
// ---------------------------------------------------------------------------

pub const TITLE_MIN_CHARS: usize = 5;
pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const FEEDBACK_MAX_CHARS: usize = 1000;
pub const MAX_IMAGES: usize = 5;
pub const MAX_IMAGE_REFERENCE_CHARS: usize = 512;
pub const RATING_MIN: i16 = 1;
pub const RATING_MAX: i16 = 5;
/// Longest repair estimate accepted, about ten years.
pub const MAX_ESTIMATED_DAYS: i32 = 3650;

/// Currency tag stored alongside cost figures.
pub const DEFAULT_CURRENCY: &str = "INR";

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

define_text_enum! {
    /// What the complaint is about.
    Category ("category") {
        Cleaning = "cleaning",
        Maintenance = "maintenance",
        Food = "food",
        Water = "water",
        Electricity = "electricity" | "electrical",
        Plumbing = "plumbing",
        Furniture = "furniture",
        Internet = "internet",
        Other = "other" | "others",
    }
}

define_text_enum! {
    /// Processing status. Transitions are admin-only and unrestricted.
    ComplaintStatus ("status") {
        Pending = "pending",
        InProgress = "in_progress",
        Resolved = "resolved",
    }
}

define_text_enum! {
    Priority ("priority") {
        Low = "low",
        Medium = "medium",
        High = "high",
    }
}

define_text_enum! {
    /// Secondary track gating whether a complaint is accepted for processing.
    ApprovalStatus ("approval status") {
        PendingApproval = "pending_approval",
        Approved = "approved",
        Rejected = "rejected",
    }
}

define_text_enum! {
    /// Column a complaint listing is ordered by (always descending).
    ComplaintSort ("sort field") {
        CreatedAt = "created_at" | "createdAt",
        UpdatedAt = "updated_at" | "updatedAt",
    }
}

impl Default for ComplaintSort {
    fn default() -> Self {
        ComplaintSort::CreatedAt
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl Default for ComplaintStatus {
    fn default() -> Self {
        ComplaintStatus::Pending
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Parse an optional status filter where `"all"` (or absence) means no filter.
pub fn parse_status_filter(value: Option<&str>) -> Result<Option<ComplaintStatus>, CoreError> {
    match value.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(raw) => ComplaintStatus::parse(raw).map(Some),
    }
}

// ---------------------------------------------------------------------------
// Text validation
// ---------------------------------------------------------------------------

fn validate_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), CoreError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(CoreError::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    validate_length("Title", title, TITLE_MIN_CHARS, TITLE_MAX_CHARS)
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    validate_length(
        "Description",
        description,
        DESCRIPTION_MIN_CHARS,
        DESCRIPTION_MAX_CHARS,
    )
}

/// Validate the list of blob references attached to a complaint.
pub fn validate_images(images: &[String]) -> Result<(), CoreError> {
    if images.len() > MAX_IMAGES {
        return Err(CoreError::Validation(format!(
            "At most {MAX_IMAGES} images may be attached"
        )));
    }
    for image in images {
        if image.trim().is_empty() || image.chars().count() > MAX_IMAGE_REFERENCE_CHARS {
            return Err(CoreError::Validation(format!(
                "Image references must be non-empty and at most {MAX_IMAGE_REFERENCE_CHARS} characters"
            )));
        }
    }
    Ok(())
}

/// Cost figures must be finite and non-negative.
pub fn validate_cost(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

pub fn validate_estimated_days(days: i32) -> Result<(), CoreError> {
    if !(0..=MAX_ESTIMATED_DAYS).contains(&days) {
        return Err(CoreError::Validation(format!(
            "Estimated days must be between 0 and {MAX_ESTIMATED_DAYS}"
        )));
    }
    Ok(())
}

/// `now + days`, recomputed from scratch on every call.
pub fn expected_completion(now: Timestamp, days: i32) -> Result<Timestamp, CoreError> {
    validate_estimated_days(days)?;
    now.checked_add_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| CoreError::Validation("Estimated completion date is out of range".into()))
}

// ---------------------------------------------------------------------------
// Resolution feedback
// ---------------------------------------------------------------------------

/// Parse a resolution rating from a JSON value.
///
/// Accepts JSON numbers and numeric strings (`4`, `"4"`, `4.0`). Anything
/// non-numeric, fractional, or outside `[1, 5]` is rejected.
pub fn parse_rating(value: &serde_json::Value) -> Result<i16, CoreError> {
    let invalid = || CoreError::Validation("Rating must be a number between 1 and 5".into());

    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(invalid)?;

    if !number.is_finite() || number.fract() != 0.0 {
        return Err(invalid());
    }
    if number < f64::from(RATING_MIN) || number > f64::from(RATING_MAX) {
        return Err(invalid());
    }
    Ok(number as i16)
}

/// Truncate free-text feedback to [`FEEDBACK_MAX_CHARS`] characters.
pub fn truncate_feedback(feedback: &str) -> String {
    feedback.chars().take(FEEDBACK_MAX_CHARS).collect()
}

/// The first attached image, surfaced to clients as `proof_image`.
pub fn proof_image(images: &[String]) -> Option<&str> {
    images.first().map(String::as_str)
}
