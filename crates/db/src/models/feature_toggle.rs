//! Feature toggle model and DTOs.

use hostel_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `feature_toggles` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct FeatureToggle {
    pub id: DbId,
    pub key: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub updated_at: Timestamp,
}

/// DTO for flipping a toggle. An absent `enabled` turns the toggle on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFeatureToggle {
    pub enabled: Option<bool>,
}
