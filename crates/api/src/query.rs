//! Shared query parameter types for API handlers.

use hostel_core::pagination::Pagination;
use serde::Deserialize;

/// Query parameters for `GET /complaints`.
#[derive(Debug, Default, Deserialize)]
pub struct ComplaintListParams {
    pub status: Option<String>,
    pub search: Option<String>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(default, alias = "includeDeleted")]
    pub include_deleted: bool,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ComplaintListParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_query(self.page, self.limit)
    }
}

/// Query parameters for `GET /complaints/check-duplicate`.
#[derive(Debug, Deserialize)]
pub struct DuplicateCheckParams {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}
