use async_trait::async_trait;
use hostel_core::duplicate_detection::{
    DuplicateCandidate, DuplicateDetector, DuplicateLookup, SubstringHeuristic,
};
use hostel_core::error::CoreError;
use hostel_db::repositories::ComplaintRepo;
use hostel_db::DbPool;

use super::store_error;

/// Production duplicate detector.
///
/// PostgreSQL narrows the search to the student's live complaints inside the
/// lookup window; [`SubstringHeuristic`] picks the matches from those rows.
pub struct PgDuplicateDetector {
    pool: DbPool,
}

impl PgDuplicateDetector {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DuplicateDetector for PgDuplicateDetector {
    async fn find_similar(
        &self,
        lookup: &DuplicateLookup,
    ) -> Result<Vec<DuplicateCandidate>, CoreError> {
        let heuristic = SubstringHeuristic::for_lookup(lookup)?;
        let recent = ComplaintRepo::recent_for_student(&self.pool, lookup.student_id, lookup.since)
            .await
            .map_err(|e| store_error("duplicate lookup", e))?;
        Ok(heuristic.select(recent, lookup.limit))
    }
}
