//! Duplicate complaint detection.
//!
//! A [`DuplicateLookup`] captures the normalised fragments of a submission and
//! the look-back window dictated by a [`DuplicatePolicy`]. Implementations of
//! [`DuplicateDetector`] load a student's recent, non-deleted history and
//! keep the complaints [`SubstringHeuristic`] accepts.
//!
//! Two titles overlap when either normalised title contains the other's
//! fragment, so "Leaking tap in room 204 again" still matches an earlier
//! "Leaking tap in room 204".

use async_trait::async_trait;
use chrono::Duration;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::complaint::ComplaintStatus;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Window, fragment sizes and result cap for one kind of duplicate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicatePolicy {
    pub window_days: i64,
    pub title_prefix_chars: usize,
    /// Characters of the trimmed description considered before truncation.
    pub description_scan_chars: usize,
    pub description_prefix_chars: usize,
    /// Whether the description fragment is lowercased.
    pub lowercase_description: bool,
    pub limit: i64,
}

/// Blocking check run on submission while the toggle is on.
pub const SUBMISSION_POLICY: DuplicatePolicy = DuplicatePolicy {
    window_days: 7,
    title_prefix_chars: 30,
    description_scan_chars: 200,
    description_prefix_chars: 50,
    lowercase_description: true,
    limit: 3,
};

/// Advisory check behind `check-duplicate`; never blocks.
pub const PREVIEW_POLICY: DuplicatePolicy = DuplicatePolicy {
    window_days: 14,
    title_prefix_chars: 40,
    description_scan_chars: 80,
    description_prefix_chars: 80,
    lowercase_description: false,
    limit: 5,
};

/// Trim, lowercase and collapse internal whitespace runs to a single space.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn take_chars(value: &str, n: usize) -> String {
    value.chars().take(n).collect()
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateLookup {
    pub student_id: DbId,
    /// Full normalised title of the submission.
    pub normalized_title: String,
    pub title_fragment: String,
    pub description_fragment: String,
    /// Only complaints created at or after this instant are considered.
    pub since: Timestamp,
    pub limit: i64,
}

impl DuplicateLookup {
    pub fn new(
        student_id: DbId,
        title: &str,
        description: &str,
        policy: &DuplicatePolicy,
        now: Timestamp,
    ) -> Self {
        let normalized_title = normalize_title(title);
        let title_fragment = take_chars(&normalized_title, policy.title_prefix_chars);

        let trimmed = description.trim();
        let scanned = if policy.lowercase_description {
            take_chars(&trimmed.to_lowercase(), policy.description_scan_chars)
        } else {
            take_chars(trimmed, policy.description_scan_chars)
        };
        let description_fragment = take_chars(&scanned, policy.description_prefix_chars);

        Self {
            student_id,
            normalized_title,
            title_fragment,
            description_fragment,
            since: now - Duration::days(policy.window_days),
            limit: policy.limit,
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateCandidate {
    pub id: DbId,
    pub title: String,
    pub status: ComplaintStatus,
    pub created_at: Timestamp,
}

/// Payload of a blocked submission: the newest match plus every candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateConflict {
    pub possible_duplicate_id: DbId,
    pub similar_complaints: Vec<DuplicateCandidate>,
}

impl DuplicateConflict {
    /// Build a conflict from newest-first candidates, or `None` if there are none.
    pub fn from_candidates(candidates: Vec<DuplicateCandidate>) -> Option<Self> {
        let newest = candidates.first()?.id;
        Some(Self {
            possible_duplicate_id: newest,
            similar_complaints: candidates,
        })
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Case-insensitive literal substring match on title or description.
///
/// A stored complaint matches when its title contains the lookup's title
/// fragment, when the submitted title contains its whole normalised title, or
/// when its description contains the lookup's description fragment. Empty
/// fragments never match.
#[derive(Debug, Clone)]
pub struct SubstringHeuristic {
    title: Option<Regex>,
    description: Option<Regex>,
    submitted_title: String,
}

impl SubstringHeuristic {
    pub fn for_lookup(lookup: &DuplicateLookup) -> Result<Self, CoreError> {
        Ok(Self {
            title: Self::compile(&lookup.title_fragment)?,
            description: Self::compile(&lookup.description_fragment)?,
            submitted_title: lookup.normalized_title.clone(),
        })
    }

    fn compile(fragment: &str) -> Result<Option<Regex>, CoreError> {
        if fragment.is_empty() {
            return Ok(None);
        }
        RegexBuilder::new(&regex::escape(fragment))
            .case_insensitive(true)
            .build()
            .map(Some)
            .map_err(|e| CoreError::Internal(format!("Invalid duplicate pattern: {e}")))
    }

    pub fn matches(&self, title: &str, description: &str) -> bool {
        self.title.as_ref().is_some_and(|re| re.is_match(title))
            || self.stored_title_within_submission(title)
            || self
                .description
                .as_ref()
                .is_some_and(|re| re.is_match(description))
    }

    fn stored_title_within_submission(&self, title: &str) -> bool {
        let stored = normalize_title(title);
        !stored.is_empty() && self.submitted_title.contains(&stored)
    }

    /// Keep the entries of newest-first `history` that match, up to `limit`.
    pub fn select<T: HistoryEntry>(&self, history: Vec<T>, limit: i64) -> Vec<DuplicateCandidate> {
        history
            .into_iter()
            .filter(|entry| self.matches(entry.title(), entry.description()))
            .take(usize::try_from(limit).unwrap_or(0))
            .map(HistoryEntry::into_candidate)
            .collect()
    }
}

/// A stored complaint the heuristic can inspect.
pub trait HistoryEntry {
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn into_candidate(self) -> DuplicateCandidate;
}

/// Escape `%`, `_` and `\` so a fragment can be used inside an `ILIKE` pattern.
pub fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// ---------------------------------------------------------------------------
// Detector seam
// ---------------------------------------------------------------------------

/// Searches a student's recent history for likely duplicates.
///
/// The PostgreSQL detector in the API crate is the production strategy.
#[async_trait]
pub trait DuplicateDetector: Send + Sync {
    /// Matches for `lookup`, newest first, at most `lookup.limit` of them.
    async fn find_similar(&self, lookup: &DuplicateLookup)
        -> Result<Vec<DuplicateCandidate>, CoreError>;
}
