//! Hostel complaint tracker domain layer.
//!
//! Pure domain logic with no database or HTTP access: closed enumerations and
//! input validation, the complaint lifecycle state machine, version snapshots,
//! the duplicate-detection heuristic, and the traits the API layer injects
//! (feature gate, duplicate detector, blob store).

#[macro_use]
mod macros;

pub mod analytics;
pub mod complaint;
pub mod duplicate_detection;
pub mod error;
pub mod feature_toggle;
pub mod lifecycle;
pub mod outbox;
pub mod pagination;
pub mod roles;
pub mod storage;
pub mod types;
pub mod versioning;
