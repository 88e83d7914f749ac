//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` (or plain) create DTO for inserts
//! - Update DTOs with `Option` fields where the table supports patches

pub mod analytics;
pub mod complaint;
pub mod complaint_version;
pub mod feature_toggle;
pub mod notification;
pub mod user;
