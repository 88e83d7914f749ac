//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! `&PgPool` (or an open transaction) as the first argument.

pub mod analytics_repo;
pub mod complaint_repo;
pub mod complaint_version_repo;
pub mod feature_toggle_repo;
pub mod notification_repo;
pub mod user_repo;

pub use analytics_repo::AnalyticsRepo;
pub use complaint_repo::ComplaintRepo;
pub use complaint_version_repo::ComplaintVersionRepo;
pub use feature_toggle_repo::FeatureToggleRepo;
pub use notification_repo::NotificationRepo;
pub use user_repo::UserRepo;

/// Open Postgres transaction handed to repository methods.
pub type PgTx<'c> = sqlx::Transaction<'c, sqlx::Postgres>;
