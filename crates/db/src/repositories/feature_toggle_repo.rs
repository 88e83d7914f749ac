//! Repository for the `feature_toggles` table.

use sqlx::PgPool;

use crate::models::feature_toggle::FeatureToggle;

const COLUMNS: &str = "id, key, name, description, enabled, updated_at";

pub struct FeatureToggleRepo;

impl FeatureToggleRepo {
    /// All toggles ordered by key.
    pub async fn list(pool: &PgPool) -> Result<Vec<FeatureToggle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feature_toggles ORDER BY key");
        sqlx::query_as::<_, FeatureToggle>(&query).fetch_all(pool).await
    }

    pub async fn find_by_key(
        pool: &PgPool,
        key: &str,
    ) -> Result<Option<FeatureToggle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feature_toggles WHERE key = $1");
        sqlx::query_as::<_, FeatureToggle>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Set the enabled flag. Returns `None` if no toggle has this key.
    pub async fn set_enabled(
        pool: &PgPool,
        key: &str,
        enabled: bool,
    ) -> Result<Option<FeatureToggle>, sqlx::Error> {
        let query = format!(
            "UPDATE feature_toggles SET enabled = $2, updated_at = NOW()
             WHERE key = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeatureToggle>(&query)
            .bind(key)
            .bind(enabled)
            .fetch_optional(pool)
            .await
    }
}
