//! Complaint lifecycle engine.
//!
//! Wires the pure rules in `hostel_core::lifecycle` to PostgreSQL: each
//! tracked mutation runs lock, conditional write and version insert in one
//! transaction, and every data-store call is bounded by [`StoreTimeout`].
//! Side effects come back as an [`Outbox`](hostel_core::outbox::Outbox)
//! for the notification dispatcher to drain.

pub mod duplicates;
pub mod lifecycle;
pub mod toggles;

use std::future::Future;
use std::time::Duration;

use futures::TryFutureExt;
use hostel_core::error::CoreError;

pub use duplicates::PgDuplicateDetector;
pub use lifecycle::{ComplaintLifecycle, Outcome};
pub use toggles::CachedFeatureGate;

/// Upper bound applied to a single data-store call.
#[derive(Debug, Clone, Copy)]
pub struct StoreTimeout(pub Duration);

impl StoreTimeout {
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    /// Run `fut`, failing with [`CoreError::Storage`] if it does not finish in time.
    pub async fn run<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, CoreError> {
        tokio::time::timeout(self.0, fut).await.map_err(|_| {
            tracing::error!(
                op,
                timeout_ms = self.0.as_millis() as u64,
                "Data store call timed out"
            );
            CoreError::Storage(format!("{op} timed out"))
        })?
    }

    /// [`run`](Self::run) for sqlx futures, classifying the database error.
    pub async fn sql<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, CoreError> {
        self.run(op, fut.map_err(move |e| store_error(op, e))).await
    }
}

/// Map a sqlx error to a domain error.
///
/// Unique violations become conflicts; everything else is a storage failure.
pub fn store_error(op: &'static str, err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return CoreError::Conflict(format!(
                "Concurrent update detected during {op}, please retry"
            ));
        }
    }
    tracing::error!(op, error = %err, "Data store call failed");
    CoreError::Storage(format!("{op} failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn slow_call_becomes_storage_error() {
        let guard = StoreTimeout(Duration::from_millis(10));
        let result: Result<(), CoreError> = guard
            .run("slow op", async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            })
            .await;
        assert_matches!(result, Err(CoreError::Storage(msg)) if msg.contains("slow op"));
    }

    #[tokio::test]
    async fn fast_call_passes_through() {
        let guard = StoreTimeout::from_secs(1);
        let value = guard.run("fast op", async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn sqlx_errors_map_to_storage() {
        let guard = StoreTimeout::from_secs(1);
        let result: Result<(), CoreError> = guard
            .sql("lookup", async { Err(sqlx::Error::PoolTimedOut) })
            .await;
        assert_matches!(result, Err(CoreError::Storage(_)));
    }
}
