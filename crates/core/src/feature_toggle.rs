//! Process-wide boolean switches.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::CoreError;

/// Gates duplicate detection on complaint submission.
pub const TOGGLE_DUPLICATE_DETECTION: &str = "duplicate_detection";

pub const TOGGLE_KEY_MAX_CHARS: usize = 64;

/// Answers whether a named feature is switched on.
///
/// Keys without a stored toggle are reported as enabled.
#[async_trait]
pub trait FeatureGate: Send + Sync {
    async fn is_enabled(&self, key: &str) -> Result<bool, CoreError>;
}

/// Toggle keys are lowercase snake_case identifiers.
pub fn validate_toggle_key(key: &str) -> Result<(), CoreError> {
    let valid = !key.is_empty()
        && key.len() <= TOGGLE_KEY_MAX_CHARS
        && key.starts_with(|c: char| c.is_ascii_lowercase())
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !valid {
        return Err(CoreError::Validation(format!(
            "Invalid feature toggle key '{key}'"
        )));
    }
    Ok(())
}

/// Fixed in-memory gate. Tests use it to drive the lifecycle engine without
/// the toggle table.
#[derive(Debug, Default)]
pub struct StaticFeatureGate {
    toggles: RwLock<HashMap<String, bool>>,
}

impl StaticFeatureGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, enabled: bool) -> Self {
        self.set(key, enabled);
        self
    }

    pub fn set(&self, key: &str, enabled: bool) {
        if let Ok(mut toggles) = self.toggles.write() {
            toggles.insert(key.to_string(), enabled);
        }
    }
}

#[async_trait]
impl FeatureGate for StaticFeatureGate {
    async fn is_enabled(&self, key: &str) -> Result<bool, CoreError> {
        let toggles = self
            .toggles
            .read()
            .map_err(|_| CoreError::Internal("feature toggle lock poisoned".into()))?;
        Ok(toggles.get(key).copied().unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_is_enabled() {
        let gate = StaticFeatureGate::new();
        assert!(gate.is_enabled("anything").await.unwrap());
    }

    #[tokio::test]
    async fn stored_value_wins() {
        let gate = StaticFeatureGate::new().with(TOGGLE_DUPLICATE_DETECTION, false);
        assert!(!gate.is_enabled(TOGGLE_DUPLICATE_DETECTION).await.unwrap());
        gate.set(TOGGLE_DUPLICATE_DETECTION, true);
        assert!(gate.is_enabled(TOGGLE_DUPLICATE_DETECTION).await.unwrap());
    }

    #[test]
    fn toggle_key_format() {
        assert!(validate_toggle_key("duplicate_detection").is_ok());
        assert!(validate_toggle_key("v2_search").is_ok());
        assert!(validate_toggle_key("").is_err());
        assert!(validate_toggle_key("Bad-Key").is_err());
        assert!(validate_toggle_key("9lives").is_err());
    }
}
