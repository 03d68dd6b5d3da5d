use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};

/// Settings for an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Undo entries kept before the oldest is evicted.
    pub max_history: usize,
    /// How close, in pixels, an entity's center must be to a slot's center
    /// to count as occupying it.
    pub occupant_threshold_px: f64,
    /// A drop snaps when the nearest slot's center is closer than
    /// `slot width × snap_ratio`.
    pub snap_ratio: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_history: cg_history::DEFAULT_MAX_HISTORY,
            occupant_threshold_px: 10.0,
            snap_ratio: 0.5,
        }
    }
}

impl SessionConfig {
    /// Set the undo bound.
    pub fn with_max_history(mut self, max: usize) -> Self {
        self.max_history = max;
        self
    }

    /// Set the occupant search radius.
    pub fn with_occupant_threshold(mut self, px: f64) -> Self {
        self.occupant_threshold_px = px;
        self
    }

    /// Set the snap radius as a fraction of slot width.
    pub fn with_snap_ratio(mut self, ratio: f64) -> Self {
        self.snap_ratio = ratio;
        self
    }

    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(body: &str) -> LayoutResult<Self> {
        serde_json::from_str(body).map_err(LayoutError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = SessionConfig::default();
        assert_eq!(config.max_history, 100);
        assert!((config.occupant_threshold_px - 10.0).abs() < f64::EPSILON);
        assert!((config.snap_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn config_builder_chain() {
        let config = SessionConfig::default()
            .with_max_history(5)
            .with_occupant_threshold(2.5)
            .with_snap_ratio(0.25);
        assert_eq!(config.max_history, 5);
        assert!((config.occupant_threshold_px - 2.5).abs() < f64::EPSILON);
        assert!((config.snap_ratio - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SessionConfig::from_json(r#"{"max_history": 3}"#).unwrap();
        assert_eq!(config.max_history, 3);
        assert!((config.snap_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = SessionConfig::from_json(r#"{"snap": 1}"#).unwrap_err();
        assert!(matches!(err, LayoutError::Config(_)));
    }
}
