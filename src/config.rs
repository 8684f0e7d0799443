//! Pipeline configuration

use crate::categorize::BoundaryPolicy;
use crate::error::DaylineError;
use crate::window::DEFAULT_WINDOW_DAYS;
use serde::{Deserialize, Serialize};

/// Settings for dataset assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Window length in days for the averages dataset
    pub window_days: u32,
    /// Edge handling for categorization
    pub boundary_policy: BoundaryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            boundary_policy: BoundaryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_window_days(window_days: u32) -> Self {
        Self {
            window_days,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), DaylineError> {
        if self.window_days == 0 {
            return Err(DaylineError::InvalidWindow(self.window_days));
        }
        Ok(())
    }

    /// Load configuration from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, DaylineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, DaylineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.window_days, 7);
        assert_eq!(config.boundary_policy, BoundaryPolicy::SourceCompatible);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PipelineConfig::from_json(r#"{"window_days": 14}"#).unwrap();
        assert_eq!(config.window_days, 14);
        assert_eq!(config.boundary_policy, BoundaryPolicy::SourceCompatible);

        let config =
            PipelineConfig::from_json(r#"{"boundary_policy": "inclusive_typical"}"#).unwrap();
        assert_eq!(config.window_days, 7);
        assert_eq!(config.boundary_policy, BoundaryPolicy::InclusiveTypical);
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = PipelineConfig::from_json(r#"{"window_days": 0}"#);
        assert!(matches!(result, Err(DaylineError::InvalidWindow(0))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = PipelineConfig::with_window_days(3);
        let loaded = PipelineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            PipelineConfig::from_json("not json"),
            Err(DaylineError::JsonError(_))
        ));
    }
}
