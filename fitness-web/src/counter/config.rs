//! Session configuration

use serde::{Deserialize, Serialize};

use super::exercise::{ExerciseConfig, ExerciseKind};
use crate::error::{ConfigError, Result};
use crate::pose::{SmoothingConfig, DEFAULT_MIN_VISIBILITY};

/// Settings for one rep-counting session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Exercise definition
    pub exercise: ExerciseConfig,
    /// Landmarks below this visibility count as missing
    #[serde(default = "default_min_visibility")]
    pub min_visibility: f32,
    /// One-Euro angle smoothing, off when absent
    #[serde(default)]
    pub smoothing: Option<SmoothingConfig>,
}

fn default_min_visibility() -> f32 {
    DEFAULT_MIN_VISIBILITY
}

impl SessionConfig {
    pub fn preset(kind: ExerciseKind) -> Self {
        Self {
            exercise: kind.config(),
            min_visibility: DEFAULT_MIN_VISIBILITY,
            smoothing: None,
        }
    }

    pub fn with_smoothing(mut self, smoothing: SmoothingConfig) -> Self {
        self.smoothing = Some(smoothing);
        self
    }

    /// Parse and validate a JSON session config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_visibility) {
            return Err(ConfigError::Visibility(self.min_visibility));
        }
        if let Some(smoothing) = self.smoothing {
            let valid = smoothing.min_cutoff.is_finite()
                && smoothing.beta.is_finite()
                && smoothing.min_cutoff > 0.0
                && smoothing.beta >= 0.0;
            if !valid {
                return Err(ConfigError::Smoothing);
            }
        }
        self.exercise.validate()
    }
}

impl From<ExerciseKind> for SessionConfig {
    fn from(kind: ExerciseKind) -> Self {
        Self::preset(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoachError;

    #[test]
    fn test_defaults_fill_in() {
        let exercise = serde_json::to_string(&ExerciseKind::Squats.config()).unwrap();
        let json = format!(r#"{{"exercise": {exercise}}}"#);

        let config = SessionConfig::from_json(&json).unwrap();
        assert_eq!(config.min_visibility, DEFAULT_MIN_VISIBILITY);
        assert!(config.smoothing.is_none());
        assert_eq!(config, SessionConfig::preset(ExerciseKind::Squats));
    }

    #[test]
    fn test_round_trip_with_smoothing() {
        let config =
            SessionConfig::preset(ExerciseKind::Lunges).with_smoothing(SmoothingConfig::default());
        let parsed = SessionConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_invalid() {
        let mut config = SessionConfig::preset(ExerciseKind::Pushups);
        config.min_visibility = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::Visibility(1.5)));

        let config = SessionConfig::preset(ExerciseKind::Pushups).with_smoothing(SmoothingConfig {
            min_cutoff: 0.0,
            beta: 0.01,
        });
        assert_eq!(config.validate(), Err(ConfigError::Smoothing));
    }

    #[test]
    fn test_from_json_surfaces_errors() {
        assert!(matches!(
            SessionConfig::from_json("{not json"),
            Err(CoachError::Json(_))
        ));

        let mut config = SessionConfig::preset(ExerciseKind::BicepCurl);
        config.exercise.limbs[0].extended = 40.0;
        let json = config.to_json().unwrap();
        assert!(matches!(
            SessionConfig::from_json(&json),
            Err(CoachError::Config(ConfigError::ThresholdOrder { .. }))
        ));
    }
}
