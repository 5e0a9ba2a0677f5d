//! Error types
//!
//! Lost tracking is routine and never an error; these only cover bad
//! configuration and malformed input from the JS side.

use thiserror::Error;

use crate::counter::SuppressionPolicy;

/// Rejected exercise or session configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("exercise '{name}' must track one or two limbs, got {count}")]
    LimbCount { name: String, count: usize },

    #[error("limb '{label}' has no hinges")]
    NoHinges { label: String },

    #[error("limb '{label}': thresholds must be finite angles in [0, 180]")]
    ThresholdRange { label: String },

    #[error("limb '{label}': flexed threshold {flexed} must be below extended threshold {extended}")]
    ThresholdOrder {
        label: String,
        flexed: f32,
        extended: f32,
    },

    #[error("limb '{label}': extended stage must be up or down")]
    ExtendedStage { label: String },

    #[error("suppression policy {0:?} needs exactly two limbs")]
    SuppressionNeedsTwoLimbs(SuppressionPolicy),

    #[error("form rule '{0}' has no conditions")]
    EmptyRule(String),

    #[error("check threshold {0} is not finite")]
    NonFiniteCheck(f32),

    #[error("min visibility {0} outside [0, 1]")]
    Visibility(f32),

    #[error("smoothing min_cutoff and beta must be finite, min_cutoff > 0 and beta >= 0")]
    Smoothing,
}

/// Malformed landmark buffer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("invalid landmark data length: {0} (expected 99 or 132)")]
    Length(usize),
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum CoachError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown exercise: {0}")]
    UnknownExercise(String),
}

pub type Result<T> = std::result::Result<T, CoachError>;
