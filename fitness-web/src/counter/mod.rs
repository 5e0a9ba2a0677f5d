//! Counter module - data-driven rep state machine
//!
//! Re-exports only. All logic in submodules.

mod config;
mod cues;
mod exercise;
mod form;
mod session;
mod stage;

pub use config::SessionConfig;
pub use cues::{countdown, COUNTDOWN_SECONDS, STARTING_NOW};
pub use exercise::{ExerciseConfig, ExerciseKind, HingeRef, LimbConfig, SuppressionPolicy};
pub use form::{Check, FormRule, Predicate, Quantifier};
pub use session::{
    FrameReport, FrameStatus, HingeReading, LimbSnapshot, RepEvent, RepSession, SessionSnapshot,
};
pub use stage::{LimbTracker, Stage, Transition};
