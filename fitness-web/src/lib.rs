//! Fitness Web - pose-driven exercise rep counter
//!
//! MediaPipe Pose runs in JavaScript and hands landmarks to this module
//! every frame. Rust computes joint angles, advances the per-exercise rep
//! state machine and returns counts, form feedback and spoken cue lines.
//! Drawing and speech stay on the JS side.
//!
//! Entry point only contains:
//! - Module declarations
//! - The wasm_bindgen start hook

mod bridge;
pub mod counter;
pub mod error;
pub mod pose;

use wasm_bindgen::prelude::*;

// Re-export wasm_bindgen items for JS access
pub use bridge::{countdown_cues, exercise_names, CoachSession};

pub use counter::{ExerciseKind, FrameReport, RepSession, SessionConfig};
pub use error::{CoachError, ConfigError, FrameError};
pub use pose::{Joint, Landmark, PoseFrame};

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    bridge::init_logging(log::LevelFilter::Info);
}

/// Raise or lower console verbosity ("error", "warn", "info", "debug", "trace")
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    match level.parse::<log::LevelFilter>() {
        Ok(filter) => log::set_max_level(filter),
        Err(_) => log::warn!("unknown log level: {}", level),
    }
}
