//! Pose module - landmark frames, gating and joint geometry
//!
//! Re-exports only. All logic in submodules.

mod angles;
mod confidence_gate;
mod landmarks;
mod one_euro;

pub use angles::{calculate_angle, Hinge};
pub use confidence_gate::{ConfidenceGate, DEFAULT_MIN_VISIBILITY};
pub use landmarks::{
    BodyPart, Joint, Landmark, PoseFrame, PoseView, Side, FLAT_XYZV_LEN, FLAT_XYZ_LEN,
    LANDMARK_COUNT,
};
pub use one_euro::{OneEuroFilter, SmoothingConfig};
