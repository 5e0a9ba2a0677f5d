//! Confidence Gate - drops landmarks the pose model is unsure about
//!
//! A landmark below the visibility threshold is treated as missing, so a
//! half-occluded limb skips the frame instead of producing a wild angle.

/// MediaPipe's default detection confidence
pub const DEFAULT_MIN_VISIBILITY: f32 = 0.5;

/// Visibility gate shared by every joint of a session
#[derive(Clone, Debug)]
pub struct ConfidenceGate {
    /// Minimum visibility to accept a landmark
    threshold: f32,
}

impl ConfidenceGate {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_MIN_VISIBILITY,
        }
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Visible enough and finite
    pub fn accepts(&self, landmark: &super::Landmark) -> bool {
        landmark.visibility >= self.threshold && landmark.x.is_finite() && landmark.y.is_finite()
    }
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::new()
    }
}
