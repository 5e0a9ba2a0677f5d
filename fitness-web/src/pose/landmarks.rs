//! Landmark frames and gated pose views
//!
//! Receives MediaPipe Pose landmarks (33 per frame) and resolves the
//! subset the rep counter needs into plain 2D points.

use serde::{Deserialize, Serialize};

use super::angles::{calculate_angle, Hinge};
use super::confidence_gate::ConfidenceGate;
use crate::error::FrameError;

// ============================================================================
// LANDMARK LAYOUT (MediaPipe Pose - 33 total)
// ============================================================================

/// Number of landmarks in one MediaPipe Pose frame
pub const LANDMARK_COUNT: usize = 33;

/// Flat buffer length for x, y, z per landmark
pub const FLAT_XYZ_LEN: usize = LANDMARK_COUNT * 3;

/// Flat buffer length for x, y, z, visibility per landmark
pub const FLAT_XYZV_LEN: usize = LANDMARK_COUNT * 4;

/// Named pose landmark, discriminant is the MediaPipe index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl Joint {
    /// Index into the MediaPipe landmark array
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Body side as seen by the pose model (the subject's own left/right)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn name(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Side-agnostic body part; combine with a [`Side`] to get a [`Joint`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Shoulder,
    Elbow,
    Wrist,
    Hip,
    Knee,
    Ankle,
}

impl BodyPart {
    pub fn joint(self, side: Side) -> Joint {
        match (self, side) {
            (BodyPart::Shoulder, Side::Left) => Joint::LeftShoulder,
            (BodyPart::Shoulder, Side::Right) => Joint::RightShoulder,
            (BodyPart::Elbow, Side::Left) => Joint::LeftElbow,
            (BodyPart::Elbow, Side::Right) => Joint::RightElbow,
            (BodyPart::Wrist, Side::Left) => Joint::LeftWrist,
            (BodyPart::Wrist, Side::Right) => Joint::RightWrist,
            (BodyPart::Hip, Side::Left) => Joint::LeftHip,
            (BodyPart::Hip, Side::Right) => Joint::RightHip,
            (BodyPart::Knee, Side::Left) => Joint::LeftKnee,
            (BodyPart::Knee, Side::Right) => Joint::RightKnee,
            (BodyPart::Ankle, Side::Left) => Joint::LeftAnkle,
            (BodyPart::Ankle, Side::Right) => Joint::RightAnkle,
        }
    }
}

// ============================================================================
// FRAME DATA
// ============================================================================

/// A single landmark (normalized image coordinates)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,          // 0-1 normalized
    pub y: f32,          // 0-1 normalized, grows downward
    pub z: f32,          // Relative depth
    pub visibility: f32, // 0-1 model confidence
}

impl Landmark {
    /// Fully visible landmark at (x, y)
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: 1.0,
        }
    }
}

/// One frame of pose output; `None` marks a landmark the model did not report
#[derive(Clone, Debug)]
pub struct PoseFrame {
    landmarks: [Option<Landmark>; LANDMARK_COUNT],
    /// Capture time in seconds
    pub timestamp: f64,
}

impl PoseFrame {
    /// Frame with no landmarks (detection lost)
    pub fn empty(timestamp: f64) -> Self {
        Self {
            landmarks: [None; LANDMARK_COUNT],
            timestamp,
        }
    }

    /// Parse the flat Float32Array layout handed over from JavaScript.
    ///
    /// Accepts 99 values (x, y, z per landmark, treated as fully visible)
    /// or 132 values (x, y, z, visibility per landmark).
    pub fn from_flat(data: &[f32], timestamp: f64) -> Result<Self, FrameError> {
        let stride = match data.len() {
            FLAT_XYZ_LEN => 3,
            FLAT_XYZV_LEN => 4,
            len => return Err(FrameError::Length(len)),
        };

        let mut frame = Self::empty(timestamp);
        for (slot, chunk) in frame.landmarks.iter_mut().zip(data.chunks_exact(stride)) {
            *slot = Some(Landmark {
                x: chunk[0],
                y: chunk[1],
                z: chunk[2],
                visibility: if stride == 4 { chunk[3] } else { 1.0 },
            });
        }
        Ok(frame)
    }

    pub fn set(&mut self, joint: Joint, landmark: Landmark) {
        self.landmarks[joint.index()] = Some(landmark);
    }

    pub fn with(mut self, joint: Joint, landmark: Landmark) -> Self {
        self.set(joint, landmark);
        self
    }

    pub fn remove(&mut self, joint: Joint) {
        self.landmarks[joint.index()] = None;
    }

    pub fn landmark(&self, joint: Joint) -> Option<Landmark> {
        self.landmarks[joint.index()]
    }
}

// ============================================================================
// GATED VIEW
// ============================================================================

/// Points that passed the confidence gate for one frame
#[derive(Clone, Debug)]
pub struct PoseView {
    points: [Option<(f32, f32)>; LANDMARK_COUNT],
}

impl PoseView {
    /// Gate every landmark; `None` if any of `required` did not survive
    pub fn resolve(frame: &PoseFrame, gate: &ConfidenceGate, required: &[Joint]) -> Option<Self> {
        let mut points = [None; LANDMARK_COUNT];
        for (point, landmark) in points.iter_mut().zip(frame.landmarks.iter()) {
            *point = landmark
                .filter(|lm| gate.accepts(lm))
                .map(|lm| (lm.x, lm.y));
        }

        if required.iter().any(|joint| points[joint.index()].is_none()) {
            return None;
        }
        Some(Self { points })
    }

    pub fn point(&self, joint: Joint) -> Option<(f32, f32)> {
        self.points[joint.index()]
    }

    pub fn part(&self, part: BodyPart, side: Side) -> Option<(f32, f32)> {
        self.point(part.joint(side))
    }

    /// Angle at the hinge vertex in degrees
    pub fn hinge_angle(&self, side: Side, hinge: Hinge) -> Option<f32> {
        let [a, b, c] = hinge.joints(side);
        Some(calculate_angle(self.point(a)?, self.point(b)?, self.point(c)?))
    }

    /// Mean shoulder height
    pub fn shoulder_line(&self) -> Option<f32> {
        let left = self.point(Joint::LeftShoulder)?;
        let right = self.point(Joint::RightShoulder)?;
        Some((left.1 + right.1) / 2.0)
    }
}
