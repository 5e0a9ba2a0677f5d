//! Joint angle calculation using the atan2 difference
//!
//! Measures the angle at a vertex joint between the vectors to its two
//! neighbours. Unlike the dot-product/acos form this stays well
//! conditioned near 0° and 180°, which is exactly where rep thresholds sit.

use serde::{Deserialize, Serialize};

use super::landmarks::{BodyPart, Joint, Side};

/// Calculate the unsigned angle at `b` between `b→a` and `b→c`, in degrees
///
/// Returns a value in [0, 180]:
/// - 180° = a, b, c collinear with b in the middle (limb straight)
/// - small = limb folded back on itself
pub fn calculate_angle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> f32 {
    let radians = (c.1 - b.1).atan2(c.0 - b.0) - (a.1 - b.1).atan2(a.0 - b.0);
    let angle = radians.to_degrees().abs();

    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Hinge joints the exercises track
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hinge {
    /// shoulder → elbow → wrist
    Elbow,
    /// hip → knee → ankle
    Knee,
}

impl Hinge {
    /// Body parts as (proximal, vertex, distal)
    pub fn parts(self) -> [BodyPart; 3] {
        match self {
            Hinge::Elbow => [BodyPart::Shoulder, BodyPart::Elbow, BodyPart::Wrist],
            Hinge::Knee => [BodyPart::Hip, BodyPart::Knee, BodyPart::Ankle],
        }
    }

    pub fn joints(self, side: Side) -> [Joint; 3] {
        self.parts().map(|part| part.joint(side))
    }

    pub fn vertex(self, side: Side) -> Joint {
        self.parts()[1].joint(side)
    }
}
