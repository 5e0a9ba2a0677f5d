//! Exercise definitions
//!
//! Every exercise is data: which hinges make up each tracked limb, the two
//! stage thresholds, how the two sides interact, an optional stage gate and
//! the form rules. The rep state machine never branches on exercise kind.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::form::{Check, FormRule, Predicate};
use super::stage::Stage;
use crate::error::{CoachError, ConfigError};
use crate::pose::{BodyPart, Hinge, Joint, Side};

/// Built-in exercises
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Pushups,
    Squats,
    BicepCurl,
    Lunges,
    OverheadPress,
}

impl ExerciseKind {
    /// Menu order, matches keys '1'..='5'
    pub const ALL: [ExerciseKind; 5] = [
        ExerciseKind::Pushups,
        ExerciseKind::Squats,
        ExerciseKind::BicepCurl,
        ExerciseKind::Lunges,
        ExerciseKind::OverheadPress,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExerciseKind::Pushups => "pushups",
            ExerciseKind::Squats => "squats",
            ExerciseKind::BicepCurl => "bicep curl",
            ExerciseKind::Lunges => "lunges",
            ExerciseKind::OverheadPress => "overhead dumbbell press",
        }
    }

    /// Intro-screen key binding
    pub fn from_menu_key(key: char) -> Option<Self> {
        let index = key.to_digit(10)?.checked_sub(1)?;
        Self::ALL.get(index as usize).copied()
    }

    /// Preset configuration
    pub fn config(&self) -> ExerciseConfig {
        match self {
            ExerciseKind::Pushups => pushups(),
            ExerciseKind::Squats => squats(),
            ExerciseKind::BicepCurl => bicep_curl(),
            ExerciseKind::Lunges => lunges(),
            ExerciseKind::OverheadPress => overhead_press(),
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExerciseKind {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "pushups" | "pushup" | "push ups" | "push up" => Ok(ExerciseKind::Pushups),
            "squats" | "squat" => Ok(ExerciseKind::Squats),
            "bicep curl" | "bicep curls" | "curl" | "curls" => Ok(ExerciseKind::BicepCurl),
            "lunges" | "lunge" => Ok(ExerciseKind::Lunges),
            "overhead dumbbell press" | "overhead press" | "press" => {
                Ok(ExerciseKind::OverheadPress)
            }
            _ => Err(CoachError::UnknownExercise(s.to_string())),
        }
    }
}

/// How a bilateral exercise arbitrates reps between its two limbs.
///
/// The first limb is primary, the second secondary. Suppression is one-way:
/// the primary limb is never suppressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionPolicy {
    /// Each limb counts on its own
    #[default]
    Independent,
    /// Drop a secondary rep while the primary limb is in its flexed stage
    SuppressWhilePrimaryFlexed,
    /// Drop a secondary rep only if the primary completed one this frame
    SuppressOnSimultaneous,
}

/// One hinge on one side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HingeRef {
    pub side: Side,
    pub hinge: Hinge,
}

impl HingeRef {
    pub fn new(side: Side, hinge: Hinge) -> Self {
        Self { side, hinge }
    }

    pub fn joints(&self) -> [Joint; 3] {
        self.hinge.joints(self.side)
    }
}

/// A tracked limb: one stage, one counter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LimbConfig {
    pub label: String,
    pub hinges: Vec<HingeRef>,
    /// Degrees; at or above means extended
    pub extended: f32,
    /// Degrees; at or below means flexed
    pub flexed: f32,
    /// Stage label of the extended posture
    pub extended_stage: Stage,
    /// Spoken when this limb completes a rep
    pub cue: String,
}

impl LimbConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hinges.is_empty() {
            return Err(ConfigError::NoHinges {
                label: self.label.clone(),
            });
        }
        let in_range = |v: f32| v.is_finite() && (0.0..=180.0).contains(&v);
        if !in_range(self.extended) || !in_range(self.flexed) {
            return Err(ConfigError::ThresholdRange {
                label: self.label.clone(),
            });
        }
        if self.flexed >= self.extended {
            return Err(ConfigError::ThresholdOrder {
                label: self.label.clone(),
                flexed: self.flexed,
                extended: self.extended,
            });
        }
        if self.extended_stage == Stage::Unknown {
            return Err(ConfigError::ExtendedStage {
                label: self.label.clone(),
            });
        }
        Ok(())
    }
}

/// Everything the rep state machine needs to know about an exercise
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseConfig {
    pub name: String,
    pub limbs: Vec<LimbConfig>,
    #[serde(default)]
    pub suppression: SuppressionPolicy,
    /// Stages reset to unknown on frames where these do not all hold
    #[serde(default)]
    pub stage_gate: Vec<Predicate>,
    #[serde(default)]
    pub form_rules: Vec<FormRule>,
}

impl ExerciseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let count = self.limbs.len();
        if !(1..=2).contains(&count) {
            return Err(ConfigError::LimbCount {
                name: self.name.clone(),
                count,
            });
        }
        if self.suppression != SuppressionPolicy::Independent && count != 2 {
            return Err(ConfigError::SuppressionNeedsTwoLimbs(self.suppression));
        }
        self.limbs.iter().try_for_each(LimbConfig::validate)?;
        self.stage_gate.iter().try_for_each(Predicate::validate)?;
        self.form_rules.iter().try_for_each(FormRule::validate)
    }

    /// Joints that must be visible for a frame to be classified
    pub fn required_joints(&self) -> Vec<Joint> {
        let mut joints: Vec<Joint> = self
            .limbs
            .iter()
            .flat_map(|limb| limb.hinges.iter().flat_map(HingeRef::joints))
            .chain(self.stage_gate.iter().flat_map(Predicate::joints))
            .collect();
        joints.sort();
        joints.dedup();
        joints
    }
}

// ============================================================================
// PRESETS
// ============================================================================

fn both_sides(hinge: Hinge) -> Vec<HingeRef> {
    Side::BOTH.iter().map(|&side| HingeRef::new(side, hinge)).collect()
}

fn limb(
    label: &str,
    hinges: Vec<HingeRef>,
    extended: f32,
    flexed: f32,
    extended_stage: Stage,
    cue: &str,
) -> LimbConfig {
    LimbConfig {
        label: label.to_string(),
        hinges,
        extended,
        flexed,
        extended_stage,
        cue: cue.to_string(),
    }
}

fn angle_above(hinge: Hinge, degrees: f32) -> Check {
    Check::AngleAbove { hinge, degrees }
}

fn angle_below(hinge: Hinge, degrees: f32) -> Check {
    Check::AngleBelow { hinge, degrees }
}

fn spread_x(part: BodyPart, reference: BodyPart, limit: f32) -> Check {
    Check::SpreadX {
        part,
        reference,
        limit,
    }
}

fn pushups() -> ExerciseConfig {
    ExerciseConfig {
        name: ExerciseKind::Pushups.name().to_string(),
        limbs: vec![limb(
            "both",
            both_sides(Hinge::Elbow),
            160.0,
            90.0,
            Stage::Up,
            "Good pushup!",
        )],
        suppression: SuppressionPolicy::Independent,
        stage_gate: Vec::new(),
        form_rules: vec![
            FormRule::new(
                "Go lower!",
                vec![
                    Predicate::any(angle_above(Hinge::Elbow, 90.0)),
                    Predicate::any(angle_below(Hinge::Elbow, 160.0)),
                ],
            ),
            FormRule::new(
                "Keep your back straight!",
                vec![
                    Predicate::both(angle_below(Hinge::Elbow, 90.0)),
                    Predicate::both(Check::Below {
                        part: BodyPart::Shoulder,
                        reference: BodyPart::Wrist,
                    }),
                ],
            ),
        ],
    }
}

fn squats() -> ExerciseConfig {
    ExerciseConfig {
        name: ExerciseKind::Squats.name().to_string(),
        limbs: vec![limb(
            "both",
            both_sides(Hinge::Knee),
            130.0,
            110.0,
            Stage::Up,
            "Good squat!",
        )],
        suppression: SuppressionPolicy::Independent,
        stage_gate: Vec::new(),
        form_rules: vec![
            FormRule::new(
                "Align knees with toes!",
                vec![Predicate::any(spread_x(BodyPart::Knee, BodyPart::Ankle, 0.1))],
            ),
            FormRule::new(
                "Go lower for a full squat!",
                vec![Predicate::any(angle_above(Hinge::Knee, 120.0))],
            ),
            FormRule::new(
                "Keep your back straight!",
                vec![Predicate::any(Check::Below {
                    part: BodyPart::Hip,
                    reference: BodyPart::Knee,
                })],
            ),
        ],
    }
}

fn bicep_curl() -> ExerciseConfig {
    let arm = |side: Side, cue: &str| {
        limb(
            side.name(),
            vec![HingeRef::new(side, Hinge::Elbow)],
            160.0,
            50.0,
            Stage::Down,
            cue,
        )
    };
    ExerciseConfig {
        name: ExerciseKind::BicepCurl.name().to_string(),
        limbs: vec![
            arm(Side::Left, "Good left curl!"),
            arm(Side::Right, "Good right curl!"),
        ],
        suppression: SuppressionPolicy::SuppressWhilePrimaryFlexed,
        stage_gate: Vec::new(),
        form_rules: vec![
            FormRule::new(
                "Keep your elbows close to your body!",
                vec![Predicate::any(Check::OffsetX {
                    part: BodyPart::Elbow,
                    reference: BodyPart::Shoulder,
                    limit: 0.1,
                })],
            ),
            FormRule::new(
                "Avoid swinging; keep your back straight!",
                vec![Predicate::any(spread_x(BodyPart::Shoulder, BodyPart::Hip, 0.1))],
            ),
            FormRule::new(
                "Lower your arm fully between reps!",
                vec![Predicate::both(angle_above(Hinge::Elbow, 160.0))],
            ),
            FormRule::new(
                "Keep your wrists straight!",
                vec![Predicate::any(spread_x(BodyPart::Wrist, BodyPart::Elbow, 0.05))],
            ),
        ],
    }
}

fn lunges() -> ExerciseConfig {
    let leg = |side: Side, cue: &str| {
        limb(
            side.name(),
            vec![HingeRef::new(side, Hinge::Knee)],
            160.0,
            110.0,
            Stage::Up,
            cue,
        )
    };
    ExerciseConfig {
        name: ExerciseKind::Lunges.name().to_string(),
        limbs: vec![
            leg(Side::Left, "Good left lunge!"),
            leg(Side::Right, "Good right lunge!"),
        ],
        // Front and back knee bend together in one lunge
        suppression: SuppressionPolicy::SuppressWhilePrimaryFlexed,
        stage_gate: Vec::new(),
        form_rules: vec![
            FormRule::new(
                "Avoid letting your knee go past your toes!",
                vec![Predicate::any(Check::OffsetX {
                    part: BodyPart::Knee,
                    reference: BodyPart::Ankle,
                    limit: 0.05,
                })],
            ),
            FormRule::new(
                "Lower your back knee toward the ground!",
                vec![Predicate::any(angle_below(Hinge::Knee, 70.0))],
            ),
            FormRule::new(
                "Keep your torso upright; avoid leaning forward!",
                vec![Predicate::any(spread_x(BodyPart::Hip, BodyPart::Knee, 0.1))],
            ),
        ],
    }
}

fn overhead_press() -> ExerciseConfig {
    ExerciseConfig {
        name: ExerciseKind::OverheadPress.name().to_string(),
        limbs: vec![limb(
            "both",
            both_sides(Hinge::Elbow),
            160.0,
            100.0,
            Stage::Up,
            "Good overhead press!",
        )],
        suppression: SuppressionPolicy::Independent,
        // Only count with the dumbbells overhead
        stage_gate: vec![Predicate::both(Check::Above {
            part: BodyPart::Wrist,
            reference: BodyPart::Shoulder,
        })],
        form_rules: vec![
            FormRule::new(
                "Keep your wrists straight!",
                vec![Predicate::any(spread_x(BodyPart::Wrist, BodyPart::Elbow, 0.1))],
            ),
            FormRule::new(
                "Don't drop your arms!",
                vec![Predicate::both(Check::BelowShoulderLine {
                    part: BodyPart::Wrist,
                })],
            ),
            FormRule::new(
                "Fully extend your arms!",
                vec![
                    Predicate::any(Check::AtOrAboveShoulderLine {
                        part: BodyPart::Wrist,
                    }),
                    Predicate::any(angle_below(Hinge::Elbow, 160.0)),
                ],
            ),
            FormRule::new(
                "Maintain a straight back!",
                vec![Predicate::any(spread_x(BodyPart::Hip, BodyPart::Shoulder, 0.1))],
            ),
        ],
    }
}
