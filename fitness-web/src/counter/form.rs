//! Form feedback rules
//!
//! Each rule is a message plus a list of predicates over the current
//! frame. Rules are stateless and never feed back into counting. A rule
//! that cannot be evaluated on any visible side stays silent.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pose::{BodyPart, Hinge, Joint, PoseView, Side};

/// How a check is applied across the two body sides
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantifier {
    /// Holds on at least one side
    Any,
    /// Holds on both sides
    Both,
}

/// Per-side geometric check. Image y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Check {
    /// Hinge angle strictly above `degrees`
    AngleAbove { hinge: Hinge, degrees: f32 },
    /// Hinge angle strictly below `degrees`
    AngleBelow { hinge: Hinge, degrees: f32 },
    /// `part.x - reference.x > limit`
    OffsetX {
        part: BodyPart,
        reference: BodyPart,
        limit: f32,
    },
    /// `|part.x - reference.x| > limit`
    SpreadX {
        part: BodyPart,
        reference: BodyPart,
        limit: f32,
    },
    /// `part` sits lower in the image than `reference`
    Below { part: BodyPart, reference: BodyPart },
    /// `part` sits higher in the image than `reference`
    Above { part: BodyPart, reference: BodyPart },
    /// `part` lower than the mean shoulder height
    BelowShoulderLine { part: BodyPart },
    /// `part` level with or higher than the mean shoulder height
    AtOrAboveShoulderLine { part: BodyPart },
}

impl Check {
    /// Evaluate on one side; `None` if a needed point is missing
    pub fn holds(&self, side: Side, view: &PoseView) -> Option<bool> {
        let held = match *self {
            Check::AngleAbove { hinge, degrees } => view.hinge_angle(side, hinge)? > degrees,
            Check::AngleBelow { hinge, degrees } => view.hinge_angle(side, hinge)? < degrees,
            Check::OffsetX {
                part,
                reference,
                limit,
            } => view.part(part, side)?.0 - view.part(reference, side)?.0 > limit,
            Check::SpreadX {
                part,
                reference,
                limit,
            } => (view.part(part, side)?.0 - view.part(reference, side)?.0).abs() > limit,
            Check::Below { part, reference } => {
                view.part(part, side)?.1 > view.part(reference, side)?.1
            }
            Check::Above { part, reference } => {
                view.part(part, side)?.1 < view.part(reference, side)?.1
            }
            Check::BelowShoulderLine { part } => view.part(part, side)?.1 > view.shoulder_line()?,
            Check::AtOrAboveShoulderLine { part } => {
                view.part(part, side)?.1 <= view.shoulder_line()?
            }
        };
        Some(held)
    }

    /// Joints read when evaluating on `side`
    pub fn joints(&self, side: Side) -> Vec<Joint> {
        match *self {
            Check::AngleAbove { hinge, .. } | Check::AngleBelow { hinge, .. } => {
                hinge.joints(side).to_vec()
            }
            Check::OffsetX {
                part, reference, ..
            }
            | Check::SpreadX {
                part, reference, ..
            }
            | Check::Below { part, reference }
            | Check::Above { part, reference } => vec![part.joint(side), reference.joint(side)],
            Check::BelowShoulderLine { part } | Check::AtOrAboveShoulderLine { part } => vec![
                part.joint(side),
                Joint::LeftShoulder,
                Joint::RightShoulder,
            ],
        }
    }

    fn threshold(&self) -> Option<f32> {
        match *self {
            Check::AngleAbove { degrees, .. } | Check::AngleBelow { degrees, .. } => Some(degrees),
            Check::OffsetX { limit, .. } | Check::SpreadX { limit, .. } => Some(limit),
            _ => None,
        }
    }
}

/// A check quantified over both sides
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub check: Check,
    pub over: Quantifier,
}

impl Predicate {
    pub fn any(check: Check) -> Self {
        Self {
            check,
            over: Quantifier::Any,
        }
    }

    pub fn both(check: Check) -> Self {
        Self {
            check,
            over: Quantifier::Both,
        }
    }

    /// `Any` decides on whichever sides are visible; `Both` needs both
    pub fn holds(&self, view: &PoseView) -> Option<bool> {
        let left = self.check.holds(Side::Left, view);
        let right = self.check.holds(Side::Right, view);
        match self.over {
            Quantifier::Any => match (left, right) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (None, None) => None,
                _ => Some(false),
            },
            Quantifier::Both => Some(left? && right?),
        }
    }

    pub fn joints(&self) -> Vec<Joint> {
        Side::BOTH
            .iter()
            .flat_map(|&side| self.check.joints(side))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.check.threshold() {
            Some(value) if !value.is_finite() => Err(ConfigError::NonFiniteCheck(value)),
            _ => Ok(()),
        }
    }
}

/// Message shown when every predicate holds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormRule {
    pub message: String,
    pub when: Vec<Predicate>,
}

impl FormRule {
    pub fn new(message: &str, when: Vec<Predicate>) -> Self {
        Self {
            message: message.to_string(),
            when,
        }
    }

    /// Whether the rule fires; a rule missing joints stays silent
    pub fn fires(&self, view: &PoseView) -> bool {
        self.when
            .iter()
            .try_fold(true, |acc, predicate| Some(acc && predicate.holds(view)?))
            .unwrap_or(false)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.when.is_empty() {
            return Err(ConfigError::EmptyRule(self.message.clone()));
        }
        self.when.iter().try_for_each(Predicate::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{ConfidenceGate, Landmark, PoseFrame};

    fn view(points: &[(Joint, f32, f32)]) -> PoseView {
        let frame = points.iter().fold(PoseFrame::empty(0.0), |frame, &(joint, x, y)| {
            frame.with(joint, Landmark::at(x, y))
        });
        PoseView::resolve(&frame, &ConfidenceGate::new(), &[]).unwrap()
    }

    fn legs(left_knee_x: f32, right_knee_x: f32) -> PoseView {
        view(&[
            (Joint::LeftHip, 0.4, 0.5),
            (Joint::LeftKnee, left_knee_x, 0.7),
            (Joint::LeftAnkle, 0.4, 0.9),
            (Joint::RightHip, 0.6, 0.5),
            (Joint::RightKnee, right_knee_x, 0.7),
            (Joint::RightAnkle, 0.6, 0.9),
        ])
    }

    fn knees_over_toes() -> Predicate {
        Predicate::any(Check::SpreadX {
            part: BodyPart::Knee,
            reference: BodyPart::Ankle,
            limit: 0.1,
        })
    }

    #[test]
    fn test_any_vs_both() {
        let one_side = legs(0.55, 0.6);
        assert_eq!(knees_over_toes().holds(&one_side), Some(true));

        let both = Predicate::both(knees_over_toes().check);
        assert_eq!(both.holds(&one_side), Some(false));
        assert_eq!(both.holds(&legs(0.55, 0.45)), Some(true));
    }

    #[test]
    fn test_missing_joint_is_none() {
        let partial = view(&[(Joint::LeftKnee, 0.4, 0.7), (Joint::RightKnee, 0.6, 0.7)]);
        assert_eq!(knees_over_toes().holds(&partial), None);

        let rule = FormRule::new("Align knees with toes!", vec![knees_over_toes()]);
        assert!(!rule.fires(&partial));
    }

    #[test]
    fn test_any_uses_the_visible_side() {
        let left_only = view(&[(Joint::LeftKnee, 0.55, 0.7), (Joint::LeftAnkle, 0.4, 0.9)]);
        assert_eq!(knees_over_toes().holds(&left_only), Some(true));
        assert!(FormRule::new("Align knees with toes!", vec![knees_over_toes()]).fires(&left_only));

        let aligned = view(&[(Joint::LeftKnee, 0.4, 0.7), (Joint::LeftAnkle, 0.4, 0.9)]);
        assert_eq!(knees_over_toes().holds(&aligned), Some(false));

        // both sides still needs both sides
        let both = Predicate::both(knees_over_toes().check);
        assert_eq!(both.holds(&left_only), None);
    }

    #[test]
    fn test_rule_needs_all_predicates() {
        let straight_legs = Predicate::both(Check::AngleAbove {
            hinge: Hinge::Knee,
            degrees: 100.0,
        });
        let rule = FormRule::new("test", vec![knees_over_toes(), straight_legs]);

        assert!(!rule.fires(&legs(0.4, 0.6)));
        assert!(!rule.fires(&legs(0.45, 0.6)));
        assert!(rule.fires(&legs(0.52, 0.6)));

        let bent_legs = Predicate::both(Check::AngleBelow {
            hinge: Hinge::Knee,
            degrees: 100.0,
        });
        let rule = FormRule::new("test", vec![knees_over_toes(), bent_legs]);
        assert!(!rule.fires(&legs(0.52, 0.6)));
    }

    #[test]
    fn test_shoulder_line() {
        let arms = view(&[
            (Joint::LeftShoulder, 0.4, 0.25),
            (Joint::RightShoulder, 0.6, 0.75),
            (Joint::LeftWrist, 0.4, 0.5),
            (Joint::RightWrist, 0.6, 0.55),
        ]);
        let below = Check::BelowShoulderLine {
            part: BodyPart::Wrist,
        };
        assert_eq!(below.holds(Side::Left, &arms), Some(false));
        assert_eq!(below.holds(Side::Right, &arms), Some(true));

        let at_or_above = Check::AtOrAboveShoulderLine {
            part: BodyPart::Wrist,
        };
        assert_eq!(at_or_above.holds(Side::Left, &arms), Some(true));
        assert_eq!(at_or_above.holds(Side::Right, &arms), Some(false));
    }

    #[test]
    fn test_predicate_joints_cover_both_sides() {
        let joints = knees_over_toes().joints();
        assert!(joints.contains(&Joint::LeftKnee));
        assert!(joints.contains(&Joint::RightAnkle));
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            FormRule::new("empty", vec![]).validate(),
            Err(ConfigError::EmptyRule("empty".into()))
        );

        let bad = Predicate::any(Check::AngleBelow {
            hinge: Hinge::Elbow,
            degrees: f32::NAN,
        });
        assert!(matches!(
            FormRule::new("nan", vec![bad]).validate(),
            Err(ConfigError::NonFiniteCheck(_))
        ));
    }

    #[test]
    fn test_check_json_shape() {
        let json = r#"{"check":{"kind":"offset_x","part":"elbow","reference":"shoulder","limit":0.1},"over":"any"}"#;
        let predicate: Predicate = serde_json::from_str(json).unwrap();
        assert_eq!(
            predicate.check,
            Check::OffsetX {
                part: BodyPart::Elbow,
                reference: BodyPart::Shoulder,
                limit: 0.1
            }
        );
    }
}
