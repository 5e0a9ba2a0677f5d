//! Rep-counting session
//!
//! Owns the per-limb stage/count state for one exercise and turns each
//! pose frame into a [`FrameReport`]. Nothing here is global, so any number
//! of sessions can run side by side.

use std::sync::Arc;

use log::{debug, trace};
use serde::{Serialize, Serializer};

use super::config::SessionConfig;
use super::exercise::{ExerciseConfig, ExerciseKind, SuppressionPolicy};
use super::form::FormRule;
use super::stage::{LimbTracker, Stage, Transition};
use crate::error::ConfigError;
use crate::pose::{ConfidenceGate, Hinge, Joint, OneEuroFilter, PoseFrame, PoseView, Side};

/// How a frame was handled
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    /// Angles classified, stages advanced
    Tracked,
    /// Stage gate failed, stages reset to unknown
    Gated,
    /// Required joints missing, state untouched
    Skipped,
}

/// One hinge angle, with its vertex position for on-screen labels
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HingeReading {
    pub side: Side,
    pub hinge: Hinge,
    pub degrees: f32,
    pub vertex: (f32, f32),
}

/// A counted rep
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RepEvent {
    pub limb: String,
    pub count: u32,
    /// Line for the speech sink
    pub cue: String,
}

/// Form rules paired with the frame they are judged on
#[derive(Clone, Debug)]
struct Coaching {
    view: PoseView,
    rules: Arc<[FormRule]>,
}

impl Coaching {
    fn messages(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(move |rule| rule.fires(&self.view))
            .map(|rule| rule.message.as_str())
    }
}

/// Result of one frame
#[derive(Clone, Debug, Serialize)]
pub struct FrameReport {
    pub status: FrameStatus,
    pub angles: Vec<HingeReading>,
    pub reps: Vec<RepEvent>,
    /// Reps dropped by the suppression policy (limb labels)
    pub suppressed: Vec<String>,
    /// Rules are evaluated only when feedback is read
    #[serde(rename = "feedback", serialize_with = "serialize_feedback")]
    coaching: Option<Coaching>,
}

fn serialize_feedback<S: Serializer>(
    coaching: &Option<Coaching>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(coaching.iter().flat_map(Coaching::messages))
}

impl FrameReport {
    fn skipped() -> Self {
        Self {
            status: FrameStatus::Skipped,
            angles: Vec::new(),
            reps: Vec::new(),
            suppressed: Vec::new(),
            coaching: None,
        }
    }

    pub fn feedback(&self) -> impl Iterator<Item = &str> {
        self.coaching.iter().flat_map(Coaching::messages)
    }

    /// Consume the report, yielding this frame's feedback once
    pub fn into_feedback(self) -> impl Iterator<Item = String> {
        self.coaching.into_iter().flat_map(|Coaching { view, rules }| {
            (0..rules.len()).filter_map(move |index| {
                let rule = &rules[index];
                rule.fires(&view).then(|| rule.message.clone())
            })
        })
    }

    pub fn has_feedback(&self) -> bool {
        self.feedback().next().is_some()
    }
}

/// Per-limb state as exposed to callers
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LimbSnapshot {
    pub label: String,
    pub stage: Stage,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub exercise: String,
    pub limbs: Vec<LimbSnapshot>,
    pub total: u32,
    pub frames_seen: u64,
    pub frames_skipped: u64,
}

/// Rep counter for one exercise session
pub struct RepSession {
    config: ExerciseConfig,
    /// Shared with every report so feedback can be read lazily
    rules: Arc<[FormRule]>,
    gate: ConfidenceGate,
    limbs: Vec<LimbTracker>,
    /// One filter per hinge per limb, when smoothing is on
    filters: Option<Vec<Vec<OneEuroFilter>>>,
    required: Vec<Joint>,
    frames_seen: u64,
    frames_skipped: u64,
}

impl RepSession {
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Session with a built-in preset
    pub fn for_exercise(kind: ExerciseKind) -> Self {
        Self::build(kind.into())
    }

    fn build(config: SessionConfig) -> Self {
        let SessionConfig {
            exercise,
            min_visibility,
            smoothing,
        } = config;

        let limbs: Vec<LimbTracker> = exercise.limbs.iter().map(LimbTracker::new).collect();
        let filters: Option<Vec<Vec<OneEuroFilter>>> = smoothing.map(|params| {
            exercise
                .limbs
                .iter()
                .map(|limb| {
                    limb.hinges
                        .iter()
                        .map(|_| OneEuroFilter::new(params))
                        .collect::<Vec<_>>()
                })
                .collect()
        });
        let required = exercise.required_joints();
        let gate = ConfidenceGate::with_threshold(min_visibility);
        debug!(
            "{}: {} limbs, {} required joints, min visibility {}",
            exercise.name,
            limbs.len(),
            required.len(),
            gate.threshold()
        );

        Self {
            rules: exercise.form_rules.clone().into(),
            config: exercise,
            gate,
            limbs,
            filters,
            required,
            frames_seen: 0,
            frames_skipped: 0,
        }
    }

    /// Classify one frame.
    ///
    /// A frame missing any required joint leaves every stage and counter
    /// as it was and yields no feedback.
    pub fn process(&mut self, frame: &PoseFrame) -> FrameReport {
        self.frames_seen += 1;

        let Some(view) = PoseView::resolve(frame, &self.gate, &self.required) else {
            self.frames_skipped += 1;
            trace!("{}: frame skipped, required joints missing", self.config.name);
            return FrameReport::skipped();
        };
        let Some(readings) = self.read_hinges(&view) else {
            self.frames_skipped += 1;
            return FrameReport::skipped();
        };

        let angles = self.limb_angles(&readings, frame.timestamp);

        let gated = !self.config.stage_gate.iter().all(|p| p.holds(&view) == Some(true));
        let (status, reps, suppressed) = if gated {
            for limb in &mut self.limbs {
                limb.clear_stage();
            }
            (FrameStatus::Gated, Vec::new(), Vec::new())
        } else {
            let (reps, suppressed) = self.advance(&angles);
            (FrameStatus::Tracked, reps, suppressed)
        };

        FrameReport {
            status,
            angles: readings.into_iter().flatten().collect(),
            reps,
            suppressed,
            coaching: Some(Coaching {
                view,
                rules: Arc::clone(&self.rules),
            }),
        }
    }

    /// Raw hinge readings grouped by limb
    fn read_hinges(&self, view: &PoseView) -> Option<Vec<Vec<HingeReading>>> {
        self.config
            .limbs
            .iter()
            .map(|limb| {
                limb.hinges
                    .iter()
                    .map(|h| {
                        Some(HingeReading {
                            side: h.side,
                            hinge: h.hinge,
                            degrees: view.hinge_angle(h.side, h.hinge)?,
                            vertex: view.point(h.hinge.vertex(h.side))?,
                        })
                    })
                    .collect::<Option<Vec<_>>>()
            })
            .collect()
    }

    /// Angles fed to the state machine, smoothed when configured
    fn limb_angles(&mut self, readings: &[Vec<HingeReading>], timestamp: f64) -> Vec<Vec<f32>> {
        match self.filters.as_mut() {
            Some(filters) => readings
                .iter()
                .zip(filters.iter_mut())
                .map(|(limb, limb_filters)| {
                    limb.iter()
                        .zip(limb_filters.iter_mut())
                        .map(|(reading, filter)| filter.filter(timestamp, reading.degrees))
                        .collect::<Vec<f32>>()
                })
                .collect(),
            None => readings
                .iter()
                .map(|limb| limb.iter().map(|reading| reading.degrees).collect::<Vec<f32>>())
                .collect(),
        }
    }

    /// Step every limb, then count completions through the suppression policy
    fn advance(&mut self, angles: &[Vec<f32>]) -> (Vec<RepEvent>, Vec<String>) {
        let transitions: Vec<Transition> = self
            .limbs
            .iter_mut()
            .zip(angles)
            .map(|(limb, limb_angles)| limb.update(limb_angles))
            .collect();

        let mut reps = Vec::new();
        let mut suppressed = Vec::new();
        for (index, transition) in transitions.iter().enumerate() {
            if *transition != Transition::Completed {
                continue;
            }

            let label = &self.config.limbs[index].label;
            if index > 0 && self.secondary_suppressed(&transitions) {
                debug!("{}: {} rep suppressed", self.config.name, label);
                suppressed.push(label.clone());
                continue;
            }

            let count = self.limbs[index].record_rep();
            debug!("{}: {} rep {}", self.config.name, label, count);
            reps.push(RepEvent {
                limb: label.clone(),
                count,
                cue: self.config.limbs[index].cue.clone(),
            });
        }
        (reps, suppressed)
    }

    fn secondary_suppressed(&self, transitions: &[Transition]) -> bool {
        match self.config.suppression {
            SuppressionPolicy::Independent => false,
            SuppressionPolicy::SuppressWhilePrimaryFlexed => self.limbs[0].is_flexed(),
            SuppressionPolicy::SuppressOnSimultaneous => transitions[0] == Transition::Completed,
        }
    }

    pub fn exercise(&self) -> &ExerciseConfig {
        &self.config
    }

    /// Rep count per limb, in configuration order
    pub fn counts(&self) -> Vec<u32> {
        self.limbs.iter().map(LimbTracker::count).collect()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.limbs.iter().map(LimbTracker::stage).collect()
    }

    pub fn total(&self) -> u32 {
        self.limbs.iter().map(LimbTracker::count).sum()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            exercise: self.config.name.clone(),
            limbs: self
                .config
                .limbs
                .iter()
                .zip(&self.limbs)
                .map(|(config, tracker)| LimbSnapshot {
                    label: config.label.clone(),
                    stage: tracker.stage(),
                    count: tracker.count(),
                })
                .collect(),
            total: self.total(),
            frames_seen: self.frames_seen,
            frames_skipped: self.frames_skipped,
        }
    }

    /// Zero counters, stages and smoothing state
    pub fn reset(&mut self) {
        for limb in &mut self.limbs {
            limb.reset();
        }
        for filter in self.filters.iter_mut().flatten().flatten() {
            filter.reset();
        }
        self.frames_seen = 0;
        self.frames_skipped = 0;
    }
}
