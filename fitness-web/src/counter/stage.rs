//! Per-limb stage tracking
//!
//! Two thresholds split the hinge range into extended / dead band / flexed.
//! A rep completes on the first flexed frame after an extended one; the
//! dead band and repeated flexed frames never count twice.

use serde::{Deserialize, Serialize};

use super::exercise::LimbConfig;

/// Repetition phase of one limb
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Unknown,
    Up,
    Down,
}

impl Stage {
    pub fn opposite(&self) -> Stage {
        match self {
            Stage::Up => Stage::Down,
            Stage::Down => Stage::Up,
            Stage::Unknown => Stage::Unknown,
        }
    }
}

/// Outcome of feeding one frame's angles to a limb
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Stage unchanged
    Hold,
    /// Limb just reached the extended stage
    Extended,
    /// Limb went from extended to flexed: one rep, unless suppressed
    Completed,
}

/// Stage and rep count for one tracked limb
#[derive(Clone, Debug)]
pub struct LimbTracker {
    /// Angle at or above which the limb is extended
    extended: f32,
    /// Angle at or below which the limb is flexed
    flexed: f32,
    /// Label of the extended posture ("down" for curls, "up" otherwise)
    extended_stage: Stage,
    stage: Stage,
    count: u32,
}

impl LimbTracker {
    pub fn new(config: &LimbConfig) -> Self {
        Self {
            extended: config.extended,
            flexed: config.flexed,
            extended_stage: config.extended_stage,
            stage: Stage::Unknown,
            count: 0,
        }
    }

    /// Advance the stage from this frame's hinge angles.
    ///
    /// Every hinge must agree: extended only when all are >= the extended
    /// threshold, flexed only when all are <= the flexed threshold. Does not
    /// touch the count; call [`LimbTracker::record_rep`] for that.
    pub fn update(&mut self, angles: &[f32]) -> Transition {
        if angles.is_empty() {
            return Transition::Hold;
        }

        if angles.iter().all(|&a| a >= self.extended) {
            if self.stage == self.extended_stage {
                return Transition::Hold;
            }
            self.stage = self.extended_stage;
            return Transition::Extended;
        }

        if angles.iter().all(|&a| a <= self.flexed) && self.stage == self.extended_stage {
            self.stage = self.flexed_stage();
            return Transition::Completed;
        }

        Transition::Hold
    }

    /// Count one rep, returns the new total
    pub fn record_rep(&mut self) -> u32 {
        self.count += 1;
        self.count
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn flexed_stage(&self) -> Stage {
        self.extended_stage.opposite()
    }

    pub fn is_flexed(&self) -> bool {
        self.stage == self.flexed_stage()
    }

    /// Forget the stage but keep the count
    pub fn clear_stage(&mut self) {
        self.stage = Stage::Unknown;
    }

    pub fn reset(&mut self) {
        self.stage = Stage::Unknown;
        self.count = 0;
    }
}
