//! One Euro Filter - adaptive low-pass filter for joint angles
//!
//! Heavy smoothing while a limb is still (kills landmark jitter that would
//! otherwise flicker across a threshold), light smoothing while it moves.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Filter parameters, angles in degrees and time in seconds
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Cutoff frequency (Hz) at rest - lower = smoother
    pub min_cutoff: f32,
    /// Cutoff increase per degree/second of motion
    pub beta: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.01,
        }
    }
}

pub struct OneEuroFilter {
    min_cutoff: f32,
    beta: f32,
    /// Derivative cutoff frequency (Hz)
    d_cutoff: f32,

    prev: Option<Sample>,
}

#[derive(Clone, Copy)]
struct Sample {
    t: f64,
    value: f32,
    rate: f32,
}

impl OneEuroFilter {
    pub fn new(config: SmoothingConfig) -> Self {
        Self {
            min_cutoff: config.min_cutoff,
            beta: config.beta,
            d_cutoff: 1.0,
            prev: None,
        }
    }

    fn alpha(dt: f32, cutoff: f32) -> f32 {
        let r = 2.0 * PI * cutoff * dt;
        r / (r + 1.0)
    }

    /// Filter one sample taken at `t` seconds
    pub fn filter(&mut self, t: f64, value: f32) -> f32 {
        let Some(prev) = self.prev else {
            self.prev = Some(Sample { t, value, rate: 0.0 });
            return value;
        };

        let dt = (t - prev.t) as f32;
        if dt <= 0.0 {
            return prev.value;
        }

        let a_d = Self::alpha(dt, self.d_cutoff);
        let rate = a_d * (value - prev.value) / dt + (1.0 - a_d) * prev.rate;

        let cutoff = self.min_cutoff + self.beta * rate.abs();
        let a = Self::alpha(dt, cutoff);
        let smoothed = a * value + (1.0 - a) * prev.value;

        self.prev = Some(Sample {
            t,
            value: smoothed,
            rate,
        });
        smoothed
    }

    pub fn reset(&mut self) {
        self.prev = None;
    }
}

impl Default for OneEuroFilter {
    fn default() -> Self {
        Self::new(SmoothingConfig::default())
    }
}
