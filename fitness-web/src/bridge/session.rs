//! JS-facing rep session
//!
//! MediaPipe runs in JavaScript; every frame JS hands over the flat
//! landmark array and gets back a JSON frame report to render and speak.

use log::warn;
use wasm_bindgen::prelude::*;

use crate::counter::{self, ExerciseKind, RepSession, SessionConfig};
use crate::pose::PoseFrame;

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// One exercise session owned by the JS app loop
#[wasm_bindgen]
pub struct CoachSession {
    inner: RepSession,
}

#[wasm_bindgen]
impl CoachSession {
    /// Start a session for a built-in exercise ("squats", "bicep curl", ...)
    #[wasm_bindgen(constructor)]
    pub fn new(exercise: &str) -> Result<CoachSession, JsValue> {
        let kind: ExerciseKind = exercise.parse().map_err(to_js)?;
        Ok(Self::from_kind(kind))
    }

    /// Start a session from the intro-screen key ('1'..='5')
    pub fn from_menu_key(key: char) -> Option<CoachSession> {
        ExerciseKind::from_menu_key(key).map(Self::from_kind)
    }

    /// Start a session from a JSON `SessionConfig`
    pub fn from_config(json: &str) -> Result<CoachSession, JsValue> {
        let config = SessionConfig::from_json(json).map_err(to_js)?;
        let inner = RepSession::new(config).map_err(to_js)?;
        Ok(Self { inner })
    }

    /// Process one frame of landmarks (99 or 132 floats), returns the
    /// frame report as JSON
    pub fn update(&mut self, data: &[f32], timestamp: f64) -> Result<String, JsValue> {
        let frame = PoseFrame::from_flat(data, timestamp).map_err(|err| {
            warn!("{}", err);
            to_js(err)
        })?;
        let report = self.inner.process(&frame);
        serde_json::to_string(&report).map_err(to_js)
    }

    /// Frame with no pose detected
    pub fn update_lost(&mut self, timestamp: f64) -> Result<String, JsValue> {
        let report = self.inner.process(&PoseFrame::empty(timestamp));
        serde_json::to_string(&report).map_err(to_js)
    }

    pub fn exercise(&self) -> String {
        self.inner.exercise().name.clone()
    }

    /// Rep count per limb, in configuration order
    pub fn counts(&self) -> Vec<u32> {
        self.inner.counts()
    }

    pub fn total(&self) -> u32 {
        self.inner.total()
    }

    /// Session state as JSON
    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.snapshot()).map_err(to_js)
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

impl CoachSession {
    fn from_kind(kind: ExerciseKind) -> Self {
        Self {
            inner: RepSession::for_exercise(kind),
        }
    }
}

/// Countdown lines to narrate before the first frame, as a JSON array
#[wasm_bindgen]
pub fn countdown_cues(seconds: Option<u32>) -> String {
    let lines: Vec<String> = counter::countdown(seconds.unwrap_or(counter::COUNTDOWN_SECONDS)).collect();
    serde_json::to_string(&lines).unwrap_or_else(|_| "[]".to_string())
}

/// Preset exercise names in menu order, as a JSON array
#[wasm_bindgen]
pub fn exercise_names() -> String {
    let names: Vec<&str> = ExerciseKind::ALL.iter().map(ExerciseKind::name).collect();
    serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
}
