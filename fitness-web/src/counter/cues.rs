//! Spoken cue lines that are not tied to a frame

use std::iter;

/// Grace period before counting starts
pub const COUNTDOWN_SECONDS: u32 = 5;

pub const STARTING_NOW: &str = "Starting now!";

/// "5", "4", ... "1", "Starting now!" - one line per second
pub fn countdown(seconds: u32) -> impl Iterator<Item = String> {
    (1..=seconds)
        .rev()
        .map(|s| s.to_string())
        .chain(iter::once(STARTING_NOW.to_string()))
}
