//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod console;
mod session;

pub use console::init_logging;
pub use session::{countdown_cues, exercise_names, CoachSession};
