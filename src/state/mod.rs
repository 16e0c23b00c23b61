//! Gameplay state.
//!
//! - `JudgmentCore` - note window, hit evaluation, score and replay
//! - `Session` - clock, pause/resume and deferred starts around the core

pub mod game;
pub mod session;

pub use game::{GameplaySnapshot, JudgmentCore};
pub use session::{Session, SessionPhase};
