//! Judgment core of a 4-lane vertical scrolling rhythm game.
//!
//! Notes are activated ahead of their hit time, lane presses are judged
//! against a configurable hit window and accuracy model, and every
//! judgement feeds the score/combo accumulator and the replay recorder.

pub mod database;
pub mod error;
pub mod input;
pub mod logic;
pub mod models;
pub mod state;
pub mod system;

pub use error::{LaneJudgeError, Result};
