//! Score, combo and running accuracy for one attempt.

use crate::models::stats::{HitStats, Judgement, classify};
use serde::{Deserialize, Serialize};

/// Base score of every hit.
pub const HIT_BASE_SCORE: u64 = 100;
/// Bonus per combo step held before the hit.
pub const COMBO_BONUS: u64 = 5;

/// Process-scoped score state, reset at the start of each attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunAccumulator {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub total_accuracy_sum: f64,
    pub total_notes: u32,
    pub hit_stats: HitStats,
}

impl RunAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears everything for a new attempt.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Applies a judged press and returns its tier.
    ///
    /// A press that lands in the `Miss` tier (accuracy below 0.20) breaks
    /// the combo and scores nothing, but its accuracy still counts.
    pub fn on_hit(&mut self, accuracy: f64) -> Judgement {
        let accuracy = if accuracy.is_nan() { 0.0 } else { accuracy.clamp(0.0, 1.0) };
        let judgement = classify(accuracy);
        self.add_accuracy(accuracy);
        self.hit_stats.record(judgement);

        if judgement.is_miss() {
            self.combo = 0;
        } else {
            self.score += HIT_BASE_SCORE + self.combo as u64 * COMBO_BONUS;
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
        }
        judgement
    }

    /// Applies an expired note.
    pub fn on_miss(&mut self) {
        self.add_accuracy(0.0);
        self.hit_stats.record(Judgement::Miss);
        self.combo = 0;
    }

    fn add_accuracy(&mut self, accuracy: f64) {
        self.total_accuracy_sum += accuracy;
        self.total_notes += 1;
    }

    /// Mean accuracy in `[0, 1]`, 0 before the first judgement.
    pub fn current_accuracy(&self) -> f64 {
        if self.total_notes > 0 {
            self.total_accuracy_sum / self.total_notes as f64
        } else {
            0.0
        }
    }
}
