//! Judgement tiers and per-tier hit statistics.
//!
//! Tiers are derived purely from the accuracy fraction, whatever model
//! produced it.

use serde::{Deserialize, Serialize};

/// Judgement tiers from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Judgement {
    /// Accuracy >= 0.95.
    Marvelous,
    /// Accuracy >= 0.80.
    Perfect,
    /// Accuracy >= 0.60.
    Great,
    /// Accuracy >= 0.40.
    Good,
    /// Accuracy >= 0.20.
    Ok,
    /// Accuracy below 0.20, or an expired note.
    Miss,
}

impl Judgement {
    /// Lower accuracy bound of each tier except `Miss`, best first.
    const CUTOFFS: [(f64, Judgement); 5] = [
        (0.95, Judgement::Marvelous),
        (0.80, Judgement::Perfect),
        (0.60, Judgement::Great),
        (0.40, Judgement::Good),
        (0.20, Judgement::Ok),
    ];

    /// Maps an accuracy fraction to its tier.
    pub fn from_accuracy(accuracy: f64) -> Self {
        Self::CUTOFFS
            .iter()
            .find(|(cutoff, _)| accuracy >= *cutoff)
            .map_or(Judgement::Miss, |(_, tier)| *tier)
    }

    pub fn is_miss(self) -> bool {
        self == Judgement::Miss
    }

    pub fn label(self) -> &'static str {
        match self {
            Judgement::Marvelous => "Marvelous",
            Judgement::Perfect => "Perfect",
            Judgement::Great => "Great",
            Judgement::Good => "Good",
            Judgement::Ok => "OK",
            Judgement::Miss => "Miss",
        }
    }
}

/// Shorthand for [`Judgement::from_accuracy`].
#[inline]
pub fn classify(accuracy: f64) -> Judgement {
    Judgement::from_accuracy(accuracy)
}

/// Outcome of judging one note, either by a press or by expiry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgmentResult {
    /// Rate-adjusted scheduled time of the note on the session clock.
    pub note_time_ms: f64,
    /// Press time, or expiry time for a miss.
    pub hit_time_ms: f64,
    /// Signed deviation, negative = early. Misses carry the +500 sentinel.
    pub deviation_ms: f64,
    pub column: usize,
    pub accuracy: f64,
    pub judgement: Judgement,
}

/// Per-tier counters for a play session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitStats {
    pub marvelous: u32,
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub ok: u32,
    pub miss: u32,
}

impl HitStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, judgement: Judgement) {
        match judgement {
            Judgement::Marvelous => self.marvelous += 1,
            Judgement::Perfect => self.perfect += 1,
            Judgement::Great => self.great += 1,
            Judgement::Good => self.good += 1,
            Judgement::Ok => self.ok += 1,
            Judgement::Miss => self.miss += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.marvelous + self.perfect + self.great + self.good + self.ok + self.miss
    }
}
