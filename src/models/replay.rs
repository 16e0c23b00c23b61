//! Replay records and retroactive re-evaluation.
//!
//! One record is kept per judged note with its raw timing, so a results
//! view can recompute accuracy under any accuracy model after the fact.
//! Misses are stored with a +500ms deviation sentinel for compatibility
//! with existing replays.

use crate::models::engine::{AccuracyModel, HitWindow, MISS_SENTINEL_MS};
use crate::models::score::RunAccumulator;
use crate::models::stats::{HitStats, Judgement, JudgmentResult, classify};
use serde::{Deserialize, Serialize};

/// Current replay format version for compatibility.
pub const REPLAY_FORMAT_VERSION: u8 = 1;

/// Accuracy cutoffs used to re-bucket records into summary counts.
const PERFECT_CUTOFF: f64 = 0.80;
const GREAT_CUTOFF: f64 = 0.60;
const GOOD_CUTOFF: f64 = 0.40;

/// Raw timing data of one judgement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    /// Rate-adjusted scheduled time of the note.
    pub note_time_ms: f64,
    /// Press time, or expiry time for a miss.
    pub hit_time_ms: f64,
    /// Signed deviation (negative = early), +500 for a miss.
    pub deviation_ms: f64,
    pub column: u8,
}

/// Tagged view of a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// A real press with its signed deviation.
    Hit(f64),
    Miss,
}

impl ReplayRecord {
    pub fn from_result(result: &JudgmentResult) -> Self {
        Self {
            note_time_ms: result.note_time_ms,
            hit_time_ms: result.hit_time_ms,
            deviation_ms: result.deviation_ms,
            column: result.column as u8,
        }
    }

    /// Record of an expired note.
    pub fn miss(note_time_ms: f64, expiry_time_ms: f64, column: usize) -> Self {
        Self {
            note_time_ms,
            hit_time_ms: expiry_time_ms,
            deviation_ms: MISS_SENTINEL_MS,
            column: column as u8,
        }
    }

    /// Sentinel check: anything at or beyond 500ms is a miss.
    ///
    /// With a 500ms window a real press exactly 500ms off reads back as a
    /// miss too, so re-judging it yields 0 even under `Exponential`.
    #[inline]
    pub fn is_miss(&self) -> bool {
        !(self.deviation_ms.abs() < MISS_SENTINEL_MS)
    }

    pub fn outcome(&self) -> HitOutcome {
        if self.is_miss() {
            HitOutcome::Miss
        } else {
            HitOutcome::Hit(self.deviation_ms)
        }
    }

    /// Accuracy of this record under `model`, 0 for a miss.
    pub fn accuracy(&self, model: AccuracyModel, hit_window: HitWindow) -> f64 {
        match self.outcome() {
            HitOutcome::Hit(deviation) => model.compute(deviation, hit_window.ms()),
            HitOutcome::Miss => 0.0,
        }
    }
}

/// Summary counts handed to persistence alongside the records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub perfect_hits: u32,
    pub great_hits: u32,
    pub good_hits: u32,
    pub ok_hits: u32,
    pub miss_count: u32,
}

impl ReplaySummary {
    pub fn total(&self) -> u32 {
        self.perfect_hits + self.great_hits + self.good_hits + self.ok_hits + self.miss_count
    }
}

/// Every judgement of a session plus the parameters it was played with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayData {
    /// Format version for future compatibility.
    pub version: u8,
    /// Judgements in resolution order.
    pub records: Vec<ReplayRecord>,
    /// Playback rate used during the play.
    pub rate: f64,
    /// Hit window used during the play.
    pub hit_window: HitWindow,
    /// Accuracy model used during the play.
    pub accuracy_model: AccuracyModel,
}

impl ReplayData {
    pub fn new(rate: f64, hit_window: HitWindow, accuracy_model: AccuracyModel) -> Self {
        Self {
            version: REPLAY_FORMAT_VERSION,
            records: Vec::new(),
            rate,
            hit_window,
            accuracy_model,
        }
    }

    pub fn push(&mut self, record: ReplayRecord) {
        self.records.push(record);
    }

    /// Clears the records, keeping the play parameters.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Summary under the model and window the session was played with.
    pub fn summary(&self) -> ReplaySummary {
        summarize(&self.records, self.accuracy_model, self.hit_window)
    }

    /// Mean accuracy of the stored records under another model.
    ///
    /// The records are left untouched.
    pub fn recompute_accuracy(&self, model: AccuracyModel, hit_window: HitWindow) -> f64 {
        recompute_accuracy(&self.records, model, hit_window)
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for ReplayData {
    fn default() -> Self {
        Self::new(1.0, HitWindow::default(), AccuracyModel::default())
    }
}

/// Mean accuracy of `records` under `model`, 0 for an empty slice.
pub fn recompute_accuracy(records: &[ReplayRecord], model: AccuracyModel, hit_window: HitWindow) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let sum: f64 = records.iter().map(|r| r.accuracy(model, hit_window)).sum();
    sum / records.len() as f64
}

/// Buckets every record by its accuracy under `model`.
pub fn summarize(records: &[ReplayRecord], model: AccuracyModel, hit_window: HitWindow) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for record in records {
        if record.is_miss() {
            summary.miss_count += 1;
            continue;
        }
        let accuracy = record.accuracy(model, hit_window);
        if accuracy >= PERFECT_CUTOFF {
            summary.perfect_hits += 1;
        } else if accuracy >= GREAT_CUTOFF {
            summary.great_hits += 1;
        } else if accuracy >= GOOD_CUTOFF {
            summary.good_hits += 1;
        } else {
            summary.ok_hits += 1;
        }
    }
    summary
}

/// Re-judges records into tier counts and mean accuracy.
pub fn rejudge_records(
    records: &[ReplayRecord],
    model: AccuracyModel,
    hit_window: HitWindow,
) -> (HitStats, f64) {
    let mut stats = HitStats::new();
    for record in records {
        let judgement = if record.is_miss() {
            Judgement::Miss
        } else {
            classify(record.accuracy(model, hit_window))
        };
        stats.record(judgement);
    }
    (stats, recompute_accuracy(records, model, hit_window))
}

/// Everything handed to persistence at the end of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Hash of the beatmap that was played.
    pub beatmap_hash: String,
    /// Final accumulator state.
    pub accumulator: RunAccumulator,
    pub replay: ReplayData,
    pub summary: ReplaySummary,
    /// Wall-clock time the session finished (seconds since UNIX epoch).
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(deviation_ms: f64) -> ReplayRecord {
        ReplayRecord {
            note_time_ms: 1000.0,
            hit_time_ms: 1000.0 + deviation_ms,
            deviation_ms,
            column: 0,
        }
    }

    #[test]
    fn test_miss_sentinel() {
        let miss = ReplayRecord::miss(1000.0, 1151.0, 2);
        assert_eq!(miss.deviation_ms, 500.0);
        assert!(miss.is_miss());
        assert_eq!(miss.outcome(), HitOutcome::Miss);
        assert!(hit(-499.0).outcome() == HitOutcome::Hit(-499.0));
        assert!(hit(-500.0).is_miss());
    }

    #[test]
    fn test_press_at_sentinel_distance_rejudges_as_miss() {
        let window = HitWindow::new(500.0);
        let record = hit(500.0);
        assert!(record.is_miss());
        assert_eq!(record.accuracy(AccuracyModel::Exponential, window), 0.0);
        assert!(hit(499.0).accuracy(AccuracyModel::Exponential, window) > 0.0);
    }

    #[test]
    fn test_recompute_differs_between_models() {
        let mut data = ReplayData::default();
        data.push(hit(0.0));
        data.push(hit(75.0));
        data.push(ReplayRecord::miss(2000.0, 2151.0, 1));

        let window = HitWindow::new(150.0);
        let linear = data.recompute_accuracy(AccuracyModel::Linear, window);
        let quadratic = data.recompute_accuracy(AccuracyModel::Quadratic, window);
        assert!((linear - 1.5 / 3.0).abs() < 1e-9);
        assert!((quadratic - 1.75 / 3.0).abs() < 1e-9);
        assert_ne!(linear, quadratic);

        // Re-evaluation never mutates the stored records.
        assert_eq!(data.records[1].deviation_ms, 75.0);
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_recompute_empty_is_zero() {
        let data = ReplayData::default();
        assert_eq!(data.recompute_accuracy(AccuracyModel::Stepwise, HitWindow::default()), 0.0);
    }

    #[test]
    fn test_summary_buckets() {
        let mut data = ReplayData::default();
        for deviation in [0.0, 10.0, -40.0, 75.0, 120.0, 149.0] {
            data.push(hit(deviation));
        }
        data.push(ReplayRecord::miss(0.0, 151.0, 0));
        data.push(ReplayRecord::miss(0.0, 151.0, 3));

        // Linear, 150ms: 1.0, 0.933, 0.733, 0.5, 0.2, 0.0067
        let summary = data.summary();
        assert_eq!(summary.perfect_hits, 2);
        assert_eq!(summary.great_hits, 1);
        assert_eq!(summary.good_hits, 1);
        assert_eq!(summary.ok_hits, 2);
        assert_eq!(summary.miss_count, 2);
        assert_eq!(summary.total(), 8);
    }

    #[test]
    fn test_rejudge_records() {
        let records = [hit(5.0), hit(100.0), ReplayRecord::miss(0.0, 151.0, 0)];
        let (stats, accuracy) = rejudge_records(&records, AccuracyModel::OsuOD8, HitWindow::default());
        assert_eq!(stats.marvelous, 1);
        assert_eq!(stats.ok, 1);
        assert_eq!(stats.miss, 1);
        assert!((accuracy - (1.0 + 100.0 / 305.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_json_roundtrip_keeps_sentinel() {
        let mut data = ReplayData::new(1.5, HitWindow::new(120.0), AccuracyModel::Exponential);
        data.push(hit(-12.5));
        data.push(ReplayRecord::miss(3000.0, 3121.0, 3));
        let json = data.to_json().unwrap();
        let back = ReplayData::from_json(&json).unwrap();
        assert_eq!(back, data);
        assert!(back.records[1].is_miss());
    }
}
