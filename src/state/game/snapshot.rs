//! Snapshot creation for JudgmentCore - get_snapshot

use super::JudgmentCore;
use crate::models::engine::{ActiveNote, NUM_COLUMNS};
use crate::models::stats::{HitStats, Judgement};

/// Per-frame state handed to the renderer.
#[derive(Clone, Debug)]
pub struct GameplaySnapshot {
    /// Session clock in milliseconds.
    pub clock_ms: f64,
    /// Playback rate multiplier.
    pub rate: f64,

    /// Notes currently in the window, with their hit state.
    pub active_notes: Vec<ActiveNote>,
    /// Per-lane key held state.
    pub keys_held: [bool; NUM_COLUMNS],

    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    /// Mean accuracy in `[0, 1]`.
    pub accuracy: f64,
    pub hit_stats: HitStats,
    pub remaining_notes: usize,

    /// Last judgement (for flash display).
    pub last_judgement: Option<Judgement>,
    /// Last hit deviation in ms (hit error bar).
    pub last_deviation_ms: Option<f64>,
    /// Lane presses in the last second.
    pub presses_per_second: usize,
}

impl JudgmentCore {
    /// Creates a snapshot of the current state for rendering.
    pub fn get_snapshot(&self) -> GameplaySnapshot {
        GameplaySnapshot {
            clock_ms: self.clock_ms,
            rate: self.rate,
            active_notes: self.active_notes.clone(),
            keys_held: self.keys_held,
            score: self.accumulator.score,
            combo: self.accumulator.combo,
            max_combo: self.accumulator.max_combo,
            accuracy: self.accumulator.current_accuracy(),
            hit_stats: self.accumulator.hit_stats.clone(),
            remaining_notes: self.remaining_notes(),
            last_judgement: self.last_judgement,
            last_deviation_ms: self.last_deviation_ms,
            presses_per_second: self.press_timestamps.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::models::engine::{Beatmap, NoteSpec};
    use crate::models::stats::Judgement;
    use crate::state::game::JudgmentCore;

    #[test]
    fn test_snapshot_reflects_state() {
        let notes = vec![NoteSpec::new(1000.0, 0), NoteSpec::new(1200.0, 1), NoteSpec::new(5000.0, 2)];
        let mut core = JudgmentCore::new(Beatmap::new(notes, 6000.0));
        core.set_start_delay(0.0);
        core.reset();

        core.update(900.0);
        core.on_lane_press(0, 1010.0);
        core.update(1400.0);

        let snap = core.get_snapshot();
        assert_eq!(snap.clock_ms, 1400.0);
        assert_eq!(snap.score, 100);
        assert_eq!(snap.combo, 0);
        assert_eq!(snap.max_combo, 1);
        assert_eq!(snap.hit_stats.miss, 1);
        assert_eq!(snap.remaining_notes, 1);
        assert_eq!(snap.last_judgement, Some(Judgement::Miss));
        assert_eq!(snap.last_deviation_ms, Some(10.0));
        assert_eq!(snap.presses_per_second, 1);
        assert_eq!(snap.active_notes.len(), 1);
        assert!(snap.active_notes[0].hit);
        assert!(snap.keys_held[0]);
        assert!((snap.accuracy - (1.0 - 10.0 / 150.0) / 2.0).abs() < 1e-9);
    }
}
