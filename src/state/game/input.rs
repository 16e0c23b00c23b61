//! Hit evaluation of lane presses.

use super::JudgmentCore;
use crate::models::engine::NUM_COLUMNS;
use crate::models::replay::ReplayRecord;
use crate::models::stats::JudgmentResult;

impl JudgmentCore {
    /// Judges a press on `lane` at session time `clock_ms`.
    ///
    /// The first active, unhit note of the lane (in activation order) whose
    /// deviation lies within the hit window is judged. Presses that match
    /// nothing are ignored without penalty.
    pub fn on_lane_press(&mut self, lane: usize, clock_ms: f64) -> Option<JudgmentResult> {
        if lane >= NUM_COLUMNS {
            log::warn!("ENGINE: Ignoring press on unknown lane {}", lane);
            return None;
        }
        self.keys_held[lane] = true;
        self.press_timestamps.push_back(clock_ms);

        // Notes entering the window this frame must be hittable right away.
        self.activate_notes(clock_ms);

        let hit_window = self.hit_window;
        let (rate, start_delay) = (self.rate, self.start_delay_ms);
        let slot = self.active_notes.iter().position(|note| {
            !note.hit
                && note.spec.column == lane
                && hit_window.contains(clock_ms - note.spec.rate_adjusted_start(rate, start_delay))
        })?;

        let note = &mut self.active_notes[slot];
        note.hit = true;
        note.hit_time_ms = Some(clock_ms);

        let note_time_ms = note.spec.rate_adjusted_start(rate, start_delay);
        let deviation_ms = clock_ms - note_time_ms;
        let accuracy = self.accuracy_model.compute(deviation_ms, hit_window.ms());
        let judgement = self.accumulator.on_hit(accuracy);

        let result = JudgmentResult {
            note_time_ms,
            hit_time_ms: clock_ms,
            deviation_ms,
            column: lane,
            accuracy,
            judgement,
        };
        self.replay_data.push(ReplayRecord::from_result(&result));
        self.last_judgement = Some(judgement);
        self.last_deviation_ms = Some(deviation_ms);

        log::trace!(
            "ENGINE: {} on col {} ({:+.1}ms, acc {:.3})",
            judgement.label(),
            lane,
            deviation_ms,
            accuracy
        );
        Some(result)
    }

    /// Releases never judge, they only update the held state.
    pub fn on_lane_release(&mut self, lane: usize) {
        if let Some(held) = self.keys_held.get_mut(lane) {
            *held = false;
        }
    }
}
