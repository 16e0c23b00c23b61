//! Active-note window: activation, miss resolution and aging of hit notes.

use super::JudgmentCore;
use crate::models::engine::{ActiveNote, HIT_RETENTION_MS, MISS_SENTINEL_MS};
use crate::models::replay::ReplayRecord;
use crate::models::stats::{Judgement, JudgmentResult};

impl JudgmentCore {
    /// Sorts playable notes by start time and drops the ones that can
    /// never enter the window.
    ///
    /// A note is dropped when its start time is not finite, its column is
    /// out of range, or its scheduled time is already expired at clock 0.
    pub(crate) fn build_schedule(&mut self) {
        let hit_window = self.hit_window;
        let mut schedule: Vec<usize> = Vec::with_capacity(self.notes.len());
        let mut dropped = 0;

        for (idx, spec) in self.notes.iter().enumerate() {
            let scheduled = spec.rate_adjusted_start(self.rate, self.start_delay_ms);
            if !spec.is_well_formed() || hit_window.has_expired(scheduled, 0.0) {
                log::warn!(
                    "ENGINE: Dropping unplayable note #{} (t={} col={})",
                    idx,
                    spec.start_time_ms,
                    spec.column
                );
                dropped += 1;
                continue;
            }
            schedule.push(idx);
        }

        // Stable: simultaneous notes keep beatmap order.
        let notes = &self.notes;
        schedule.sort_by(|&a, &b| notes[a].start_time_ms.total_cmp(&notes[b].start_time_ms));

        self.schedule = schedule;
        self.next_index = 0;
        self.dropped_notes = dropped;
    }

    /// Advances the window to `clock_ms` and returns the misses it resolved.
    ///
    /// This:
    /// 1. Activates notes entering the visibility window
    /// 2. Turns expired unhit notes into misses
    /// 3. Removes hit notes after their display time
    pub fn update(&mut self, clock_ms: f64) -> Vec<JudgmentResult> {
        self.clock_ms = clock_ms;
        self.activate_notes(clock_ms);
        let misses = self.resolve_misses(clock_ms);
        self.age_out_hits(clock_ms);
        self.update_pps(clock_ms);
        misses
    }

    /// Moves every scheduled note whose time is within the lookahead into
    /// the active set.
    ///
    /// Notes passed over by a long frame are activated too, the miss pass
    /// resolves them in the same update.
    pub(crate) fn activate_notes(&mut self, clock_ms: f64) {
        let horizon = clock_ms + self.visibility_lookahead_ms;

        while self.next_index < self.schedule.len() {
            let idx = self.schedule[self.next_index];
            let spec = self.notes[idx];
            if self.scheduled_time(&spec) > horizon {
                break;
            }
            self.active_notes.push(ActiveNote::new(idx, spec));
            self.next_index += 1;
        }
    }

    /// Resolves every active, unhit note whose hit window has passed.
    fn resolve_misses(&mut self, clock_ms: f64) -> Vec<JudgmentResult> {
        let hit_window = self.hit_window;
        let (rate, start_delay) = (self.rate, self.start_delay_ms);
        let mut expired: Vec<ActiveNote> = Vec::new();

        self.active_notes.retain(|note| {
            let scheduled = note.spec.rate_adjusted_start(rate, start_delay);
            if !note.hit && hit_window.has_expired(scheduled, clock_ms) {
                expired.push(note.clone());
                false
            } else {
                true
            }
        });

        expired
            .into_iter()
            .map(|note| {
                let note_time_ms = self.scheduled_time(&note.spec);
                // Stamped at the expiry, not at the frame that noticed it.
                let expiry_ms = note_time_ms + hit_window.ms();
                let result = JudgmentResult {
                    note_time_ms,
                    hit_time_ms: expiry_ms,
                    deviation_ms: MISS_SENTINEL_MS,
                    column: note.spec.column,
                    accuracy: 0.0,
                    judgement: Judgement::Miss,
                };
                self.accumulator.on_miss();
                self.replay_data.push(ReplayRecord::miss(
                    note_time_ms,
                    expiry_ms,
                    note.spec.column,
                ));
                self.last_judgement = Some(Judgement::Miss);
                log::debug!(
                    "ENGINE: Miss on note #{} (col {}) at {:.1}ms",
                    note.index,
                    note.spec.column,
                    clock_ms
                );
                result
            })
            .collect()
    }

    /// Drops hit notes once they have been displayed long enough.
    fn age_out_hits(&mut self, clock_ms: f64) {
        self.active_notes.retain(|note| match note.hit_time_ms {
            Some(hit_time) => clock_ms - hit_time < HIT_RETENTION_MS,
            None => true,
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::models::engine::{Beatmap, NoteSpec};
    use crate::state::game::JudgmentCore;

    fn core_with(notes: Vec<NoteSpec>) -> JudgmentCore {
        let mut core = JudgmentCore::new(Beatmap::new(notes, 0.0));
        core.set_start_delay(0.0);
        core.set_visibility_lookahead(500.0);
        core.set_hit_window(150.0);
        core.reset();
        core
    }

    #[test]
    fn test_activation_follows_lookahead() {
        let mut core = core_with(vec![NoteSpec::new(1000.0, 0), NoteSpec::new(1600.0, 1)]);

        core.update(400.0);
        assert!(core.active_notes().is_empty());

        core.update(500.0);
        assert_eq!(core.active_notes().len(), 1);
        assert_eq!(core.active_notes()[0].spec.column, 0);

        core.update(1100.0);
        assert_eq!(core.active_notes().len(), 2);
    }

    #[test]
    fn test_expired_note_becomes_miss() {
        let mut core = core_with(vec![NoteSpec::new(1000.0, 2)]);
        core.update(900.0);
        assert!(core.update(1150.0).is_empty());

        let misses = core.update(1151.0);
        assert_eq!(misses.len(), 1);
        assert_eq!(misses[0].deviation_ms, 500.0);
        assert_eq!(misses[0].accuracy, 0.0);
        assert_eq!(misses[0].column, 2);
        assert!(core.active_notes().is_empty());
        assert_eq!(core.accumulator.total_notes, 1);
        assert_eq!(core.replay_data.records.len(), 1);
        assert!(core.replay_data.records[0].is_miss());

        // Never judged twice.
        assert!(core.update(5000.0).is_empty());
        assert_eq!(core.accumulator.total_notes, 1);
    }

    #[test]
    fn test_long_frame_still_judges_every_note() {
        let notes = (0..10).map(|i| NoteSpec::new(1000.0 + i as f64 * 100.0, i % 4)).collect();
        let mut core = core_with(notes);

        let misses = core.update(10_000.0);
        assert_eq!(misses.len(), 10);
        assert_eq!(core.remaining_notes(), 0);
        assert_eq!(core.accumulator.hit_stats.miss, 10);
    }

    #[test]
    fn test_miss_is_stamped_at_expiry() {
        let mut core = core_with(vec![NoteSpec::new(1000.0, 0), NoteSpec::new(1200.0, 1)]);
        core.update(900.0);

        let misses = core.update(4000.0);
        assert_eq!(misses.len(), 2);
        assert_eq!(misses[0].hit_time_ms, 1150.0);
        assert_eq!(misses[1].hit_time_ms, 1350.0);

        let records = &core.replay_data.records;
        assert_eq!(records[0].hit_time_ms, 1150.0);
        assert_eq!(records[1].hit_time_ms, 1350.0);
        assert_eq!(records[1].deviation_ms, 500.0);
    }

    #[test]
    fn test_unsorted_input_is_scheduled_in_time_order() {
        let mut core = core_with(vec![
            NoteSpec::new(3000.0, 0),
            NoteSpec::new(1000.0, 1),
            NoteSpec::new(2000.0, 2),
        ]);
        core.set_visibility_lookahead(2500.0);
        core.update(1000.0);
        let active: Vec<usize> = core.active_notes().iter().map(|n| n.spec.column).collect();
        assert_eq!(active, vec![1, 2, 0]);
    }

    #[test]
    fn test_unplayable_notes_are_dropped() {
        let core = core_with(vec![
            NoteSpec::new(f64::NAN, 0),
            NoteSpec::new(1000.0, 7),
            NoteSpec::new(-400.0, 1),
            NoteSpec::new(-100.0, 1),
            NoteSpec::new(1000.0, 3),
        ]);
        assert_eq!(core.dropped_notes(), 3);
        assert_eq!(core.playable_notes(), 2);
    }

    #[test]
    fn test_hit_note_ages_out() {
        let mut core = core_with(vec![NoteSpec::new(1000.0, 0)]);
        core.update(990.0);
        assert!(core.on_lane_press(0, 1000.0).is_some());
        core.update(1200.0);
        assert_eq!(core.active_notes().len(), 1);
        assert!(core.active_notes()[0].hit);

        // Hit notes never expire into a miss.
        assert!(core.update(1499.0).is_empty());
        core.update(1500.0);
        assert!(core.active_notes().is_empty());
        assert_eq!(core.accumulator.hit_stats.miss, 0);
    }

    #[test]
    fn test_rate_scales_schedule() {
        let mut core = core_with(vec![NoteSpec::new(1000.0, 0)]);
        core.set_rate(2.0);
        core.reset();
        // Scheduled at 500ms, active from 0ms, expires after 650ms.
        core.update(0.0);
        assert_eq!(core.active_notes().len(), 1);
        assert!(core.update(650.0).is_empty());
        assert_eq!(core.update(651.0).len(), 1);
    }

    #[test]
    fn test_empty_beatmap_runs_to_fallback() {
        let mut core = core_with(Vec::new());
        assert!(core.update(100.0).is_empty());
        assert_eq!(core.accumulator.current_accuracy(), 0.0);
        assert!(!core.is_finished(9_999.0));
        assert!(core.is_finished(10_000.0));
    }
}
