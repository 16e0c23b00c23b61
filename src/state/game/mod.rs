//! Note timing and judgment core.
//!
//! `JudgmentCore` owns every piece of per-attempt state:
//! - the schedule of notes and the active-note window
//! - hit evaluation of lane presses
//! - score/combo accumulation
//! - the replay records of every judgement
//!
//! It is driven by a session clock in milliseconds and never reads time
//! on its own.

mod input;
mod notes;
mod snapshot;

use crate::models::engine::{
    AccuracyModel, ActiveNote, Beatmap, DEFAULT_SCROLL_SPEED_MS, DEFAULT_START_DELAY_MS,
    FALLBACK_DURATION_MS, HitWindow, NUM_COLUMNS, NoteSpec,
};
use crate::models::replay::{ReplayData, SessionResult};
use crate::models::score::RunAccumulator;
use crate::models::settings::{GameSettings, clamp_rate};
use crate::models::stats::Judgement;
use std::collections::VecDeque;

pub use snapshot::GameplaySnapshot;

/// Main judgment engine for one beatmap.
pub struct JudgmentCore {
    /// Notes as handed over by the beatmap source.
    notes: Vec<NoteSpec>,
    /// Indices of playable notes, in start time order.
    schedule: Vec<usize>,
    /// Next entry of `schedule` waiting for activation.
    next_index: usize,
    /// Notes currently eligible for hits or misses, in activation order.
    active_notes: Vec<ActiveNote>,
    /// Notes that can never be activated.
    dropped_notes: usize,
    /// Song length in beatmap time.
    song_length_ms: f64,
    beatmap_hash: String,

    /// Score, combo and running accuracy.
    pub accumulator: RunAccumulator,
    /// One record per judged note.
    pub replay_data: ReplayData,

    rate: f64,
    start_delay_ms: f64,
    hit_window: HitWindow,
    accuracy_model: AccuracyModel,
    visibility_lookahead_ms: f64,

    /// Last session clock seen by `update`.
    clock_ms: f64,
    /// Currently held lanes.
    keys_held: [bool; NUM_COLUMNS],
    /// Tier of the last judgement (for flash display).
    last_judgement: Option<Judgement>,
    /// Signed deviation of the last press that hit.
    last_deviation_ms: Option<f64>,
    /// Press times in the last second.
    press_timestamps: VecDeque<f64>,
}

impl JudgmentCore {
    /// Creates a core with default configuration.
    pub fn new(beatmap: Beatmap) -> Self {
        let mut core = Self {
            beatmap_hash: beatmap.hash(),
            song_length_ms: beatmap.end_time_ms(),
            notes: beatmap.notes,
            schedule: Vec::new(),
            next_index: 0,
            active_notes: Vec::new(),
            dropped_notes: 0,
            accumulator: RunAccumulator::new(),
            replay_data: ReplayData::default(),
            rate: 1.0,
            start_delay_ms: DEFAULT_START_DELAY_MS,
            hit_window: HitWindow::default(),
            accuracy_model: AccuracyModel::default(),
            visibility_lookahead_ms: DEFAULT_SCROLL_SPEED_MS,
            clock_ms: 0.0,
            keys_held: [false; NUM_COLUMNS],
            last_judgement: None,
            last_deviation_ms: None,
            press_timestamps: VecDeque::new(),
        };
        core.reset();
        core
    }

    /// Creates a core configured from player settings.
    pub fn from_settings(beatmap: Beatmap, settings: &GameSettings) -> Self {
        let mut core = Self::new(beatmap);
        core.set_rate(settings.rate);
        core.set_start_delay(settings.start_delay_ms);
        core.hit_window = settings.hit_window_ms;
        core.accuracy_model = settings.accuracy_model;
        core.set_visibility_lookahead(settings.scroll_speed_ms);
        core.reset();
        core
    }

    /// Clears all attempt state and rebuilds the note schedule.
    ///
    /// Configuration changes made since the last reset take effect here.
    pub fn reset(&mut self) {
        self.build_schedule();
        self.active_notes.clear();
        self.accumulator.reset();
        self.replay_data = ReplayData::new(self.rate, self.hit_window, self.accuracy_model);
        self.clock_ms = 0.0;
        self.keys_held = [false; NUM_COLUMNS];
        self.last_judgement = None;
        self.last_deviation_ms = None;
        self.press_timestamps.clear();
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Sets the playback rate, clamped into `[0.1, 3.0]`.
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = clamp_rate(rate);
    }

    pub fn hit_window(&self) -> HitWindow {
        self.hit_window
    }

    /// Sets the hit window, clamped into `[20, 500]` ms.
    pub fn set_hit_window(&mut self, ms: f64) {
        self.hit_window = HitWindow::new(ms);
    }

    pub fn accuracy_model(&self) -> AccuracyModel {
        self.accuracy_model
    }

    pub fn set_accuracy_model(&mut self, model: AccuracyModel) {
        self.accuracy_model = model;
    }

    pub fn start_delay_ms(&self) -> f64 {
        self.start_delay_ms
    }

    pub fn set_start_delay(&mut self, ms: f64) {
        self.start_delay_ms = if ms.is_finite() { ms.max(0.0) } else { 0.0 };
    }

    /// Sets how far ahead of its hit time a note becomes active.
    ///
    /// Derived by the renderer from scroll speed and screen geometry.
    pub fn set_visibility_lookahead(&mut self, ms: f64) {
        self.visibility_lookahead_ms = if ms.is_finite() { ms.max(0.0) } else { 0.0 };
    }

    pub fn beatmap_hash(&self) -> &str {
        &self.beatmap_hash
    }

    /// Notes that are never activated nor judged.
    pub fn dropped_notes(&self) -> usize {
        self.dropped_notes
    }

    /// Number of notes that will be judged in this attempt.
    pub fn playable_notes(&self) -> usize {
        self.schedule.len()
    }

    pub fn active_notes(&self) -> &[ActiveNote] {
        &self.active_notes
    }

    pub fn keys_held(&self) -> &[bool; NUM_COLUMNS] {
        &self.keys_held
    }

    /// Notes not judged yet.
    pub fn remaining_notes(&self) -> usize {
        self.schedule
            .len()
            .saturating_sub(self.accumulator.total_notes as usize)
    }

    /// Session clock at which the attempt ends.
    pub fn song_end_ms(&self) -> f64 {
        let length = if self.song_length_ms > 0.0 {
            self.song_length_ms
        } else {
            FALLBACK_DURATION_MS
        };
        length / self.rate + self.start_delay_ms
    }

    /// Returns `true` once every note is judged and the song is over.
    pub fn is_finished(&self, clock_ms: f64) -> bool {
        self.remaining_notes() == 0 && clock_ms >= self.song_end_ms()
    }

    /// Final accumulator snapshot and records for persistence.
    pub fn session_result(&self, timestamp: i64) -> SessionResult {
        SessionResult {
            beatmap_hash: self.beatmap_hash.clone(),
            accumulator: self.accumulator.clone(),
            replay: self.replay_data.clone(),
            summary: self.replay_data.summary(),
            timestamp,
        }
    }

    /// Scheduled time of a note on the session clock.
    #[inline]
    pub fn scheduled_time(&self, spec: &NoteSpec) -> f64 {
        spec.rate_adjusted_start(self.rate, self.start_delay_ms)
    }

    /// Rolling presses-per-second counter.
    fn update_pps(&mut self, clock_ms: f64) {
        let window_start = clock_ms - 1000.0;
        while let Some(&oldest) = self.press_timestamps.front() {
            if oldest < window_start {
                self.press_timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}
