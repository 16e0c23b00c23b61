//! Note structures and beatmap helpers.

use super::constants::NUM_COLUMNS;
use md5::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A single tap note as sourced from the beatmap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteSpec {
    /// Beatmap-relative hit time in milliseconds (rate independent).
    pub start_time_ms: f64,
    /// Lane index, 0..=3.
    pub column: usize,
}

impl NoteSpec {
    pub fn new(start_time_ms: f64, column: usize) -> Self {
        Self {
            start_time_ms,
            column,
        }
    }

    /// Scheduled time on the session clock.
    ///
    /// `rate` scales the chart, `start_delay_ms` is the lead-in before
    /// the song starts.
    #[inline]
    pub fn rate_adjusted_start(&self, rate: f64, start_delay_ms: f64) -> f64 {
        self.start_time_ms / rate + start_delay_ms
    }

    /// Returns `true` if the note can be played at all.
    pub fn is_well_formed(&self) -> bool {
        self.start_time_ms.is_finite() && self.column < NUM_COLUMNS
    }
}

/// Runtime wrapper of a note that is currently eligible for judging.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveNote {
    /// Index of the note in the beatmap.
    pub index: usize,
    pub spec: NoteSpec,
    /// Whether the note has been hit.
    pub hit: bool,
    /// Session clock of the hit (used to age the note out).
    pub hit_time_ms: Option<f64>,
}

impl ActiveNote {
    pub fn new(index: usize, spec: NoteSpec) -> Self {
        Self {
            index,
            spec,
            hit: false,
            hit_time_ms: None,
        }
    }
}

/// Notes plus the song length, as handed over by the beatmap loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Beatmap {
    pub notes: Vec<NoteSpec>,
    /// Total song duration in milliseconds (rate independent).
    pub duration_ms: f64,
}

impl Beatmap {
    pub fn new(notes: Vec<NoteSpec>, duration_ms: f64) -> Self {
        Self { notes, duration_ms }
    }

    /// Builds a random 4K chart, mostly used by the headless driver.
    pub fn random(seed: u64, note_count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut notes = Vec::with_capacity(note_count);
        let mut current_time = 1000.0;
        for _ in 0..note_count {
            notes.push(NoteSpec::new(current_time, rng.random_range(0..NUM_COLUMNS)));
            current_time += rng.random_range(120.0..450.0);
        }
        Self::new(notes, current_time + 1000.0)
    }

    /// End of the song in beatmap time (last note or declared duration).
    pub fn end_time_ms(&self) -> f64 {
        self.notes
            .iter()
            .map(|n| n.start_time_ms)
            .filter(|t| t.is_finite())
            .fold(self.duration_ms.max(0.0), f64::max)
    }

    /// MD5 over the note data, used to key stored replays.
    pub fn hash(&self) -> String {
        let mut context = Context::new();
        for note in &self.notes {
            context.consume(note.start_time_ms.to_le_bytes());
            context.consume((note.column as u32).to_le_bytes());
        }
        context.consume(self.duration_ms.to_le_bytes());
        format!("{:x}", context.finalize())
    }
}
