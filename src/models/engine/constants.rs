//! Gameplay constants shared by the judgment core and its collaborators.

/// Number of lanes on the playfield.
pub const NUM_COLUMNS: usize = 4;

/// Default hit window in milliseconds.
pub const DEFAULT_HIT_WINDOW_MS: f64 = 150.0;
pub const MIN_HIT_WINDOW_MS: f64 = 20.0;
pub const MAX_HIT_WINDOW_MS: f64 = 500.0;

/// Playback rate bounds.
pub const MIN_RATE: f64 = 0.1;
pub const MAX_RATE: f64 = 3.0;

/// Deviation written into a replay record when a note expires unhit.
///
/// Stored replays rely on this value, a record with `|deviation| >= 500`
/// is read back as a miss.
pub const MISS_SENTINEL_MS: f64 = 500.0;

/// How long a hit note stays in the active set for rendering.
pub const HIT_RETENTION_MS: f64 = 500.0;

/// Lead-in before the first note (audio starts after this delay).
pub const DEFAULT_START_DELAY_MS: f64 = 3000.0;

/// Default scroll speed, i.e. how far ahead notes become visible.
pub const DEFAULT_SCROLL_SPEED_MS: f64 = 500.0;

/// Session length used when the beatmap carries no notes and no duration.
pub const FALLBACK_DURATION_MS: f64 = 10_000.0;
