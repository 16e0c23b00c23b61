//! Player settings consumed by the judgment core.

use crate::error::Result;
use crate::models::engine::{
    AccuracyModel, DEFAULT_SCROLL_SPEED_MS, DEFAULT_START_DELAY_MS, HitWindow, MAX_RATE, MIN_RATE,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.toml";

/// Clamps a playback rate into `[0.1, 3.0]`, NaN falls back to 1.0.
pub fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        1.0
    } else {
        rate.clamp(MIN_RATE, MAX_RATE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Hit window in ms, always within `[20, 500]`.
    pub hit_window_ms: HitWindow,
    pub accuracy_model: AccuracyModel,
    /// Playback rate, within `[0.1, 3.0]`.
    pub rate: f64,
    /// Time a note is visible before its hit time.
    pub scroll_speed_ms: f64,
    /// Lead-in before the song starts.
    pub start_delay_ms: f64,
    /// Directory used by the replay store.
    pub replay_dir: PathBuf,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            hit_window_ms: HitWindow::default(),
            accuracy_model: AccuracyModel::default(),
            rate: 1.0,
            scroll_speed_ms: DEFAULT_SCROLL_SPEED_MS,
            start_delay_ms: DEFAULT_START_DELAY_MS,
            replay_dir: PathBuf::from("data/r"),
        }
    }
}

impl GameSettings {
    /// Loads settings from `settings.toml` in the working directory.
    pub fn load() -> Result<Self> {
        Self::load_from(SETTINGS_FILE)
    }

    /// Loads settings from `path`, defaults if the file does not exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("SETTINGS: {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content).inspect_err(|e| {
            log::error!("SETTINGS: Failed to parse {:?}: {}", path, e);
        })?;
        Ok(settings.sanitized())
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns a copy with every value clamped into its valid range.
    pub fn sanitized(mut self) -> Self {
        self.rate = clamp_rate(self.rate);
        self.scroll_speed_ms = sanitize_non_negative(self.scroll_speed_ms, DEFAULT_SCROLL_SPEED_MS);
        self.start_delay_ms = sanitize_non_negative(self.start_delay_ms, DEFAULT_START_DELAY_MS);
        self
    }
}

fn sanitize_non_negative(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { fallback }
}
