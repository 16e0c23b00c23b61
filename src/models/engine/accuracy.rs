//! Accuracy models converting a timing deviation into an accuracy fraction.
//!
//! Four models are continuous functions of `|deviation| / hit_window`.
//! The two osu! OD8 variants are step functions of the absolute deviation
//! and ignore the configured hit window.

use serde::{Deserialize, Serialize};
use std::fmt;

/// osu!mania hit values, best first. The last one is a miss.
const OSU_HIT_VALUES: [f64; 6] = [305.0, 300.0, 200.0, 100.0, 50.0, 0.0];
const OSU_MAX_HIT_VALUE: f64 = 305.0;

/// Current osu! OD8 thresholds in ms (MAX, 300, 200, 100, 50).
const OSU_OD8_THRESHOLDS: [f64; 5] = [16.0, 40.0, 73.0, 103.0, 133.0];
/// Legacy osu! OD8 thresholds in ms.
const OSU_OD8_V1_THRESHOLDS: [f64; 5] = [16.0, 40.0, 70.0, 100.0, 130.0];

/// Stepwise bands as (upper ratio bound, accuracy). The first band
/// interpolates from 1.0 down to 0.95.
const STEPWISE_FIRST_BAND: f64 = 0.2;
const STEPWISE_FIRST_BAND_FLOOR: f64 = 0.95;
const STEPWISE_BANDS: [(f64, f64); 3] = [(0.5, 0.80), (0.8, 0.60), (1.0, 0.40)];

const EXPONENTIAL_DECAY: f64 = 5.0;

/// Selectable deviation → accuracy function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccuracyModel {
    #[default]
    Linear,
    Quadratic,
    Stepwise,
    Exponential,
    #[serde(rename = "osuOD8")]
    OsuOD8,
    #[serde(rename = "osuOD8v1")]
    OsuOD8V1,
}

impl AccuracyModel {
    /// Every model, in menu order.
    pub const ALL: [AccuracyModel; 6] = [
        AccuracyModel::Linear,
        AccuracyModel::Quadratic,
        AccuracyModel::Stepwise,
        AccuracyModel::Exponential,
        AccuracyModel::OsuOD8,
        AccuracyModel::OsuOD8V1,
    ];

    /// Accuracy in `[0, 1]` for a signed deviation in ms.
    ///
    /// A non-positive or non-finite hit window yields 0 for every
    /// non-zero deviation on the ratio based models.
    pub fn compute(self, deviation_ms: f64, hit_window_ms: f64) -> f64 {
        let abs_dev = deviation_ms.abs();
        if abs_dev.is_nan() {
            return 0.0;
        }

        let accuracy = match self {
            AccuracyModel::OsuOD8 => osu_step(abs_dev, &OSU_OD8_THRESHOLDS),
            AccuracyModel::OsuOD8V1 => osu_step(abs_dev, &OSU_OD8_V1_THRESHOLDS),
            AccuracyModel::Exponential => (-EXPONENTIAL_DECAY * raw_ratio(abs_dev, hit_window_ms)).exp(),
            AccuracyModel::Linear => 1.0 - clamped_ratio(abs_dev, hit_window_ms),
            AccuracyModel::Quadratic => {
                let x = clamped_ratio(abs_dev, hit_window_ms);
                1.0 - x * x
            }
            AccuracyModel::Stepwise => stepwise(clamped_ratio(abs_dev, hit_window_ms)),
        };

        accuracy.clamp(0.0, 1.0)
    }

    /// Returns `true` for the fixed ms threshold models.
    pub fn is_fixed_threshold(self) -> bool {
        matches!(self, AccuracyModel::OsuOD8 | AccuracyModel::OsuOD8V1)
    }

    pub fn name(self) -> &'static str {
        match self {
            AccuracyModel::Linear => "Linear",
            AccuracyModel::Quadratic => "Quadratic",
            AccuracyModel::Stepwise => "Stepwise",
            AccuracyModel::Exponential => "Exponential",
            AccuracyModel::OsuOD8 => "osuOD8",
            AccuracyModel::OsuOD8V1 => "osuOD8v1",
        }
    }
}

impl fmt::Display for AccuracyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn raw_ratio(abs_dev: f64, hit_window_ms: f64) -> f64 {
    if abs_dev == 0.0 {
        return 0.0;
    }
    if hit_window_ms <= 0.0 || !hit_window_ms.is_finite() {
        return f64::INFINITY;
    }
    abs_dev / hit_window_ms
}

fn clamped_ratio(abs_dev: f64, hit_window_ms: f64) -> f64 {
    raw_ratio(abs_dev, hit_window_ms).clamp(0.0, 1.0)
}

fn stepwise(x: f64) -> f64 {
    if x <= STEPWISE_FIRST_BAND {
        let t = x / STEPWISE_FIRST_BAND;
        return 1.0 - t * (1.0 - STEPWISE_FIRST_BAND_FLOOR);
    }
    if x >= 1.0 {
        return 0.0;
    }
    STEPWISE_BANDS
        .iter()
        .find(|(upper, _)| x <= *upper)
        .map_or(0.0, |(_, accuracy)| *accuracy)
}

fn osu_step(abs_dev: f64, thresholds: &[f64; 5]) -> f64 {
    let tier = thresholds
        .iter()
        .position(|&limit| abs_dev <= limit)
        .unwrap_or(thresholds.len());
    OSU_HIT_VALUES[tier] / OSU_MAX_HIT_VALUE
}
