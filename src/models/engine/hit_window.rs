//! Hit window configuration.

use super::constants::{DEFAULT_HIT_WINDOW_MS, MAX_HIT_WINDOW_MS, MIN_HIT_WINDOW_MS};
use serde::{Deserialize, Serialize};

/// Maximum absolute deviation (ms) at which a press still registers a hit.
///
/// Always within `[20, 500]`; out of range values are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct HitWindow {
    ms: f64,
}

impl HitWindow {
    pub fn new(ms: f64) -> Self {
        let ms = if ms.is_nan() { DEFAULT_HIT_WINDOW_MS } else { ms };
        Self {
            ms: ms.clamp(MIN_HIT_WINDOW_MS, MAX_HIT_WINDOW_MS),
        }
    }

    #[inline]
    pub fn ms(&self) -> f64 {
        self.ms
    }

    /// Returns `true` if a press with this deviation can hit the note.
    #[inline]
    pub fn contains(&self, deviation_ms: f64) -> bool {
        deviation_ms.abs() <= self.ms
    }

    /// Returns `true` once a note scheduled at `scheduled_ms` can no longer be hit.
    #[inline]
    pub fn has_expired(&self, scheduled_ms: f64, clock_ms: f64) -> bool {
        scheduled_ms < clock_ms - self.ms
    }
}

impl Default for HitWindow {
    fn default() -> Self {
        Self::new(DEFAULT_HIT_WINDOW_MS)
    }
}

impl From<f64> for HitWindow {
    fn from(ms: f64) -> Self {
        Self::new(ms)
    }
}

impl From<HitWindow> for f64 {
    fn from(window: HitWindow) -> Self {
        window.ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        assert_eq!(HitWindow::new(5.0).ms(), 20.0);
        assert_eq!(HitWindow::new(900.0).ms(), 500.0);
        assert_eq!(HitWindow::new(180.0).ms(), 180.0);
        assert_eq!(HitWindow::new(f64::NAN).ms(), 150.0);
        assert_eq!(HitWindow::default().ms(), 150.0);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let window = HitWindow::new(150.0);
        assert!(window.contains(150.0));
        assert!(window.contains(-150.0));
        assert!(!window.contains(150.01));

        assert!(!window.has_expired(1000.0, 1150.0));
        assert!(window.has_expired(1000.0, 1150.5));
    }

    #[test]
    fn test_deserialize_clamps() {
        let window: HitWindow = serde_json::from_str("1000.0").unwrap();
        assert_eq!(window.ms(), 500.0);
    }
}
