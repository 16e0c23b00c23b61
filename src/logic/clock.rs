//! Pausable monotonic session clock.
//!
//! Time spent stopped is excluded from the elapsed time, so pausing and
//! resuming never makes notes drift.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct GameClock {
    /// Time accumulated by previous running spans.
    accumulated: Duration,
    /// Start of the current running span.
    running_since: Option<Instant>,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    /// Stops the clock and sets elapsed time back to zero.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.running_since = None;
    }

    /// Elapsed running time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms_at(Instant::now())
    }

    /// Starting an already running clock is a no-op.
    pub fn start_at(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn stop_at(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }
    }

    pub fn elapsed_ms_at(&self, now: Instant) -> f64 {
        let running = self
            .running_since
            .map_or(Duration::ZERO, |since| now.saturating_duration_since(since));
        (self.accumulated + running).as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_stopped_clock_does_not_advance() {
        let t0 = Instant::now();
        let clock = GameClock::new();
        assert_eq!(clock.elapsed_ms_at(t0 + ms(500)), 0.0);
        assert!(!clock.is_running());
    }

    #[test]
    fn test_pause_is_excluded() {
        let t0 = Instant::now();
        let mut clock = GameClock::new();
        clock.start_at(t0);
        assert!((clock.elapsed_ms_at(t0 + ms(1000)) - 1000.0).abs() < 1e-6);

        clock.stop_at(t0 + ms(1000));
        assert!((clock.elapsed_ms_at(t0 + ms(4000)) - 1000.0).abs() < 1e-6);

        clock.start_at(t0 + ms(4000));
        assert!((clock.elapsed_ms_at(t0 + ms(4250)) - 1250.0).abs() < 1e-6);
    }

    #[test]
    fn test_double_start_keeps_first_span() {
        let t0 = Instant::now();
        let mut clock = GameClock::new();
        clock.start_at(t0);
        clock.start_at(t0 + ms(300));
        assert!((clock.elapsed_ms_at(t0 + ms(400)) - 400.0).abs() < 1e-6);
    }

    #[test]
    fn test_reset() {
        let t0 = Instant::now();
        let mut clock = GameClock::new();
        clock.start_at(t0);
        clock.stop_at(t0 + ms(200));
        clock.reset();
        assert_eq!(clock.elapsed_ms_at(t0 + ms(900)), 0.0);
        assert!(!clock.is_running());
    }
}
