//! Session lifecycle around the judgment core.
//!
//! A session owns the pausable clock and drives the core once per frame.
//! The lead-in audio start and the song preview are deferred tasks; each
//! start or stop bumps the session generation so a task scheduled for an
//! earlier attempt turns into a no-op when it fires.

use crate::input::events::GameAction;
use crate::logic::clock::GameClock;
use crate::logic::scheduler::DeferredScheduler;
use crate::models::replay::SessionResult;
use crate::models::stats::JudgmentResult;
use crate::state::game::{GameplaySnapshot, JudgmentCore};
use crate::system::bus::{AudioCommand, DeferredEvent};
use crossbeam_channel::Sender;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No attempt started yet.
    Idle,
    Running,
    Paused,
    /// Stopped before the end; no further judgements.
    Stopped,
    /// Every note judged and the song is over.
    Finished,
}

pub struct Session {
    core: JudgmentCore,
    clock: GameClock,
    phase: SessionPhase,
    generation: u64,
    audio_started: bool,
    scheduler: DeferredScheduler,
    audio_tx: Sender<AudioCommand>,
    /// Deferred tasks of the current generation.
    pending: Vec<JoinHandle<()>>,
}

impl Session {
    pub fn new(core: JudgmentCore, scheduler: DeferredScheduler, audio_tx: Sender<AudioCommand>) -> Self {
        Self {
            core,
            clock: GameClock::new(),
            phase: SessionPhase::Idle,
            generation: 0,
            audio_started: false,
            scheduler,
            audio_tx,
            pending: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn core(&self) -> &JudgmentCore {
        &self.core
    }

    /// Mutable access for configuration, refused while an attempt is in play.
    pub fn core_mut(&mut self) -> Option<&mut JudgmentCore> {
        match self.phase {
            SessionPhase::Running | SessionPhase::Paused => None,
            _ => Some(&mut self.core),
        }
    }

    pub fn is_in_play(&self) -> bool {
        matches!(self.phase, SessionPhase::Running | SessionPhase::Paused)
    }

    pub fn begin(&mut self) {
        self.begin_at(Instant::now());
    }

    /// Starts a new attempt: resets the core, starts the clock and
    /// schedules the audio start after the lead-in.
    pub fn begin_at(&mut self, now: Instant) {
        self.cancel_pending();
        self.generation += 1;
        self.core.reset();
        self.clock.reset();
        self.clock.start_at(now);
        self.audio_started = false;
        self.phase = SessionPhase::Running;

        self.send_audio(AudioCommand::Stop);
        self.send_audio(AudioCommand::SetSpeed {
            speed: self.core.rate() as f32,
        });
        self.schedule_audio_start(self.core.start_delay_ms());

        log::info!(
            "SESSION: Attempt #{} started ({} notes, {} dropped, rate {:.2}x, {} / {:.0}ms)",
            self.generation,
            self.core.playable_notes(),
            self.core.dropped_notes(),
            self.core.rate(),
            self.core.accuracy_model(),
            self.core.hit_window().ms()
        );
    }

    /// Schedules the song preview, only outside of an attempt.
    pub fn schedule_preview(&mut self, delay_ms: f64, position_ms: f64) {
        if self.is_in_play() {
            log::warn!("SESSION: Ignoring preview request during play");
            return;
        }
        let handle = self.scheduler.schedule(
            delay_ms,
            DeferredEvent::PreviewStart {
                generation: self.generation,
                position_ms,
            },
        );
        self.pending.push(handle);
    }

    /// Applies a completed deferred task. Returns `true` if it took effect.
    pub fn handle_deferred(&mut self, event: DeferredEvent) -> bool {
        if event.generation() != self.generation {
            log::debug!(
                "SESSION: Dropping stale {:?} (current generation {})",
                event,
                self.generation
            );
            return false;
        }

        match event {
            DeferredEvent::AudioStart { .. } => {
                if self.phase != SessionPhase::Running || self.audio_started {
                    return false;
                }
                self.audio_started = true;
                self.send_audio(AudioCommand::Play);
                log::debug!("SESSION: Audio started");
                true
            }
            DeferredEvent::PreviewStart { position_ms, .. } => {
                if self.is_in_play() {
                    return false;
                }
                self.send_audio(AudioCommand::Preview { position_ms });
                true
            }
        }
    }

    pub fn pause_at(&mut self, now: Instant) {
        if self.phase != SessionPhase::Running {
            return;
        }
        self.clock.stop_at(now);
        // Re-scheduled with the remaining lead-in on resume.
        self.cancel_pending();
        if self.audio_started {
            self.send_audio(AudioCommand::Pause);
        }
        self.phase = SessionPhase::Paused;
        log::info!("SESSION: Paused at {:.1}ms", self.clock.elapsed_ms_at(now));
    }

    pub fn resume_at(&mut self, now: Instant) {
        if self.phase != SessionPhase::Paused {
            return;
        }
        self.clock.start_at(now);
        self.phase = SessionPhase::Running;
        if self.audio_started {
            self.send_audio(AudioCommand::Resume);
        } else {
            let remaining = self.core.start_delay_ms() - self.clock.elapsed_ms_at(now);
            self.schedule_audio_start(remaining);
        }
        log::info!("SESSION: Resumed");
    }

    pub fn toggle_pause_at(&mut self, now: Instant) {
        match self.phase {
            SessionPhase::Running => self.pause_at(now),
            SessionPhase::Paused => self.resume_at(now),
            _ => {}
        }
    }

    /// Stops the attempt. Pending deferred tasks become no-ops.
    pub fn stop(&mut self) {
        if !self.is_in_play() {
            return;
        }
        self.generation += 1;
        self.cancel_pending();
        self.clock.stop();
        self.send_audio(AudioCommand::Stop);
        self.phase = SessionPhase::Stopped;
        log::info!("SESSION: Stopped");
    }

    pub fn frame(&mut self, actions: impl IntoIterator<Item = GameAction>) -> Vec<JudgmentResult> {
        self.frame_at(Instant::now(), actions)
    }

    /// Runs one frame: applies queued actions in arrival order, then
    /// advances the note window. Returns every judgement of the frame.
    pub fn frame_at(
        &mut self,
        now: Instant,
        actions: impl IntoIterator<Item = GameAction>,
    ) -> Vec<JudgmentResult> {
        let mut judgements = Vec::new();

        for action in actions {
            match action {
                GameAction::Hit { column } => {
                    if self.phase == SessionPhase::Running {
                        let clock_ms = self.clock.elapsed_ms_at(now);
                        judgements.extend(self.core.on_lane_press(column, clock_ms));
                    }
                }
                GameAction::Release { column } => self.core.on_lane_release(column),
                GameAction::TogglePause => self.toggle_pause_at(now),
                GameAction::Restart => self.begin_at(now),
            }
        }

        if self.phase != SessionPhase::Running {
            return judgements;
        }

        let clock_ms = self.clock.elapsed_ms_at(now);
        judgements.extend(self.core.update(clock_ms));

        if self.core.is_finished(clock_ms) {
            self.finish(now);
        }
        judgements
    }

    fn finish(&mut self, now: Instant) {
        self.clock.stop_at(now);
        self.cancel_pending();
        self.phase = SessionPhase::Finished;

        let acc = &self.core.accumulator;
        log::info!(
            "SESSION: Finished - score {} | max combo {} | accuracy {:.2}% | {} notes",
            acc.score,
            acc.max_combo,
            acc.current_accuracy() * 100.0,
            acc.total_notes
        );
    }

    /// Session clock in ms.
    pub fn clock_ms(&self) -> f64 {
        self.clock.elapsed_ms()
    }

    pub fn snapshot(&self) -> GameplaySnapshot {
        self.core.get_snapshot()
    }

    /// Accumulator snapshot and replay records for persistence.
    pub fn result(&self) -> SessionResult {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs() as i64);
        self.core.session_result(timestamp)
    }

    fn schedule_audio_start(&mut self, delay_ms: f64) {
        let handle = self.scheduler.schedule(
            delay_ms,
            DeferredEvent::AudioStart {
                generation: self.generation,
            },
        );
        self.pending.push(handle);
    }

    fn cancel_pending(&mut self) {
        for handle in self.pending.drain(..) {
            handle.abort();
        }
    }

    fn send_audio(&self, command: AudioCommand) {
        if self.audio_tx.send(command).is_err() {
            log::debug!("SESSION: Audio collaborator is gone");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::{Beatmap, NoteSpec};
    use crossbeam_channel::{Receiver, unbounded};
    use std::time::Duration;

    struct Harness {
        session: Session,
        audio_rx: Receiver<AudioCommand>,
        deferred_rx: Receiver<DeferredEvent>,
    }

    fn harness(notes: Vec<NoteSpec>, start_delay_ms: f64) -> Harness {
        let (audio_tx, audio_rx) = unbounded();
        let (deferred_tx, deferred_rx) = unbounded();
        let mut core = JudgmentCore::new(Beatmap::new(notes, 0.0));
        core.set_start_delay(start_delay_ms);
        let scheduler = DeferredScheduler::new(deferred_tx).unwrap();
        Harness {
            session: Session::new(core, scheduler, audio_tx),
            audio_rx,
            deferred_rx,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(rx: &Receiver<AudioCommand>) -> Vec<AudioCommand> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_presses_are_judged_on_session_clock() {
        let mut h = harness(vec![NoteSpec::new(1000.0, 0)], 3000.0);
        let t0 = Instant::now();
        h.session.begin_at(t0);

        let judged = h.session.frame_at(t0 + ms(4000), [GameAction::Hit { column: 0 }]);
        assert_eq!(judged.len(), 1);
        assert!(judged[0].deviation_ms.abs() < 1e-6);
        assert_eq!(h.session.core().accumulator.score, 100);
    }

    #[test]
    fn test_pause_excludes_time_and_ignores_presses() {
        let mut h = harness(vec![NoteSpec::new(1000.0, 1)], 0.0);
        let t0 = Instant::now();
        h.session.begin_at(t0);
        h.session.frame_at(t0 + ms(500), []);

        h.session.frame_at(t0 + ms(600), [GameAction::TogglePause]);
        assert_eq!(h.session.phase(), SessionPhase::Paused);
        assert!(h.session.frame_at(t0 + ms(5000), [GameAction::Hit { column: 1 }]).is_empty());

        h.session.frame_at(t0 + ms(9000), [GameAction::TogglePause]);
        assert_eq!(h.session.phase(), SessionPhase::Running);

        // 600ms before the pause + 400ms after it.
        let judged = h.session.frame_at(t0 + ms(9400), [GameAction::Hit { column: 1 }]);
        assert_eq!(judged.len(), 1);
        assert!(judged[0].deviation_ms.abs() < 1e-6);
    }

    #[test]
    fn test_stop_prevents_further_judgements() {
        let mut h = harness(vec![NoteSpec::new(1000.0, 0), NoteSpec::new(2000.0, 0)], 0.0);
        let t0 = Instant::now();
        h.session.begin_at(t0);
        h.session.frame_at(t0 + ms(900), []);
        h.session.stop();

        assert_eq!(h.session.phase(), SessionPhase::Stopped);
        assert!(h.session.frame_at(t0 + ms(1000), [GameAction::Hit { column: 0 }]).is_empty());
        assert!(h.session.frame_at(t0 + ms(9000), []).is_empty());
        assert_eq!(h.session.core().accumulator.total_notes, 0);
        assert!(drain(&h.audio_rx).contains(&AudioCommand::Stop));
    }

    #[test]
    fn test_stale_deferred_start_is_a_no_op() {
        let mut h = harness(Vec::new(), 3000.0);
        h.session.begin();
        let stale = DeferredEvent::AudioStart {
            generation: h.session.generation(),
        };
        h.session.stop();
        drain(&h.audio_rx);

        assert!(!h.session.handle_deferred(stale));
        assert!(drain(&h.audio_rx).is_empty());

        // A newer attempt also ignores it.
        h.session.begin();
        assert!(!h.session.handle_deferred(stale));
        assert!(!drain(&h.audio_rx).contains(&AudioCommand::Play));
    }

    #[test]
    fn test_deferred_audio_start_fires_once() {
        let mut h = harness(Vec::new(), 10.0);
        h.session.begin();

        let event = h.deferred_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(h.session.handle_deferred(event));
        assert!(drain(&h.audio_rx).contains(&AudioCommand::Play));
        assert!(!h.session.handle_deferred(event));
    }

    #[test]
    fn test_pause_during_lead_in_reschedules_audio_start() {
        let mut h = harness(Vec::new(), 400.0);
        h.session.begin();
        std::thread::sleep(ms(100));
        h.session.pause_at(Instant::now());

        // The lead-in task is aborted while paused.
        assert!(h.deferred_rx.recv_timeout(ms(500)).is_err());

        let resumed = Instant::now();
        h.session.resume_at(resumed);
        let event = h.deferred_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(resumed.elapsed() >= ms(100));
        assert!(h.session.handle_deferred(event));
        assert!(h.deferred_rx.recv_timeout(ms(500)).is_err());

        let plays = drain(&h.audio_rx)
            .into_iter()
            .filter(|cmd| *cmd == AudioCommand::Play)
            .count();
        assert_eq!(plays, 1);
    }

    #[test]
    fn test_non_finite_lead_in_does_not_stall_begin() {
        use crate::models::settings::GameSettings;

        let (audio_tx, audio_rx) = unbounded();
        let (deferred_tx, deferred_rx) = unbounded();
        let settings = GameSettings {
            start_delay_ms: f64::INFINITY,
            ..GameSettings::default()
        };
        let core = JudgmentCore::from_settings(Beatmap::new(vec![NoteSpec::new(1000.0, 0)], 0.0), &settings);
        let scheduler = DeferredScheduler::new(deferred_tx).unwrap();
        let mut session = Session::new(core, scheduler, audio_tx);

        session.begin();
        let event = deferred_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(session.handle_deferred(event));
        assert!(drain(&audio_rx).contains(&AudioCommand::Play));
    }

    #[test]
    fn test_preview_only_outside_play() {
        let mut h = harness(Vec::new(), 3000.0);
        h.session.schedule_preview(0.0, 42_000.0);
        let event = h.deferred_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(h.session.handle_deferred(event));
        assert_eq!(
            drain(&h.audio_rx),
            vec![AudioCommand::Preview { position_ms: 42_000.0 }]
        );

        h.session.begin();
        assert!(!h.session.handle_deferred(DeferredEvent::PreviewStart {
            generation: h.session.generation(),
            position_ms: 0.0,
        }));
    }

    #[test]
    fn test_session_finishes_after_last_note() {
        let mut h = harness(vec![NoteSpec::new(100.0, 2)], 0.0);
        let t0 = Instant::now();
        h.session.begin_at(t0);
        h.session.frame_at(t0 + ms(90), [GameAction::Hit { column: 2 }]);
        assert_eq!(h.session.phase(), SessionPhase::Running);

        h.session.frame_at(t0 + ms(200), []);
        assert_eq!(h.session.phase(), SessionPhase::Finished);

        let result = h.session.result();
        assert_eq!(result.accumulator.total_notes, 1);
        assert_eq!(result.replay.records.len(), 1);
        assert_eq!(result.summary.perfect_hits, 1);
    }

    #[test]
    fn test_restart_resets_attempt() {
        let mut h = harness(vec![NoteSpec::new(500.0, 0)], 0.0);
        let t0 = Instant::now();
        h.session.begin_at(t0);
        h.session.frame_at(t0 + ms(500), [GameAction::Hit { column: 0 }]);
        assert_eq!(h.session.core().accumulator.total_notes, 1);
        let first_generation = h.session.generation();

        h.session.frame_at(t0 + ms(600), [GameAction::Restart]);
        assert_eq!(h.session.generation(), first_generation + 1);
        assert_eq!(h.session.core().accumulator.total_notes, 0);
        assert!(h.session.core_mut().is_none());
    }
}
