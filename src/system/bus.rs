//! Shared channel infrastructure between system threads.
//!
//! The `SystemBus` connects the input source, the logic thread, the
//! renderer/audio collaborators and the deferred task scheduler.

use crate::input::events::GameAction;
use crate::models::replay::SessionResult;
use crate::state::game::GameplaySnapshot;
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

/// System-level events.
#[derive(Debug, Clone)]
pub enum SystemEvent {
    /// Window lost focus, gameplay pauses.
    FocusLost,
    /// Application shutdown requested.
    Quit,
}

/// Commands sent to the external audio collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    /// Start playback from the beginning.
    Play,
    /// Pause playback.
    Pause,
    /// Resume playback after a pause.
    Resume,
    /// Stop and reset playback position.
    Stop,
    /// Change playback speed.
    SetSpeed { speed: f32 },
    /// Start the song preview at a position (ms).
    Preview { position_ms: f64 },
}

/// Completion of a deferred task, tagged with the session generation
/// it was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeferredEvent {
    /// Lead-in is over, the song starts.
    AudioStart { generation: u64 },
    /// Song preview delay elapsed.
    PreviewStart { generation: u64, position_ms: f64 },
}

impl DeferredEvent {
    pub fn generation(&self) -> u64 {
        match self {
            DeferredEvent::AudioStart { generation } => *generation,
            DeferredEvent::PreviewStart { generation, .. } => *generation,
        }
    }
}

/// Aggregates the cross-thread communication channels.
#[derive(Clone)]
pub struct SystemBus {
    /// Input → Logic: lane presses/releases and gameplay actions.
    pub action_tx: Sender<GameAction>,
    pub action_rx: Receiver<GameAction>,

    /// Logic → Render: gameplay snapshots.
    pub render_tx: Sender<GameplaySnapshot>,
    pub render_rx: Receiver<GameplaySnapshot>,

    /// Main → Logic: system events.
    pub sys_tx: Sender<SystemEvent>,
    pub sys_rx: Receiver<SystemEvent>,

    /// Logic → Audio: audio commands.
    pub audio_cmd_tx: Sender<AudioCommand>,
    pub audio_cmd_rx: Receiver<AudioCommand>,

    /// Scheduler → Logic: completed deferred tasks.
    pub deferred_tx: Sender<DeferredEvent>,
    pub deferred_rx: Receiver<DeferredEvent>,

    /// Logic → Persistence/Results: end-of-session data.
    pub result_tx: Sender<SessionResult>,
    pub result_rx: Receiver<SessionResult>,
}

impl SystemBus {
    /// Creates a new system bus with all channels initialized.
    pub fn new() -> Self {
        let (action_tx, action_rx) = unbounded();

        // Bounded render channel: max 2 frames queued to limit latency
        let (render_tx, render_rx) = bounded(2);

        let (sys_tx, sys_rx) = unbounded();
        let (audio_cmd_tx, audio_cmd_rx) = unbounded();
        let (deferred_tx, deferred_rx) = unbounded();
        let (result_tx, result_rx) = unbounded();

        Self {
            action_tx,
            action_rx,
            render_tx,
            render_rx,
            sys_tx,
            sys_rx,
            audio_cmd_tx,
            audio_cmd_rx,
            deferred_tx,
            deferred_rx,
            result_tx,
            result_rx,
        }
    }
}

impl Default for SystemBus {
    fn default() -> Self {
        Self::new()
    }
}
