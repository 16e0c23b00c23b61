//! Logic thread driving the gameplay session.
//!
//! The thread runs at a fixed tick rate and coordinates between the input
//! source, the deferred task scheduler and the render/audio collaborators.

pub mod clock;
pub mod scheduler;

use crate::database::ReplayStore;
use crate::input::events::GameAction;
use crate::models::engine::Beatmap;
use crate::models::settings::GameSettings;
use crate::state::game::JudgmentCore;
use crate::state::session::{Session, SessionPhase};
use crate::system::bus::{SystemBus, SystemEvent};
use scheduler::DeferredScheduler;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Target ticks per second for the logic thread.
const TPS: u64 = 200;

/// Spawns the logic thread playing `beatmap` with `settings`.
///
/// Each tick:
/// 1. Handles system events (focus loss, quit)
/// 2. Applies completed deferred tasks
/// 3. Runs one session frame with the queued input actions
/// 4. Sends a render snapshot
///
/// Once the attempt finishes, its replay is stored and the result is sent
/// on the bus. The thread keeps running (a restart is possible) until quit.
pub fn start_thread(
    bus: SystemBus,
    settings: GameSettings,
    beatmap: Beatmap,
    store: Box<dyn ReplayStore>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("Logic Thread".to_string())
        .spawn(move || {
            log::info!("LOGIC: Thread started");

            let scheduler = match DeferredScheduler::new(bus.deferred_tx.clone()) {
                Ok(scheduler) => scheduler,
                Err(e) => {
                    log::error!("LOGIC: Failed to start deferred scheduler: {}", e);
                    return;
                }
            };
            let core = JudgmentCore::from_settings(beatmap, &settings);
            let mut session = Session::new(core, scheduler, bus.audio_cmd_tx.clone());
            session.begin();

            let target_dt = Duration::from_secs_f64(1.0 / TPS as f64);

            loop {
                let tick_start = Instant::now();

                // 1. System events
                while let Ok(sys_evt) = bus.sys_rx.try_recv() {
                    match sys_evt {
                        SystemEvent::Quit => {
                            log::info!("LOGIC: Quit received...");
                            session.stop();
                            return;
                        }
                        SystemEvent::FocusLost => session.pause_at(tick_start),
                    }
                }

                // 2. Deferred tasks
                for event in bus.deferred_rx.try_iter() {
                    session.handle_deferred(event);
                }

                // 3. Session frame
                let actions: Vec<GameAction> = bus.action_rx.try_iter().collect();
                let was_finished = session.phase() == SessionPhase::Finished;
                session.frame_at(tick_start, actions);

                // 4. Render snapshot, dropped if the renderer lags behind
                let _ = bus.render_tx.try_send(session.snapshot());

                if !was_finished && session.phase() == SessionPhase::Finished {
                    let result = session.result();
                    if let Err(e) = store.store(&result.beatmap_hash, &result.replay) {
                        log::error!("LOGIC: Failed to store replay: {}", e);
                    }
                    if bus.result_tx.send(result).is_err() {
                        log::warn!("LOGIC: Nobody is listening for results");
                    }
                }

                let spent = tick_start.elapsed();
                if spent < target_dt {
                    thread::sleep(target_dt - spent);
                }
            }
        })
}
