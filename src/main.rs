//! Headless driver and thread bootstrapper.
//!
//! Plays a generated chart with the autoplay input source, logs what the
//! renderer and audio collaborators would receive, then reports the
//! result under every accuracy model.

use crossbeam_channel::select;
use lanejudge::database::FileReplayStore;
use lanejudge::input::{self, AutoplayConfig};
use lanejudge::logic;
use lanejudge::models::engine::{AccuracyModel, Beatmap};
use lanejudge::models::replay::SessionResult;
use lanejudge::models::settings::GameSettings;
use lanejudge::system::bus::{SystemBus, SystemEvent};

const DEMO_SEED: u64 = 42;
const DEMO_NOTES: usize = 64;

/// A snapshot is logged every this many frames.
const SNAPSHOT_LOG_INTERVAL: u64 = 200;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("MAIN: Booting lanejudge...");

    let settings = GameSettings::load().unwrap_or_else(|e| {
        log::error!("MAIN: Invalid settings, using defaults: {}", e);
        GameSettings::default()
    });

    let beatmap = Beatmap::random(DEMO_SEED, DEMO_NOTES);
    log::info!(
        "MAIN: Generated chart {} ({} notes)",
        beatmap.hash(),
        beatmap.notes.len()
    );

    let bus = SystemBus::new();
    let store = FileReplayStore::new(settings.replay_dir.clone());
    let plan = input::plan_presses(&beatmap, &settings, &AutoplayConfig::default());

    let logic_handle =
        match logic::start_thread(bus.clone(), settings.clone(), beatmap, Box::new(store)) {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("MAIN: Failed to spawn Logic thread: {}", e);
                return;
            }
        };
    if let Err(e) = input::start_thread(bus.clone(), plan) {
        log::error!("MAIN: Failed to spawn Input thread: {}", e);
    }

    match wait_for_result(&bus) {
        Some(result) => report(&result),
        None => log::error!("MAIN: Session ended without a result"),
    }

    let _ = bus.sys_tx.send(SystemEvent::Quit);
    if logic_handle.join().is_err() {
        log::error!("MAIN: Logic thread panicked");
    }
}

/// Stands in for the renderer and the audio thread until a result arrives.
fn wait_for_result(bus: &SystemBus) -> Option<SessionResult> {
    let mut frames: u64 = 0;
    loop {
        select! {
            recv(bus.render_rx) -> snapshot => {
                let snapshot = snapshot.ok()?;
                frames += 1;
                if frames % SNAPSHOT_LOG_INTERVAL == 0 {
                    log::debug!(
                        "RENDER: t={:.0}ms score={} combo={} acc={:.2}% active={} left={}",
                        snapshot.clock_ms,
                        snapshot.score,
                        snapshot.combo,
                        snapshot.accuracy * 100.0,
                        snapshot.active_notes.len(),
                        snapshot.remaining_notes
                    );
                }
            }
            recv(bus.audio_cmd_rx) -> cmd => {
                log::info!("AUDIO: {:?}", cmd.ok()?);
            }
            recv(bus.result_rx) -> result => return result.ok(),
        }
    }
}

fn report(result: &SessionResult) {
    let acc = &result.accumulator;
    let stats = &acc.hit_stats;
    log::info!(
        "RESULT: score {} | max combo {} | accuracy {:.2}%",
        acc.score,
        acc.max_combo,
        acc.current_accuracy() * 100.0
    );
    log::info!(
        "RESULT: MV {} | PF {} | GR {} | GD {} | OK {} | MISS {}",
        stats.marvelous,
        stats.perfect,
        stats.great,
        stats.good,
        stats.ok,
        stats.miss
    );

    let replay = &result.replay;
    for model in AccuracyModel::ALL {
        log::info!(
            "RESULT: {:>10}: {:.2}%",
            model.name(),
            replay.recompute_accuracy(model, replay.hit_window) * 100.0
        );
    }
}
