//! Input thread: a scripted autoplay source standing in for the keyboard.

pub mod events;

use crate::input::events::GameAction;
use crate::models::engine::Beatmap;
use crate::models::settings::{GameSettings, clamp_rate};
use crate::system::bus::SystemBus;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How the autoplay imitates a human player.
#[derive(Debug, Clone, Copy)]
pub struct AutoplayConfig {
    pub seed: u64,
    /// Max press offset, as a fraction of the hit window.
    pub jitter_ratio: f64,
    /// Chance to skip a note entirely.
    pub skip_chance: f64,
    /// Time between press and release.
    pub hold_ms: f64,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            jitter_ratio: 0.6,
            skip_chance: 0.05,
            hold_ms: 40.0,
        }
    }
}

/// A lane action due at a session time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedAction {
    pub at_ms: f64,
    pub action: GameAction,
}

/// Builds the press/release script for `beatmap`, sorted by time.
pub fn plan_presses(
    beatmap: &Beatmap,
    settings: &GameSettings,
    config: &AutoplayConfig,
) -> Vec<TimedAction> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let rate = clamp_rate(settings.rate);
    let max_offset = settings.hit_window_ms.ms() * config.jitter_ratio.clamp(0.0, 1.0);
    let skip_chance = config.skip_chance.clamp(0.0, 1.0);

    let mut plan = Vec::with_capacity(beatmap.notes.len() * 2);
    for spec in beatmap.notes.iter().filter(|n| n.is_well_formed()) {
        if rng.random_bool(skip_chance) {
            continue;
        }
        let target = spec.rate_adjusted_start(rate, settings.start_delay_ms);
        let offset = if max_offset > 0.0 {
            rng.random_range(-max_offset..=max_offset)
        } else {
            0.0
        };
        let press_at = (target + offset).max(0.0);

        plan.push(TimedAction {
            at_ms: press_at,
            action: GameAction::Hit { column: spec.column },
        });
        plan.push(TimedAction {
            at_ms: press_at + config.hold_ms.max(0.0),
            action: GameAction::Release { column: spec.column },
        });
    }

    plan.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
    plan
}

/// Spawns the input thread replaying `plan` against the wall clock.
pub fn start_thread(bus: SystemBus, plan: Vec<TimedAction>) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("Input Thread".to_string())
        .spawn(move || {
            log::info!("INPUT: Autoplay started ({} actions)", plan.len());
            let start = Instant::now();

            for timed in plan {
                let due = start + Duration::from_secs_f64(timed.at_ms / 1000.0);
                let now = Instant::now();
                if due > now {
                    thread::sleep(due - now);
                }
                if let Err(e) = bus.action_tx.send(timed.action) {
                    log::error!("INPUT: Failed to send action (Logic thread died?): {}", e);
                    break;
                }
            }

            log::info!("INPUT: Thread stopped");
        })
}
