//! Fire-and-forget deferred tasks (delayed audio start, song preview).
//!
//! Tasks run on a small tokio runtime and report back through the bus.
//! They never touch session state directly: every event carries the
//! session generation it was scheduled for, and the logic thread drops
//! events whose generation is stale.

use crate::system::bus::DeferredEvent;
use crossbeam_channel::Sender;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

pub struct DeferredScheduler {
    runtime: Runtime,
    event_tx: Sender<DeferredEvent>,
}

impl DeferredScheduler {
    pub fn new(event_tx: Sender<DeferredEvent>) -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("Deferred")
            .enable_time()
            .build()?;
        Ok(Self { runtime, event_tx })
    }

    /// Sends `event` on the bus after `delay_ms`.
    ///
    /// The returned handle can abort the task; a closed bus makes it a no-op.
    /// A negative, non-finite or out of range delay fires right away.
    pub fn schedule(&self, delay_ms: f64, event: DeferredEvent) -> JoinHandle<()> {
        let delay = Duration::try_from_secs_f64(delay_ms.max(0.0) / 1000.0).unwrap_or_else(|_| {
            log::warn!("SCHEDULER: Invalid delay {}ms for {:?}, firing now", delay_ms, event);
            Duration::ZERO
        });
        let tx = self.event_tx.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(event).is_err() {
                log::debug!("SCHEDULER: Bus closed, dropping {:?}", event);
            }
        })
    }
}
