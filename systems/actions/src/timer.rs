//! Dedicated thread resolving delayed effects on a fixed poll interval.

use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use boss_arena_core::{Clock, Event};
use boss_arena_world::BossHandle;
use tracing::debug;

use crate::{resolve_due, EffectQueue};

/// Background resolver for an [`EffectQueue`].
///
/// Events produced while resolving are forwarded over a channel and drained
/// by the frame thread. The thread stops and is joined when the value drops.
#[derive(Debug)]
pub struct TimerThread {
    shutdown: Arc<AtomicBool>,
    events: Receiver<Event>,
    handle: Option<JoinHandle<()>>,
}

impl TimerThread {
    /// Starts polling `queue` every `poll_interval`.
    pub fn spawn(
        queue: Arc<EffectQueue>,
        boss: BossHandle,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let (sender, events) = mpsc::channel();
        let stop = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("effect-timer".to_owned())
            .spawn(move || {
                let mut produced = Vec::new();
                while !stop.load(Ordering::SeqCst) {
                    let _ = resolve_due(&queue, &boss, clock.now(), &mut produced);
                    for event in produced.drain(..) {
                        if sender.send(event).is_err() {
                            return;
                        }
                    }
                    thread::sleep(poll_interval);
                }
                debug!("effect timer stopped");
            })?;

        Ok(Self {
            shutdown,
            events,
            handle: Some(handle),
        })
    }

    /// Moves every event forwarded so far into `out_events`.
    pub fn drain_events(&self, out_events: &mut Vec<Event>) {
        out_events.extend(self.events.try_iter());
    }

    /// Waits up to `timeout` for the next forwarded event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Event> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for TimerThread {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
