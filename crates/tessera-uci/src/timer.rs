//! The single-slot deadline thread.
//!
//! | Call              | Effect                                           |
//! |-------------------|--------------------------------------------------|
//! | `arm(d)`, `d > 0` | fire once `d` from now, replacing any pending arm |
//! | `arm(0)`          | cancel; a zero timeout never fires               |
//! | `clear()`         | cancel                                           |
//!
//! Firing sets the timeout bit of the shared [`SearchControl`] and queues a
//! [`Command::Timeout`] carrying the arm's generation. Every arm or clear
//! bumps the generation and purges queued timeouts, so a late expiry of an
//! older arm is never mistaken for the current one.

use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tessera_control::Deadline;
use tessera_engine::SearchControl;
use tracing::{debug, trace};

use crate::command::Command;
use crate::queue::CommandQueue;

#[derive(Debug, Default)]
struct Slot {
    due: Option<Instant>,
    generation: u64,
    shutdown: bool,
}

#[derive(Debug, Default)]
struct Shared {
    slot: Mutex<Slot>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().expect("timer mutex poisoned")
    }
}

/// Handle to the timer thread; dropping it stops the thread.
#[derive(Debug)]
pub struct Timer {
    shared: Arc<Shared>,
    queue: Arc<CommandQueue>,
    handle: Option<JoinHandle<()>>,
}

impl Timer {
    /// Start the timer thread.
    pub fn spawn(control: Arc<SearchControl>, queue: Arc<CommandQueue>) -> io::Result<Self> {
        let shared = Arc::new(Shared::default());
        let handle = {
            let shared = Arc::clone(&shared);
            let queue = Arc::clone(&queue);
            thread::Builder::new()
                .name("timer".into())
                .spawn(move || run(&shared, &control, &queue))?
        };
        Ok(Self {
            shared,
            queue,
            handle: Some(handle),
        })
    }

    /// Generation of the latest arm or clear.
    pub fn generation(&self) -> u64 {
        self.shared.lock().generation
    }

    fn reset(&self, due: Option<Instant>) {
        let mut slot = self.shared.lock();
        slot.generation += 1;
        slot.due = due;
        self.queue.purge(|c| matches!(c, Command::Timeout { .. }));
        trace!(generation = slot.generation, ?due, "timer reset");
        self.shared.changed.notify_one();
    }

    /// Stop the thread and wait for it.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.shared.lock().shutdown = true;
        self.shared.changed.notify_one();
        if handle.join().is_err() {
            debug!("timer thread panicked");
        }
    }
}

impl Deadline for Timer {
    fn arm(&mut self, after: Duration) {
        let due = (!after.is_zero()).then(|| Instant::now() + after);
        self.reset(due);
    }

    fn clear(&mut self) {
        self.reset(None);
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(shared: &Shared, control: &SearchControl, queue: &CommandQueue) {
    let mut slot = shared.lock();
    loop {
        if slot.shutdown {
            break;
        }
        match slot.due {
            None => {
                slot = shared.changed.wait(slot).expect("timer mutex poisoned");
            }
            Some(due) => {
                let now = Instant::now();
                if now < due {
                    slot = shared
                        .changed
                        .wait_timeout(slot, due - now)
                        .expect("timer mutex poisoned")
                        .0;
                    continue;
                }
                slot.due = None;
                let generation = slot.generation;
                // Queued under the lock so a concurrent arm always purges it.
                control.signal_timeout();
                queue.push(Command::Timeout { generation });
                debug!(generation, "deadline expired");
            }
        }
    }
}
