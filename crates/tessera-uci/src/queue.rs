//! The blocking command queue between the input reader, the timer and the
//! processor.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

use crate::command::Command;

#[derive(Debug, Default)]
struct Slots {
    commands: VecDeque<Command>,
    closed: bool,
}

/// A FIFO of [`Command`]s with any number of producers and one consumer.
#[derive(Debug, Default)]
pub struct CommandQueue {
    slots: Mutex<Slots>,
    ready: Condvar,
}

impl CommandQueue {
    /// An empty, open queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().expect("queue mutex poisoned")
    }

    /// Append `command` and wake the consumer. Dropped once closed.
    pub fn push(&self, command: Command) {
        let mut slots = self.lock();
        if slots.closed {
            return;
        }
        slots.commands.push_back(command);
        self.ready.notify_one();
    }

    /// Take the oldest command, blocking while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub fn pop(&self) -> Option<Command> {
        let mut slots = self.lock();
        loop {
            if let Some(command) = slots.commands.pop_front() {
                return Some(command);
            }
            if slots.closed {
                return None;
            }
            slots = self.ready.wait(slots).expect("queue mutex poisoned");
        }
    }

    /// Remove every queued command matching `predicate`; returns how many.
    pub fn purge<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&Command) -> bool,
    {
        let mut slots = self.lock();
        let before = slots.commands.len();
        slots.commands.retain(|command| !predicate(command));
        before - slots.commands.len()
    }

    /// Refuse further commands and wake the consumer.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    /// Number of queued commands.
    pub fn len(&self) -> usize {
        self.lock().commands.len()
    }

    /// Whether no command is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
