//! # Asynchronous Observer Dispatch
//!
//! Observer notification is moved off the logging hot path onto one
//! dedicated worker thread. Producers hand a [`DispatchTask`] to a bounded
//! FIFO queue and return immediately; the worker drains the queue and runs
//! [`CallbackRegistry::snapshot_and_dispatch`] for each task.
//!
//! ## State Machine
//!
//! `Stopped -> Starting -> Running -> Stopping -> Stopped`
//!
//! A worker asked to stop from inside one of its own observers cannot be
//! joined; the dispatcher stays `Stopping` until that worker has drained the
//! queue and left its loop. Starting again before then revives the same
//! worker, so there is never more than one consumer.
//!
//! ## Backpressure
//!
//! Producers never block on a full queue. `submit` fails fast with
//! `QueueFull` and the caller decides what to do with the event.
//!
//! ## Locking
//!
//! The queue has its own mutex and one not-empty condition variable. The
//! running flag is only changed while the queue lock is held, so a producer
//! that observes `Running` under the lock is guaranteed that the worker will
//! still see its task. Observer code always runs with the queue lock
//! released.

use crate::bounded;
use crate::constants::{
    DIAGNOSTICS_TARGET, DISPATCH_THREAD_NAME, LEVEL_CAPACITY, MESSAGE_CAPACITY,
    TIMESTAMP_CAPACITY,
};
use crate::error::{LogError, Result};
use crate::level::Level;
use crate::registry::{CallbackRegistry, LogEvent};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Lifecycle of the dispatch worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// One pending observer notification
///
/// Fields are bounded copies: the task owns no memory borrowed from the
/// producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTask {
    pub level: String,
    pub message: String,
    pub timestamp: String,
}

impl DispatchTask {
    /// Copy the three fields, bounding each to its capacity.
    ///
    /// Returns the task and whether the message had to be truncated.
    pub fn new(level: &str, message: &str, timestamp: &str) -> (Self, bool) {
        let message = bounded::truncate(message, MESSAGE_CAPACITY);
        let task = Self {
            level: bounded::clamp(level, LEVEL_CAPACITY).to_string(),
            message: message.text,
            timestamp: bounded::clamp(timestamp, TIMESTAMP_CAPACITY).to_string(),
        };
        (task, message.truncated)
    }

    fn into_event(self) -> LogEvent {
        LogEvent {
            level: level_from_name(&self.level),
            message: self.message,
            timestamp: self.timestamp,
        }
    }
}

fn level_from_name(name: &str) -> Level {
    [Level::Error, Level::Fatal, Level::Info, Level::Warn]
        .into_iter()
        .find(|level| level.as_str() == name)
        .unwrap_or(Level::Unknown)
}

/// Ring buffer of pending tasks; `capacity` is fixed at start
struct TaskQueue {
    tasks: VecDeque<DispatchTask>,
    capacity: usize,
    running: bool,
    // Cleared by the worker itself as it leaves its loop
    worker_alive: bool,
}

struct Shared {
    queue: Mutex<TaskQueue>,
    not_empty: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TaskQueue> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Bounded task queue plus the worker thread that drains it
pub struct AsyncDispatcher {
    shared: Arc<Shared>,
    registry: Arc<CallbackRegistry>,
    capacity: usize,
    state: Mutex<DispatchState>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncDispatcher {
    /// Dispatcher feeding `registry`, holding up to `capacity` pending tasks.
    /// The worker is not started until [`AsyncDispatcher::start`].
    pub fn new(registry: Arc<CallbackRegistry>, capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(TaskQueue {
                    tasks: VecDeque::new(),
                    capacity: 0,
                    running: false,
                    worker_alive: false,
                }),
                not_empty: Condvar::new(),
            }),
            registry,
            capacity,
            state: Mutex::new(DispatchState::Stopped),
            worker: Mutex::new(None),
        }
    }

    fn state_guard(&self) -> MutexGuard<'_, DispatchState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> DispatchState {
        let state = *self.state_guard();
        if state == DispatchState::Stopping && !self.shared.lock().worker_alive {
            DispatchState::Stopped
        } else {
            state
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// Capacity the queue is allocated with at start
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tasks waiting for the worker
    pub fn pending(&self) -> usize {
        self.shared.lock().tasks.len()
    }

    /// Allocate the queue and spawn the worker. A no-op when already running.
    ///
    /// ## Errors
    ///
    /// - `Allocation` when the task buffer cannot be reserved
    /// - `Thread` when the worker thread cannot be spawned
    pub fn start(&self) -> Result<()> {
        let mut state = self.state_guard();
        if *state == DispatchState::Running {
            return Ok(());
        }

        {
            let mut queue = self.shared.lock();
            if queue.worker_alive {
                // Stopped from an observer and not yet exited: keep it and its backlog
                queue.running = true;
                *state = DispatchState::Running;
                debug!("Dispatch worker resumed before exiting");
                return Ok(());
            }
        }
        self.reap_worker();
        *state = DispatchState::Starting;

        {
            let mut queue = self.shared.lock();
            let mut tasks = VecDeque::new();
            if let Err(e) = tasks.try_reserve_exact(self.capacity) {
                *state = DispatchState::Stopped;
                return Err(e.into());
            }
            queue.tasks = tasks;
            queue.capacity = self.capacity;
            queue.running = true;
            queue.worker_alive = true;
        }

        let shared = Arc::clone(&self.shared);
        let registry = Arc::clone(&self.registry);
        let spawned = thread::Builder::new()
            .name(DISPATCH_THREAD_NAME.to_string())
            .spawn(move || worker_loop(shared, registry));

        match spawned {
            Ok(handle) => {
                *self.worker.lock().unwrap_or_else(|p| p.into_inner()) = Some(handle);
                *state = DispatchState::Running;
                debug!("Dispatch worker started (capacity {})", self.capacity);
                Ok(())
            }
            Err(e) => {
                let mut queue = self.shared.lock();
                queue.running = false;
                queue.worker_alive = false;
                queue.tasks = VecDeque::new();
                queue.capacity = 0;
                *state = DispatchState::Stopped;
                Err(LogError::Thread(e.to_string()))
            }
        }
    }

    /// Queue an observer notification for the worker.
    ///
    /// Never blocks on a full queue. Returns the task's message truncation
    /// flag on success.
    ///
    /// ## Errors
    ///
    /// - `NotRunning` when the worker is not active
    /// - `QueueFull` when `capacity` tasks are already pending
    pub fn submit(&self, level: &str, message: &str, timestamp: &str) -> Result<bool> {
        let mut queue = self.shared.lock();
        if !queue.running {
            return Err(LogError::NotRunning);
        }
        if queue.tasks.len() >= queue.capacity {
            return Err(LogError::QueueFull {
                capacity: queue.capacity,
            });
        }

        let (task, truncated) = DispatchTask::new(level, message, timestamp);
        queue.tasks.push_back(task);
        drop(queue);

        self.shared.not_empty.notify_one();
        Ok(truncated)
    }

    /// Stop the worker and release the queue.
    ///
    /// Tasks already queued are delivered before the worker exits. Idempotent;
    /// once this returns no observer call from this dispatcher is in flight,
    /// unless it was called from such an observer.
    pub fn stop(&self) {
        let mut state = self.state_guard();
        if *state == DispatchState::Stopped {
            return;
        }
        *state = DispatchState::Stopping;

        {
            let mut queue = self.shared.lock();
            queue.running = false;
            self.shared.not_empty.notify_all();
        }

        let handle = self.worker.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                // Called from an observer: the worker exits once it returns and
                // the queue is drained; a later stop or start reaps it
                *self.worker.lock().unwrap_or_else(|p| p.into_inner()) = Some(handle);
                return;
            }
            join_worker(handle);
        }

        {
            let mut queue = self.shared.lock();
            queue.tasks = VecDeque::new();
            queue.capacity = 0;
        }

        *state = DispatchState::Stopped;
        debug!("Dispatch worker stopped");
    }

    // Join a worker that has already left its loop
    fn reap_worker(&self) {
        let handle = self.worker.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(handle) = handle {
            join_worker(handle);
        }
    }
}

fn join_worker(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        error!(target: DIAGNOSTICS_TARGET, "Dispatch worker terminated abnormally");
    }
}

impl Drop for AsyncDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Wait for tasks while running; deliver each outside the queue lock.
/// Exits once the running flag is cleared and the queue is drained.
fn worker_loop(shared: Arc<Shared>, registry: Arc<CallbackRegistry>) {
    loop {
        let task = {
            let mut queue = shared.lock();
            loop {
                if let Some(task) = queue.tasks.pop_front() {
                    break Some(task);
                }
                if !queue.running {
                    queue.worker_alive = false;
                    break None;
                }
                queue = shared
                    .not_empty
                    .wait(queue)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
        };

        match task {
            Some(task) => {
                registry.snapshot_and_dispatch(&task.into_event());
            }
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_fields_are_bounded() {
        let long_level = "L".repeat(100);
        let long_message = "m".repeat(MESSAGE_CAPACITY + 10);
        let (task, truncated) = DispatchTask::new(&long_level, &long_message, "now");
        assert!(truncated);
        assert_eq!(task.level.len(), LEVEL_CAPACITY);
        assert_eq!(task.message.len(), MESSAGE_CAPACITY);
        assert_eq!(task.timestamp, "now");
    }

    #[test]
    fn test_level_names_map_back() {
        assert_eq!(level_from_name("WARN"), Level::Warn);
        assert_eq!(level_from_name("FATAL"), Level::Fatal);
        assert_eq!(level_from_name("bogus"), Level::Unknown);
    }

    #[test]
    fn test_state_transitions() {
        let dispatcher = AsyncDispatcher::new(Arc::new(CallbackRegistry::new()), 4);
        assert_eq!(dispatcher.state(), DispatchState::Stopped);
        assert!(matches!(
            dispatcher.submit("INFO", "early", "t"),
            Err(LogError::NotRunning)
        ));

        dispatcher.start().unwrap();
        assert_eq!(dispatcher.state(), DispatchState::Running);
        dispatcher.start().unwrap();
        assert!(dispatcher.is_running());

        dispatcher.stop();
        dispatcher.stop();
        assert_eq!(dispatcher.state(), DispatchState::Stopped);
        assert!(!dispatcher.is_running());
        assert_eq!(dispatcher.pending(), 0);
    }
}
