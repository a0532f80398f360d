//! Task state machine and the caller-facing load handle.

use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::feed::Feed;
use crate::types::{Priority, TaskId, TaskState};

/// Outcome captured on a task: the parsed feed or the failure to re-raise.
/// Clonable so every read of a completed handle observes the identical value.
pub(crate) type LoadOutcome = std::result::Result<Arc<Feed>, Error>;

/// One unit of queued work, shared between the submitting caller (through
/// [`LoadHandle`]) and the worker.
///
/// The state word only moves forward: Ready → Running → Done on the worker,
/// Ready → Cancelled on a caller. The worker is the only writer of the
/// outcome slot, and writes it before flipping the state to Done; the
/// `OnceLock` makes completion at-most-once by construction.
pub(crate) struct Task {
    id: TaskId,
    uri: String,
    priority: Priority,
    state: AtomicU8,
    outcome: OnceLock<LoadOutcome>,
    done: Notify,
}

impl Task {
    pub(crate) fn new(id: TaskId, uri: String, priority: Priority) -> Arc<Self> {
        Arc::new(Self {
            id,
            uri,
            priority,
            state: AtomicU8::new(TaskState::Ready.to_u8()),
            outcome: OnceLock::new(),
            done: Notify::new(),
        })
    }

    pub(crate) fn id(&self) -> TaskId {
        self.id
    }

    pub(crate) fn uri(&self) -> &str {
        &self.uri
    }

    pub(crate) fn priority(&self) -> Priority {
        self.priority
    }

    pub(crate) fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Caller-side Ready → Cancelled transition. Wakes all waiters on
    /// success so a blocked `get()` observes the cancellation.
    pub(crate) fn cancel(&self) -> bool {
        let cancelled = self
            .state
            .compare_exchange(
                TaskState::Ready.to_u8(),
                TaskState::Cancelled.to_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();

        if cancelled {
            self.done.notify_waiters();
        }

        cancelled
    }

    /// Worker-side Ready → Running transition. Returns false when a caller
    /// cancelled the task first; the worker must then skip it.
    pub(crate) fn try_claim(&self) -> bool {
        self.state
            .compare_exchange(
                TaskState::Ready.to_u8(),
                TaskState::Running.to_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Worker-side completion: store the outcome, flip Running → Done, wake
    /// all waiters. Idempotent; only the first call stores anything.
    pub(crate) fn complete(&self, outcome: LoadOutcome) {
        if self.outcome.set(outcome).is_err() {
            return;
        }

        let _ = self.state.compare_exchange(
            TaskState::Running.to_u8(),
            TaskState::Done.to_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );

        self.done.notify_waiters();
    }

    /// The outcome to hand a caller, if the task has reached a terminal
    /// state. Cancellation wins over an outcome that was never written.
    pub(crate) fn terminal_outcome(&self) -> Option<LoadOutcome> {
        match self.state() {
            TaskState::Cancelled => Some(Err(Error::Cancelled)),
            TaskState::Done => self.outcome.get().cloned(),
            TaskState::Ready | TaskState::Running => None,
        }
    }
}

/// Handle to an asynchronous feed load, returned by
/// [`submit`](crate::RssLoader::submit)
///
/// Handles are cheap to clone and can be awaited from any number of tasks
/// concurrently; every reader of a completed handle observes the identical
/// outcome.
#[derive(Clone)]
pub struct LoadHandle {
    task: Arc<Task>,
}

impl LoadHandle {
    pub(crate) fn new(task: Arc<Task>) -> Self {
        Self { task }
    }

    /// ID of the underlying task
    pub fn id(&self) -> TaskId {
        self.task.id()
    }

    /// Feed URI this task loads
    pub fn uri(&self) -> &str {
        self.task.uri()
    }

    /// Priority the task was submitted with
    pub fn priority(&self) -> Priority {
        self.task.priority()
    }

    /// Current state of the underlying task
    pub fn state(&self) -> TaskState {
        self.task.state()
    }

    /// Cancel the load if the worker has not claimed it yet
    ///
    /// Returns `true` when the task moved to Cancelled. Returns `false` —
    /// with no effect on the outcome — once the task is Running or already
    /// terminal; an in-flight fetch is never interrupted.
    pub fn cancel(&self) -> bool {
        self.task.cancel()
    }

    /// True once the task reached a terminal state (Done or Cancelled)
    pub fn is_done(&self) -> bool {
        self.task.state().is_terminal()
    }

    /// True iff the task was cancelled before the worker claimed it
    pub fn is_cancelled(&self) -> bool {
        self.task.state() == TaskState::Cancelled
    }

    /// Wait for the load to finish and return its outcome
    ///
    /// Returns the parsed feed, re-raises the captured
    /// [`Transport`](Error::Transport)/[`Parse`](Error::Parse) failure, or
    /// returns [`Error::Cancelled`] for a cancelled task. Reading is
    /// idempotent: repeated calls return the identical outcome without
    /// re-executing anything.
    pub async fn get(&self) -> Result<Arc<Feed>> {
        loop {
            // Register with the notifier before re-checking the predicate.
            // notify_waiters() only wakes already-registered waiters, so the
            // enable() must precede the check or a completion landing in
            // between would be missed.
            let mut notified = std::pin::pin!(self.task.done.notified());
            notified.as_mut().enable();

            if let Some(outcome) = self.task.terminal_outcome() {
                return outcome;
            }

            notified.await;
        }
    }

    /// As [`get`](Self::get), bounded by `timeout`
    ///
    /// On deadline, returns [`Error::Timeout`] without touching the task:
    /// the load keeps running and a later `get()` observes its eventual
    /// outcome.
    pub async fn get_timeout(&self, timeout: Duration) -> Result<Arc<Feed>> {
        match tokio::time::timeout(timeout, self.get()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Timeout),
        }
    }
}

impl std::fmt::Debug for LoadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadHandle")
            .field("id", &self.task.id())
            .field("uri", &self.task.uri())
            .field("priority", &self.task.priority())
            .field("state", &self.task.state())
            .finish()
    }
}
