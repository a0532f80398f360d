//! Asynchronous feed loading — queue, handle, worker, and the public facade.
//!
//! The pieces are organized by concern:
//! - [`task`] - Task state machine and the caller-facing [`LoadHandle`]
//! - [`queue`] - FIFO/priority task queue between callers and the worker
//! - [`worker`] - The single background task executing fetch/parse work
//!
//! [`RssLoader`] ties them together: `submit()` enqueues and returns a
//! handle immediately, the worker drains the queue one task at a time, and
//! completed handles surface either through the specific handle a caller
//! kept or in completion order through `take()`/`poll()`.

mod queue;
mod task;
mod worker;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use task::LoadHandle;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use crate::config::Config;
use crate::error::{Error, RejectedSubmission, Result};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::parser::{FeedParser, SyndicationParser};
use crate::types::{Event, Priority, TaskId};

use queue::TaskQueue;
use task::Task;
use worker::Worker;

/// Buffer size of the event broadcast channel; subscribers falling behind by
/// more than this many events observe a `RecvError::Lagged`
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Holds the worker's half of the wiring between construction and spawn
struct WorkerSlot {
    /// Completion-channel sender, handed to the worker on `start()`
    completed_tx: Option<mpsc::UnboundedSender<LoadHandle>>,
    /// Join handle of the spawned worker, taken by `stop()`
    handle: Option<tokio::task::JoinHandle<()>>,
}

/// Asynchronous feed loader (cloneable - all fields are Arc-wrapped)
///
/// Feeds are loaded in FIFO or priority order by a single background worker;
/// submissions never block on the load itself. Outcomes are retrieved either
/// through the [`LoadHandle`] returned by `submit()` or in completion order
/// via [`take`](Self::take)/[`poll`](Self::poll).
///
/// # Examples
///
/// ```no_run
/// use rss_loader::{Config, RssLoader};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let loader = RssLoader::new(Config::default())?;
///     loader.start();
///
///     let handle = loader.submit("https://example.com/feed.xml")?;
///     let feed = handle.get().await?;
///     println!("loaded: {:?}", feed.title);
///
///     loader.stop().await;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RssLoader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    config: Arc<Config>,
    /// Task queue between submitting callers and the worker
    queue: Arc<TaskQueue>,
    /// Fetcher collaborator invoked by the worker
    fetcher: Arc<dyn Fetcher>,
    /// Parser collaborator invoked by the worker
    parser: Arc<dyn FeedParser>,
    /// Set by stop() before the shutdown entry is enqueued; submissions
    /// observing it are rejected
    closed: Arc<AtomicBool>,
    /// Source of task IDs
    next_task_id: Arc<AtomicU64>,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: broadcast::Sender<Event>,
    /// Completed handles in completion order, drained by take()/poll()
    completed_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<LoadHandle>>>,
    /// Worker wiring and join handle
    worker: Arc<Mutex<WorkerSlot>>,
}

impl RssLoader {
    /// Create a loader with the built-in HTTP fetcher and RSS/Atom parser
    ///
    /// The worker is not running yet; call [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
        Ok(Self::with_collaborators(
            config,
            fetcher,
            Arc::new(SyndicationParser::new()),
        ))
    }

    /// Create a FIFO loader with default configuration
    pub fn fifo() -> Result<Self> {
        Self::new(Config::fifo())
    }

    /// Create a priority-ordered loader with default configuration
    pub fn priority() -> Result<Self> {
        Self::new(Config::priority())
    }

    /// Create a loader with injected collaborators
    ///
    /// This is the seam for offline use and tests: any `Fetcher`/`FeedParser`
    /// pair can stand in for the network and the XML parser.
    pub fn with_collaborators(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        parser: Arc<dyn FeedParser>,
    ) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (completed_tx, completed_rx) = mpsc::unbounded_channel();

        Self {
            queue: Arc::new(TaskQueue::new(config.ordering, config.capacity)),
            config: Arc::new(config),
            fetcher,
            parser,
            closed: Arc::new(AtomicBool::new(false)),
            next_task_id: Arc::new(AtomicU64::new(1)),
            event_tx,
            completed_rx: Arc::new(tokio::sync::Mutex::new(completed_rx)),
            worker: Arc::new(Mutex::new(WorkerSlot {
                completed_tx: Some(completed_tx),
                handle: None,
            })),
        }
    }

    /// Spawn the worker task
    ///
    /// Must be called from within a tokio runtime. Calling it again after
    /// the worker is running (or after `stop()`) has no effect. Tasks
    /// submitted before `start()` wait in the queue and are processed once
    /// the worker runs.
    ///
    /// The worker is owned by this loader for its entire lifetime: only
    /// [`stop`](Self::stop) ends it. Aborting the runtime (or the spawned
    /// task) while a fetch is in flight leaves that task's handle
    /// permanently incomplete — a known limitation of non-preemptive
    /// cancellation.
    pub fn start(&self) {
        let mut slot = self.worker_slot();

        // Taking the sender makes start() idempotent
        let Some(completed_tx) = slot.completed_tx.take() else {
            return;
        };

        let worker = Worker {
            queue: Arc::clone(&self.queue),
            fetcher: Arc::clone(&self.fetcher),
            parser: Arc::clone(&self.parser),
            completed_tx,
            event_tx: self.event_tx.clone(),
        };

        slot.handle = Some(tokio::spawn(worker.run()));
        tracing::info!(
            ordering = ?self.config.ordering,
            capacity = ?self.config.capacity,
            "feed loader started"
        );
    }

    /// Submit a feed URI with [`Priority::DEFAULT`]
    ///
    /// See [`submit_with_priority`](Self::submit_with_priority).
    pub fn submit(&self, uri: &str) -> Result<LoadHandle> {
        self.submit_with_priority(uri, Priority::DEFAULT)
    }

    /// Submit a feed URI to be loaded asynchronously
    ///
    /// Returns a handle to the scheduled load immediately; the fetch/parse
    /// work happens on the worker. The priority only influences dequeue
    /// order on a loader configured with
    /// [`QueueOrder::Priority`](crate::config::QueueOrder::Priority).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUri`] when `uri` is empty — checked synchronously,
    ///   nothing is enqueued.
    /// - [`RejectedSubmission::Stopped`] after [`stop`](Self::stop).
    /// - [`RejectedSubmission::AtCapacity`] when a bounded queue is full;
    ///   this is back-pressure, the loader itself is fine.
    pub fn submit_with_priority(&self, uri: &str, priority: Priority) -> Result<LoadHandle> {
        if uri.trim().is_empty() {
            return Err(Error::InvalidUri("feed URI must not be empty".to_string()));
        }

        if self.closed.load(Ordering::SeqCst) {
            return Err(RejectedSubmission::Stopped.into());
        }

        let id = TaskId::new(self.next_task_id.fetch_add(1, Ordering::Relaxed));
        let task = Task::new(id, uri.to_string(), priority);

        self.queue.push(Arc::clone(&task))?;

        // A stop() racing with this submit may have closed the loader after
        // the check above. The re-check keeps the accepted/rejected boundary
        // exact: a rejected submission must never be processed, so the task
        // is cancelled while it is still Ready.
        if self.closed.load(Ordering::SeqCst) {
            task.cancel();
            return Err(RejectedSubmission::Stopped.into());
        }

        tracing::debug!(
            task_id = id.get(),
            uri,
            priority = priority.get(),
            "feed load queued"
        );
        self.emit_event(Event::Queued {
            id,
            uri: uri.to_string(),
        });

        Ok(LoadHandle::new(task))
    }

    /// Cancel a pending load
    ///
    /// Equivalent to [`LoadHandle::cancel`]: succeeds only while the worker
    /// has not claimed the task.
    pub fn cancel(&self, handle: &LoadHandle) -> bool {
        handle.cancel()
    }

    /// Returns true while feeds are queued and the loader is accepting work
    pub fn is_loading(&self) -> bool {
        // order of conjuncts matters: the queue must be observed before the
        // closed flag
        !self.queue.is_empty() && !self.closed.load(Ordering::SeqCst)
    }

    /// Stop the loader after draining all previously accepted work
    ///
    /// New submissions are rejected from this point on. Every task accepted
    /// before the stop still runs to completion; the call returns once the
    /// worker has drained the queue and exited. Safe to call more than once.
    pub async fn stop(&self) {
        // The flag write must precede the shutdown enqueue: a submit racing
        // with stop() either lands before the shutdown entry (and is still
        // processed) or observes the flag and is rejected.
        self.closed.store(true, Ordering::SeqCst);
        self.queue.push_shutdown();

        let handle = self.worker_slot().handle.take();
        if let Some(handle) = handle {
            tracing::info!("waiting for pending feed loads to drain");
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "worker task did not exit cleanly");
            }
        }

        self.emit_event(Event::Stopped);
        tracing::info!("feed loader stopped");
    }

    /// Wait for the next handle to complete, in completion order
    ///
    /// Independent of which handle a caller is holding: whatever finishes
    /// next is returned. Returns `None` once the loader has stopped and all
    /// completed handles have been taken.
    pub async fn take(&self) -> Option<LoadHandle> {
        self.completed_rx.lock().await.recv().await
    }

    /// Take an already-completed handle without waiting
    pub async fn poll(&self) -> Option<LoadHandle> {
        self.completed_rx.lock().await.try_recv().ok()
    }

    /// As [`take`](Self::take), bounded by `timeout`; `None` on deadline
    pub async fn poll_timeout(&self, timeout: Duration) -> Option<LoadHandle> {
        let mut completed = self.completed_rx.lock().await;
        tokio::time::timeout(timeout, completed.recv())
            .await
            .ok()
            .flatten()
    }

    /// Subscribe to load events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers the event is silently dropped.
    fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    fn worker_slot(&self) -> std::sync::MutexGuard<'_, WorkerSlot> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
