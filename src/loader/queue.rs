//! Task queue handing work from submitting callers to the worker.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Notify;

use crate::config::QueueOrder;
use crate::error::RejectedSubmission;

use super::task::Task;

/// One element of the task queue
///
/// `Shutdown` replaces the classic sentinel object: it carries no URI, is
/// never completed and never reaches a caller. The worker exits when it
/// dequeues one.
pub(crate) enum QueueEntry {
    /// A submitted load task
    Task(Arc<Task>),
    /// Signal for the worker to exit after draining everything before it
    Shutdown,
}

// Heap order for the priority variant: tasks by ascending priority (the heap
// is a max-heap, so the highest priority surfaces first) and Shutdown below
// every task, so stop() drains all accepted work before the worker exits.
// Tasks of equal priority compare Equal, which leaves their relative heap
// order unspecified.
impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        match (self, other) {
            (QueueEntry::Shutdown, QueueEntry::Shutdown) => CmpOrdering::Equal,
            (QueueEntry::Shutdown, QueueEntry::Task(_)) => CmpOrdering::Less,
            (QueueEntry::Task(_), QueueEntry::Shutdown) => CmpOrdering::Greater,
            (QueueEntry::Task(a), QueueEntry::Task(b)) => a.priority().cmp(&b.priority()),
        }
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}

impl Eq for QueueEntry {}

enum Backing {
    Fifo(VecDeque<QueueEntry>),
    Priority(BinaryHeap<QueueEntry>),
}

impl Backing {
    fn len(&self) -> usize {
        match self {
            Backing::Fifo(entries) => entries.len(),
            Backing::Priority(entries) => entries.len(),
        }
    }

    fn push(&mut self, entry: QueueEntry) {
        match self {
            Backing::Fifo(entries) => entries.push_back(entry),
            Backing::Priority(entries) => entries.push(entry),
        }
    }

    fn pop(&mut self) -> Option<QueueEntry> {
        match self {
            Backing::Fifo(entries) => entries.pop_front(),
            Backing::Priority(entries) => entries.pop(),
        }
    }
}

/// Thread-safe queue between submitting callers and the single worker
///
/// Enqueue never blocks: a bounded queue at capacity rejects the push
/// instead. Dequeue is the worker's sole suspension point. The FIFO variant
/// preserves strict insertion order; the priority variant dequeues by
/// descending priority and does not guarantee the relative order of tasks
/// with equal priority.
pub(crate) struct TaskQueue {
    entries: Mutex<Backing>,
    notify: Notify,
    capacity: Option<usize>,
}

impl TaskQueue {
    pub(crate) fn new(order: QueueOrder, capacity: Option<usize>) -> Self {
        let entries = match order {
            QueueOrder::Fifo => Backing::Fifo(VecDeque::new()),
            QueueOrder::Priority => Backing::Priority(BinaryHeap::new()),
        };

        Self {
            entries: Mutex::new(entries),
            notify: Notify::new(),
            capacity,
        }
    }

    /// Enqueue a task, failing with a back-pressure signal when a bounded
    /// queue is full
    pub(crate) fn push(&self, task: Arc<Task>) -> Result<(), RejectedSubmission> {
        {
            let mut entries = self.lock();

            if let Some(capacity) = self.capacity
                && entries.len() >= capacity
            {
                return Err(RejectedSubmission::AtCapacity);
            }

            entries.push(QueueEntry::Task(task));
        }

        self.notify.notify_one();
        Ok(())
    }

    /// Enqueue the shutdown signal. Exempt from the capacity bound so that
    /// stop() always lands.
    pub(crate) fn push_shutdown(&self) {
        self.lock().push(QueueEntry::Shutdown);
        self.notify.notify_one();
    }

    /// Dequeue the next entry, suspending while the queue is empty
    pub(crate) async fn pop(&self) -> QueueEntry {
        loop {
            // notify_one() stores a permit when nobody is waiting, so a push
            // landing between the empty check and the await still completes
            // the await immediately.
            let notified = self.notify.notified();

            if let Some(entry) = self.lock().pop() {
                return entry;
            }

            notified.await;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Backing> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
