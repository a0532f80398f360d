//! Worker loop — the single background task executing all fetch/parse work.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::error::Error;
use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::types::Event;

use super::queue::{QueueEntry, TaskQueue};
use super::task::{LoadHandle, LoadOutcome, Task};

/// State moved into the spawned worker task
///
/// The worker owns the completion-channel sender; dropping it when the loop
/// exits closes the channel, which is how `take()` learns that no further
/// handles will arrive.
pub(crate) struct Worker {
    pub(crate) queue: Arc<TaskQueue>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) parser: Arc<dyn FeedParser>,
    pub(crate) completed_tx: mpsc::UnboundedSender<LoadHandle>,
    pub(crate) event_tx: broadcast::Sender<Event>,
}

impl Worker {
    /// Dequeue and execute tasks until the shutdown entry surfaces
    ///
    /// All fetch/parse work is serialized through this loop. A failing feed
    /// is captured on its task and never propagates out of the loop, so one
    /// bad feed cannot take the worker down with it.
    pub(crate) async fn run(self) {
        tracing::debug!("feed loader worker started");

        loop {
            match self.queue.pop().await {
                QueueEntry::Shutdown => break,
                QueueEntry::Task(task) => self.process(task).await,
            }
        }

        tracing::debug!("feed loader worker exiting");
    }

    async fn process(&self, task: Arc<Task>) {
        // Claim Ready → Running; a task cancelled before the claim is
        // skipped without invoking the collaborators.
        if !task.try_claim() {
            tracing::debug!(
                task_id = task.id().get(),
                uri = task.uri(),
                "skipping cancelled task"
            );
            self.emit(Event::Cancelled { id: task.id() });
            return;
        }

        tracing::debug!(task_id = task.id().get(), uri = task.uri(), "loading feed");
        self.emit(Event::Started { id: task.id() });

        let outcome = self.load(&task).await;

        let event = match &outcome {
            Ok(_) => {
                tracing::debug!(task_id = task.id().get(), uri = task.uri(), "feed loaded");
                Event::Loaded { id: task.id() }
            }
            Err(e) => {
                tracing::warn!(
                    task_id = task.id().get(),
                    uri = task.uri(),
                    error = %e,
                    "feed load failed"
                );
                Event::Failed {
                    id: task.id(),
                    error: e.to_string(),
                }
            }
        };

        // Exactly one completion per claimed task, on every path above
        task.complete(outcome);

        // Deliver in completion order; nobody draining the channel is fine
        self.completed_tx.send(LoadHandle::new(task)).ok();

        self.emit(event);
    }

    /// Fetch then parse. Returning early with `?` on either step keeps the
    /// caller's single `complete()` the only finalization point.
    async fn load(&self, task: &Arc<Task>) -> LoadOutcome {
        let payload = self
            .fetcher
            .fetch(task.uri())
            .await
            .map_err(Error::Transport)?;

        let mut feed = self.parser.parse(&payload).map_err(Error::Parse)?;

        // A document without a link gets the URI it was fetched from
        if feed.link.is_none() {
            feed.link = Some(task.uri().to_string());
        }

        Ok(Arc::new(feed))
    }

    fn emit(&self, event: Event) {
        // send() fails when there are no subscribers; the event is dropped
        self.event_tx.send(event).ok();
    }
}
