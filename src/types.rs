//! Core types for rss-loader

use serde::{Deserialize, Serialize};

/// Unique identifier for a submitted load task
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl TaskId {
    /// Create a new TaskId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<TaskId> for u64 {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl PartialEq<u64> for TaskId {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

impl PartialEq<TaskId> for u64 {
    fn eq(&self, other: &TaskId) -> bool {
        *self == other.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Load priority
///
/// An open integer where a larger value gives higher priority. Priorities only
/// influence dequeue order on loaders constructed with
/// [`QueueOrder::Priority`](crate::config::QueueOrder::Priority); FIFO loaders
/// ignore them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
    /// Priority assigned by [`submit`](crate::RssLoader::submit) when the
    /// caller does not specify one
    pub const DEFAULT: Priority = Priority(3);

    /// Create a new Priority
    pub fn new(priority: i32) -> Self {
        Self(priority)
    }

    /// Get the inner i32 value
    pub fn get(&self) -> i32 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i32> for Priority {
    fn from(priority: i32) -> Self {
        Self(priority)
    }
}

impl From<Priority> for i32 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a load task
///
/// Transitions are monotonic and never regress:
/// Ready → Running → Done (worker), or Ready → Cancelled (caller).
/// Done and Cancelled are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Queued and waiting for the worker to claim it
    Ready,
    /// Claimed by the worker; fetch/parse in progress
    Running,
    /// Completed with a value or a captured error
    Done,
    /// Cancelled by a caller before the worker claimed it
    Cancelled,
}

impl TaskState {
    /// Convert integer state code to TaskState enum
    pub fn from_u8(state: u8) -> Self {
        match state {
            0 => TaskState::Ready,
            1 => TaskState::Running,
            2 => TaskState::Done,
            3 => TaskState::Cancelled,
            _ => TaskState::Cancelled, // Unknown codes treated as terminal
        }
    }

    /// Convert TaskState enum to integer state code
    pub fn to_u8(&self) -> u8 {
        match self {
            TaskState::Ready => 0,
            TaskState::Running => 1,
            TaskState::Done => 2,
            TaskState::Cancelled => 3,
        }
    }

    /// Returns true for Done and Cancelled
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Done | TaskState::Cancelled)
    }
}

/// Event emitted during the load lifecycle
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Task accepted and enqueued
    Queued {
        /// Task ID
        id: TaskId,
        /// Feed URI to be loaded
        uri: String,
    },

    /// Worker claimed the task and started fetching
    Started {
        /// Task ID
        id: TaskId,
    },

    /// Feed fetched and parsed successfully
    Loaded {
        /// Task ID
        id: TaskId,
    },

    /// Fetch or parse failed; the error is captured on the handle
    Failed {
        /// Task ID
        id: TaskId,
        /// Error message
        error: String,
    },

    /// Task was cancelled before the worker claimed it
    Cancelled {
        /// Task ID
        id: TaskId,
    },

    /// Loader stopped and the worker exited
    Stopped,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_state_round_trip() {
        for state in [
            TaskState::Ready,
            TaskState::Running,
            TaskState::Done,
            TaskState::Cancelled,
        ] {
            assert_eq!(TaskState::from_u8(state.to_u8()), state);
        }
    }

    #[test]
    fn test_task_state_terminal() {
        assert!(!TaskState::Ready.is_terminal());
        assert!(!TaskState::Running.is_terminal());
        assert!(TaskState::Done.is_terminal());
        assert!(TaskState::Cancelled.is_terminal());
    }

    #[test]
    fn test_priority_ordering_and_default() {
        assert!(Priority::new(9) > Priority::new(5));
        assert!(Priority::new(5) > Priority::new(1));
        assert_eq!(Priority::default(), Priority(3));
    }

    #[test]
    fn test_task_id_display_and_parse() {
        let id = TaskId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!("42".parse::<TaskId>().unwrap(), id);
        assert_eq!(id, 42u64);
    }
}
