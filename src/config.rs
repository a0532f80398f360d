//! Configuration types for rss-loader

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dequeue ordering of the task queue
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueOrder {
    /// Strict insertion order; submission priorities are ignored
    #[default]
    Fifo,
    /// Dequeue by descending priority. The relative order of tasks with
    /// equal priority is not guaranteed.
    Priority,
}

/// Feed fetching configuration (HTTP client behavior)
///
/// Groups settings applied to the built-in [`HttpFetcher`](crate::HttpFetcher).
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Total HTTP request timeout (default: 30 seconds)
    #[serde(default = "default_fetch_timeout")]
    pub timeout: Duration,

    /// User-Agent header sent with feed requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Main configuration for [`RssLoader`](crate::RssLoader)
///
/// Works out of the box with zero configuration: the default is an unbounded
/// FIFO loader with a 30-second fetch timeout.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Task queue ordering (default: FIFO)
    #[serde(default)]
    pub ordering: QueueOrder,

    /// Maximum number of tasks waiting in the queue (None = unbounded).
    /// When the bound is reached, `submit()` is rejected with a
    /// back-pressure signal instead of blocking.
    #[serde(default)]
    pub capacity: Option<usize>,

    /// Feed fetching settings
    #[serde(flatten)]
    pub fetch: FetchConfig,
}

impl Config {
    /// Configuration for a FIFO loader with unbounded capacity
    pub fn fifo() -> Self {
        Self {
            ordering: QueueOrder::Fifo,
            ..Self::default()
        }
    }

    /// Configuration for a priority-ordered loader with unbounded capacity
    pub fn priority() -> Self {
        Self {
            ordering: QueueOrder::Priority,
            ..Self::default()
        }
    }

    /// Bound the task queue to `capacity` pending tasks
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("rss-loader/", env!("CARGO_PKG_VERSION")).to_string()
}
