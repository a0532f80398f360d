//! Error types for rss-loader
//!
//! The taxonomy separates synchronous submission failures from failures
//! captured on a task and surfaced later through its handle:
//! - [`RejectedSubmission`] is returned directly from `submit()`.
//! - [`TransportError`] and [`ParseError`] are produced on the worker thread,
//!   stored on the task, and re-raised by `get()`/`take()` — they never
//!   propagate out of the worker itself, so one failing feed cannot affect
//!   other tasks.
//! - [`Error::Cancelled`] and [`Error::Timeout`] are caller-observed
//!   conditions; a timeout is local to the `get_timeout` call that raised it
//!   and never mutates task state.
//!
//! Every variant that can be captured on a task is `Clone`: a completed
//! handle must return the identical outcome on every subsequent read.

use thiserror::Error;

/// Result type alias for rss-loader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rss-loader
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// Submission was rejected synchronously; nothing was enqueued
    #[error("submission rejected: {0}")]
    Rejected(#[from] RejectedSubmission),

    /// Feed could not be retrieved
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Retrieved payload could not be parsed as a feed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Task was cancelled before the worker claimed it
    #[error("load was cancelled before it started")]
    Cancelled,

    /// A bounded `get_timeout` call elapsed before the task completed.
    /// The underlying task is unaffected and may still complete later.
    #[error("timed out waiting for the load to complete")]
    Timeout,

    /// Feed URI failed fail-fast validation in `submit()`
    #[error("invalid feed URI: {0}")]
    InvalidUri(String),
}

/// Reasons a `submit()` call can be rejected
///
/// A rejection is a back-pressure or lifecycle signal, not a load failure:
/// no task was created and no queue slot was consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RejectedSubmission {
    /// The loader has been stopped and accepts no new submissions
    #[error("loader is stopped")]
    Stopped,

    /// The bounded queue is at capacity
    #[error("queue is at capacity")]
    AtCapacity,
}

/// Errors produced by a [`Fetcher`](crate::fetcher::Fetcher)
#[derive(Clone, Debug, Error)]
pub enum TransportError {
    /// The server answered with a non-success HTTP status
    #[error("server returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code returned by the server
        status: u16,
        /// Reason phrase or response context
        message: String,
    },

    /// The request could not be completed (connect failure, timeout,
    /// invalid URI, interrupted body read)
    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// HTTP status code carried by this error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Request(_) => None,
        }
    }
}

/// Error produced by a [`FeedParser`](crate::parser::FeedParser) on a
/// malformed payload
#[derive(Clone, Debug, Error)]
#[error("malformed feed: {message}")]
pub struct ParseError {
    /// Description of why the payload could not be parsed
    pub message: String,
}

impl ParseError {
    /// Create a parse error from any displayable cause
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_status_accessor() {
        let err = TransportError::Status {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert_eq!(err.status(), Some(404));

        let err = TransportError::Request("connection refused".to_string());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_rejection_converts_into_error() {
        let err: Error = RejectedSubmission::Stopped.into();
        assert!(matches!(
            err,
            Error::Rejected(RejectedSubmission::Stopped)
        ));
    }

    #[test]
    fn test_captured_errors_clone_identically() {
        let err = Error::Transport(TransportError::Status {
            status: 503,
            message: "Service Unavailable".to_string(),
        });
        assert_eq!(err.to_string(), err.clone().to_string());
    }
}
