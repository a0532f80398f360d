//! # rss-loader
//!
//! Asynchronous RSS/Atom feed loading library.
//!
//! ## Design Philosophy
//!
//! rss-loader is designed to be:
//! - **Non-blocking** - `submit()` returns a handle immediately; fetch and
//!   parse work happens on a single background worker
//! - **Ordered** - feeds load in FIFO or priority order, chosen at
//!   construction
//! - **Library-first** - no CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use rss_loader::{Config, RssLoader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = RssLoader::new(Config::default())?;
//!     loader.start();
//!
//!     // Subscribe to events
//!     let mut events = loader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     // Await a specific feed through its handle...
//!     let handle = loader.submit("https://example.com/feed.xml")?;
//!     let feed = handle.get().await?;
//!     println!("{} items", feed.items.len());
//!
//!     // ...or drain results in completion order
//!     loader.submit("https://example.com/other.xml")?;
//!     if let Some(completed) = loader.take().await {
//!         println!("finished: {}", completed.uri());
//!     }
//!
//!     loader.stop().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Feed value model
pub mod feed;
/// Feed retrieval collaborator
pub mod fetcher;
/// Asynchronous loading core (queue, handle, worker, facade)
pub mod loader;
/// Feed parsing collaborator
pub mod parser;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, FetchConfig, QueueOrder};
pub use error::{Error, ParseError, RejectedSubmission, Result, TransportError};
pub use feed::{Enclosure, Feed, Item, Thumbnail};
pub use fetcher::{Fetcher, HttpFetcher};
pub use loader::{LoadHandle, RssLoader};
pub use parser::{FeedParser, SyndicationParser};
pub use types::{Event, Priority, TaskId, TaskState};
