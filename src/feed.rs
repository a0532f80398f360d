//! In-memory representation of a parsed syndication feed
//!
//! These are the value types produced by a
//! [`FeedParser`](crate::parser::FeedParser) and returned to callers through
//! a [`LoadHandle`](crate::LoadHandle). All fields are plain data; a `Feed`
//! is shared between awaiting callers behind an `Arc` and never mutated
//! after completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parsed feed and its items
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    /// Feed title
    pub title: Option<String>,

    /// Link to the website the feed belongs to. When the document itself
    /// carries no link, the loader fills in the URI the feed was fetched from.
    pub link: Option<String>,

    /// Feed description
    pub description: Option<String>,

    /// Category names assigned to the whole feed
    #[serde(default)]
    pub categories: Vec<String>,

    /// Publication date of the feed
    pub pub_date: Option<DateTime<Utc>>,

    /// Last time the feed content changed
    pub last_build_date: Option<DateTime<Utc>>,

    /// Suggested cache lifetime in minutes
    pub ttl: Option<u32>,

    /// Items in document order
    #[serde(default)]
    pub items: Vec<Item>,
}

/// A single entry of a feed
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item title
    pub title: Option<String>,

    /// Link to the full story
    pub link: Option<String>,

    /// Item description or summary
    pub description: Option<String>,

    /// Full content when the feed carries it (`<content:encoded>` in RSS,
    /// `<content>` in Atom)
    pub content: Option<String>,

    /// Unique identifier (GUID for RSS, entry id for Atom)
    pub guid: Option<String>,

    /// Category names assigned to the item
    #[serde(default)]
    pub categories: Vec<String>,

    /// Publication date of the item
    pub pub_date: Option<DateTime<Utc>>,

    /// Attached media file, if any
    pub enclosure: Option<Enclosure>,

    /// Preview images in order of importance (`<media:thumbnail>`)
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

/// An attached media file (`<enclosure>`)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enclosure {
    /// URL of the attachment
    pub url: String,

    /// Size in bytes, when the feed declares one
    pub length: Option<u64>,

    /// MIME type of the attachment
    pub mime_type: String,
}

/// A preview image (`<media:thumbnail>`)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    /// URL of the image
    pub url: String,

    /// Image width in pixels, when declared
    pub width: Option<u32>,

    /// Image height in pixels, when declared
    pub height: Option<u32>,
}
