//! Feed parsing collaborator
//!
//! Parsing is a synchronous, CPU-only step behind the [`FeedParser`] trait,
//! invoked from the worker after the fetch completes. The built-in
//! [`SyndicationParser`] understands RSS 2.0 and Atom documents and maps both
//! into the common [`Feed`] model.

use chrono::{DateTime, Utc};

use crate::error::ParseError;
use crate::feed::{Enclosure, Feed, Item, Thumbnail};

/// Converts a raw feed payload into a [`Feed`]
pub trait FeedParser: Send + Sync {
    /// Parse `payload` as a feed document
    fn parse(&self, payload: &[u8]) -> Result<Feed, ParseError>;
}

/// Parser for RSS 2.0 and Atom documents
///
/// The payload is tried as RSS first and as Atom second; the parse error
/// reports both failures when neither format matches.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyndicationParser;

impl SyndicationParser {
    /// Create a new syndication parser
    pub fn new() -> Self {
        Self
    }

    fn parse_rss(payload: &[u8]) -> Result<Feed, rss::Error> {
        let channel = rss::Channel::read_from(payload)?;

        let items = channel.items().iter().map(Self::map_rss_item).collect();

        Ok(Feed {
            title: opt_str(channel.title()),
            link: opt_str(channel.link()),
            description: opt_str(channel.description()),
            categories: channel
                .categories()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            pub_date: channel.pub_date().and_then(parse_rfc2822),
            last_build_date: channel.last_build_date().and_then(parse_rfc2822),
            ttl: channel.ttl().and_then(|t| t.trim().parse().ok()),
            items,
        })
    }

    fn map_rss_item(item: &rss::Item) -> Item {
        // Prefer guid, fall back to the link
        let guid = item
            .guid()
            .map(|g| g.value().to_string())
            .or_else(|| item.link().map(|l| l.to_string()));

        let enclosure = item.enclosure().map(|enc| Enclosure {
            url: enc.url().to_string(),
            length: enc.length().trim().parse().ok(),
            mime_type: enc.mime_type().to_string(),
        });

        Item {
            title: item.title().map(|t| t.to_string()),
            link: item.link().map(|l| l.to_string()),
            description: item.description().map(|d| d.to_string()),
            content: item.content().map(|c| c.to_string()),
            guid,
            categories: item
                .categories()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            pub_date: item.pub_date().and_then(parse_rfc2822),
            enclosure,
            thumbnails: Self::media_thumbnails(item),
        }
    }

    /// Extract `<media:thumbnail>` elements, in document order
    fn media_thumbnails(item: &rss::Item) -> Vec<Thumbnail> {
        item.extensions()
            .get("media")
            .and_then(|media| media.get("thumbnail"))
            .map(|thumbnails| {
                thumbnails
                    .iter()
                    .filter_map(|ext| {
                        let attrs = ext.attrs();
                        let url = attrs.get("url")?.to_string();
                        Some(Thumbnail {
                            url,
                            width: attrs.get("width").and_then(|w| w.parse().ok()),
                            height: attrs.get("height").and_then(|h| h.parse().ok()),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parse_atom(payload: &[u8]) -> Result<Feed, atom_syndication::Error> {
        let feed = atom_syndication::Feed::read_from(payload)?;

        let items = feed.entries().iter().map(Self::map_atom_entry).collect();

        Ok(Feed {
            title: opt_str(feed.title().as_str()),
            link: primary_link(feed.links()),
            description: feed.subtitle().map(|s| s.as_str().to_string()),
            categories: feed
                .categories()
                .iter()
                .map(|c| c.term().to_string())
                .collect(),
            pub_date: None,
            last_build_date: Some(feed.updated().with_timezone(&Utc)),
            ttl: None,
            items,
        })
    }

    fn map_atom_entry(entry: &atom_syndication::Entry) -> Item {
        // Publication date: prefer published, fall back to updated
        let pub_date = entry
            .published()
            .unwrap_or(entry.updated())
            .with_timezone(&Utc);

        let enclosure = entry
            .links()
            .iter()
            .find(|link| link.rel() == "enclosure")
            .map(|link| Enclosure {
                url: link.href().to_string(),
                length: link.length().and_then(|l| l.parse().ok()),
                mime_type: link.mime_type().unwrap_or("").to_string(),
            });

        // Description from summary or content
        let description = entry.summary().map(|s| s.as_str().to_string());
        let content = entry
            .content()
            .and_then(|c| c.value().map(|v| v.to_string()));

        Item {
            title: opt_str(entry.title().as_str()),
            link: primary_link(entry.links()),
            description,
            content,
            guid: opt_str(entry.id()),
            categories: entry
                .categories()
                .iter()
                .map(|c| c.term().to_string())
                .collect(),
            pub_date: Some(pub_date),
            enclosure,
            thumbnails: Vec::new(),
        }
    }
}

impl FeedParser for SyndicationParser {
    fn parse(&self, payload: &[u8]) -> Result<Feed, ParseError> {
        match Self::parse_rss(payload) {
            Ok(feed) => Ok(feed),
            Err(rss_err) => match Self::parse_atom(payload) {
                Ok(feed) => Ok(feed),
                Err(atom_err) => Err(ParseError::new(format!(
                    "payload is neither RSS nor Atom. RSS error: {}. Atom error: {}",
                    rss_err, atom_err
                ))),
            },
        }
    }
}

fn opt_str(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Prefer the `alternate` link, fall back to the first one
fn primary_link(links: &[atom_syndication::Link]) -> Option<String> {
    links
        .iter()
        .find(|link| link.rel() == "alternate")
        .or_else(|| links.first())
        .map(|link| link.href().to_string())
}

fn parse_rfc2822(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/" xmlns:content="http://purl.org/rss/1.0/modules/content/">
    <channel>
        <title>Example News</title>
        <link>https://example.com</link>
        <description>News about examples</description>
        <category>news</category>
        <pubDate>Mon, 01 Jan 2024 12:00:00 +0000</pubDate>
        <lastBuildDate>Mon, 01 Jan 2024 13:00:00 +0000</lastBuildDate>
        <ttl>60</ttl>
        <item>
            <title>First story</title>
            <link>https://example.com/stories/1</link>
            <guid>story-1</guid>
            <description>The first story</description>
            <content:encoded><![CDATA[<p>Full text</p>]]></content:encoded>
            <category>breaking</category>
            <pubDate>Mon, 01 Jan 2024 11:30:00 +0000</pubDate>
            <enclosure url="https://example.com/media/1.mp3" length="1048576" type="audio/mpeg"/>
            <media:thumbnail url="https://example.com/thumbs/1-small.jpg" width="66" height="49"/>
            <media:thumbnail url="https://example.com/thumbs/1-large.jpg" width="144" height="81"/>
        </item>
        <item>
            <title>Second story</title>
            <link>https://example.com/stories/2</link>
        </item>
    </channel>
</rss>"#;

    const ATOM_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Example Atom</title>
    <subtitle>Entries about examples</subtitle>
    <id>https://example.com/atom</id>
    <updated>2024-01-01T12:00:00Z</updated>
    <link href="https://example.com" rel="alternate"/>
    <entry>
        <title>Entry one</title>
        <id>entry-1</id>
        <updated>2024-01-01T12:00:00Z</updated>
        <published>2024-01-01T10:00:00Z</published>
        <summary>A summary</summary>
        <category term="updates"/>
        <link href="https://example.com/entries/1" rel="alternate"/>
        <link href="https://example.com/media/1.mp3" rel="enclosure" type="audio/mpeg" length="2048"/>
    </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_channel_fields() {
        let feed = SyndicationParser::new().parse(RSS_FEED.as_bytes()).unwrap();

        assert_eq!(feed.title.as_deref(), Some("Example News"));
        assert_eq!(feed.link.as_deref(), Some("https://example.com"));
        assert_eq!(feed.description.as_deref(), Some("News about examples"));
        assert_eq!(feed.categories, vec!["news".to_string()]);
        assert_eq!(feed.ttl, Some(60));
        assert_eq!(
            feed.pub_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(
            feed.last_build_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap())
        );
        assert_eq!(feed.items.len(), 2);
    }

    #[test]
    fn test_parse_rss_item_fields() {
        let feed = SyndicationParser::new().parse(RSS_FEED.as_bytes()).unwrap();
        let item = &feed.items[0];

        assert_eq!(item.title.as_deref(), Some("First story"));
        assert_eq!(item.link.as_deref(), Some("https://example.com/stories/1"));
        assert_eq!(item.guid.as_deref(), Some("story-1"));
        assert_eq!(item.content.as_deref(), Some("<p>Full text</p>"));
        assert_eq!(item.categories, vec!["breaking".to_string()]);
        assert_eq!(
            item.pub_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 11, 30, 0).unwrap())
        );

        let enclosure = item.enclosure.as_ref().unwrap();
        assert_eq!(enclosure.url, "https://example.com/media/1.mp3");
        assert_eq!(enclosure.length, Some(1_048_576));
        assert_eq!(enclosure.mime_type, "audio/mpeg");
    }

    #[test]
    fn test_parse_rss_media_thumbnails_in_order() {
        let feed = SyndicationParser::new().parse(RSS_FEED.as_bytes()).unwrap();
        let thumbnails = &feed.items[0].thumbnails;

        assert_eq!(thumbnails.len(), 2);
        assert_eq!(thumbnails[0].url, "https://example.com/thumbs/1-small.jpg");
        assert_eq!(thumbnails[0].width, Some(66));
        assert_eq!(thumbnails[0].height, Some(49));
        assert_eq!(thumbnails[1].url, "https://example.com/thumbs/1-large.jpg");
    }

    #[test]
    fn test_parse_rss_item_guid_falls_back_to_link() {
        let feed = SyndicationParser::new().parse(RSS_FEED.as_bytes()).unwrap();
        let item = &feed.items[1];

        assert_eq!(item.guid.as_deref(), Some("https://example.com/stories/2"));
        assert!(item.enclosure.is_none());
        assert!(item.thumbnails.is_empty());
    }

    #[test]
    fn test_parse_atom_falls_back_after_rss() {
        let feed = SyndicationParser::new()
            .parse(ATOM_FEED.as_bytes())
            .unwrap();

        assert_eq!(feed.title.as_deref(), Some("Example Atom"));
        assert_eq!(feed.link.as_deref(), Some("https://example.com"));
        assert_eq!(feed.description.as_deref(), Some("Entries about examples"));
        assert_eq!(
            feed.last_build_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
        );

        let item = &feed.items[0];
        assert_eq!(item.title.as_deref(), Some("Entry one"));
        assert_eq!(item.guid.as_deref(), Some("entry-1"));
        assert_eq!(item.link.as_deref(), Some("https://example.com/entries/1"));
        assert_eq!(item.description.as_deref(), Some("A summary"));
        assert_eq!(item.categories, vec!["updates".to_string()]);
        // published is preferred over updated
        assert_eq!(
            item.pub_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
        );

        let enclosure = item.enclosure.as_ref().unwrap();
        assert_eq!(enclosure.url, "https://example.com/media/1.mp3");
        assert_eq!(enclosure.length, Some(2048));
    }

    #[test]
    fn test_parse_garbage_reports_both_formats() {
        let err = SyndicationParser::new()
            .parse(b"this is not xml at all")
            .unwrap_err();

        assert!(err.message.contains("RSS error"), "got: {}", err.message);
        assert!(err.message.contains("Atom error"), "got: {}", err.message);
    }

    #[test]
    fn test_parse_unparseable_dates_become_none() {
        let doc = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>t</title><link>https://example.com</link><description>d</description>
    <pubDate>not a date</pubDate>
    <item><title>i</title><pubDate>also not a date</pubDate></item>
</channel></rss>"#;

        let feed = SyndicationParser::new().parse(doc.as_bytes()).unwrap();
        assert_eq!(feed.pub_date, None);
        assert_eq!(feed.items[0].pub_date, None);
    }
}
