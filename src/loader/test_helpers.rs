//! Shared stub collaborators for loader tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{ParseError, TransportError};
use crate::feed::Feed;
use crate::fetcher::Fetcher;
use crate::parser::FeedParser;

use super::RssLoader;

/// Fetcher with canned per-URI outcomes. Records the order URIs were
/// fetched in, which is how tests observe the worker's processing order.
pub(crate) struct StubFetcher {
    responses: Mutex<HashMap<String, Result<Vec<u8>, TransportError>>>,
    delay: Option<Duration>,
    fetched: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            delay: None,
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// Canned success: fetching `uri` yields `payload` as bytes
    pub(crate) fn ok(self, uri: &str, payload: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(uri.to_string(), Ok(payload.as_bytes().to_vec()));
        self
    }

    /// Canned failure: fetching `uri` yields `error`
    pub(crate) fn err(self, uri: &str, error: TransportError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(uri.to_string(), Err(error));
        self
    }

    /// Sleep this long inside every fetch, to simulate a slow server
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URIs in the order the worker fetched them
    pub(crate) fn fetch_order(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, TransportError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.fetched.lock().unwrap().push(uri.to_string());

        self.responses
            .lock()
            .unwrap()
            .get(uri)
            .cloned()
            .unwrap_or_else(|| {
                Err(TransportError::Request(format!(
                    "no canned response for '{}'",
                    uri
                )))
            })
    }
}

/// Parser that turns the payload bytes into a feed titled with the payload
/// text, so tests can tell results apart without real XML.
pub(crate) struct StubParser;

impl FeedParser for StubParser {
    fn parse(&self, payload: &[u8]) -> Result<Feed, ParseError> {
        Ok(Feed {
            title: Some(String::from_utf8_lossy(payload).into_owned()),
            ..Feed::default()
        })
    }
}

/// Parser that rejects every payload
pub(crate) struct FailingParser;

impl FeedParser for FailingParser {
    fn parse(&self, _payload: &[u8]) -> Result<Feed, ParseError> {
        Err(ParseError::new("stub parser refuses every payload"))
    }
}

/// Loader wired with the given stub fetcher and the text-title stub parser
pub(crate) fn stub_loader(config: Config, fetcher: Arc<StubFetcher>) -> RssLoader {
    RssLoader::with_collaborators(config, fetcher, Arc::new(StubParser))
}
