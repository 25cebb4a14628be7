use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::app::{Result, WikiError};
use crate::fetcher::{FetchResult, Fetcher};

pub(crate) const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>The RISKS Digest</title>
    <description>Forum On Risks To The Public In Computers And Related Systems</description>
    <link>http://catless.ncl.ac.uk/Risks/</link>
    <lastBuildDate>Mon, 01 Jan 2024 00:00:00 GMT</lastBuildDate>
    <item>
      <title>Printer fires again</title>
      <link>http://catless.ncl.ac.uk/Risks/34/10#subj1</link>
      <pubDate>Sun, 31 Dec 2023 12:00:00 GMT</pubDate>
      <dc:creator>Peter G. Neumann</dc:creator>
      <description>First paragraph.

Second paragraph.</description>
    </item>
    <item>
      <title>Leap second woes</title>
      <link>http://catless.ncl.ac.uk/Risks/34/10#subj2</link>
      <description>Only one.</description>
    </item>
  </channel>
</rss>"#;

/// Fetcher answering from a queue of canned responses. An empty queue
/// answers with a 503 fetch failure.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<FetchResult>>>,
    requests: Mutex<Vec<(Option<String>, Option<String>)>>,
    calls: AtomicUsize,
    hold: AtomicBool,
    /// Signalled when a held fetch has started.
    pub entered: Notify,
    /// Releases a held fetch.
    pub release: Notify,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<FetchResult>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn push_feed(&self, body: &str, last_modified: Option<&str>) {
        self.push(Ok(FetchResult::Content {
            body: body.as_bytes().to_vec(),
            etag: None,
            last_modified: last_modified.map(String::from),
        }));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// (etag, last_modified) sent with each request.
    pub fn requests(&self) -> Vec<(Option<String>, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }

    /// Makes the next fetch wait for [`Self::release`].
    pub fn hold_next(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        url: &str,
        etag: Option<&str>,
        last_modified: Option<&str>,
    ) -> Result<FetchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((etag.map(String::from), last_modified.map(String::from)));

        if self.hold.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }

        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Err(WikiError::Fetch {
                url: url.to_string(),
                status: 503,
            })
        })
    }
}
