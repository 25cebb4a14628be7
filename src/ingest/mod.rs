//! Fetches the feed and turns the payload into channel metadata and items.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use feed_rs::parser;

use crate::app::{Result, WikiError};
use crate::domain::{FeedChannel, FeedItem};
use crate::fetcher::{FetchResult, Fetcher};

/// Cache validators from a previous fetch, sent back as conditional headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

/// Result of one successful fetch + parse.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub channel: FeedChannel,
    pub items: Vec<FeedItem>,
    pub fetched_at: DateTime<Utc>,
    pub validators: Validators,
}

#[derive(Debug)]
pub enum IngestOutcome {
    Fetched(Ingested),
    /// Upstream answered 304 to a conditional request.
    NotModified,
}

pub struct Ingestor {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    url: String,
}

impl Ingestor {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Unconditional fetch, used on cold start.
    pub async fn ingest(&self) -> Result<Ingested> {
        match self.ingest_if_changed(&Validators::default()).await? {
            IngestOutcome::Fetched(ingested) => Ok(ingested),
            IngestOutcome::NotModified => Err(WikiError::Fetch {
                url: self.url.clone(),
                status: 304,
            }),
        }
    }

    pub async fn ingest_if_changed(&self, validators: &Validators) -> Result<IngestOutcome> {
        let result = self
            .fetcher
            .fetch(
                &self.url,
                validators.etag.as_deref(),
                validators.last_modified.as_deref(),
            )
            .await?;

        match result {
            FetchResult::NotModified => {
                tracing::debug!("Feed {} not modified", self.url);
                Ok(IngestOutcome::NotModified)
            }
            FetchResult::Content {
                body,
                etag,
                last_modified,
            } => {
                let fetched_at = last_modified
                    .as_deref()
                    .and_then(parse_http_date)
                    .unwrap_or_else(Utc::now);
                let (channel, items) = parse_feed(&body, fetched_at)?;

                tracing::info!(
                    "Fetched {} items from {} (last modified {})",
                    items.len(),
                    self.url,
                    fetched_at
                );

                Ok(IngestOutcome::Fetched(Ingested {
                    channel,
                    items,
                    fetched_at,
                    validators: Validators {
                        etag,
                        last_modified,
                    },
                }))
            }
        }
    }
}

pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Parses an RSS/Atom payload. Items keep document order. Dates missing
/// from the payload fall back to `fetched_at` (channel) and to the channel
/// date (items).
pub fn parse_feed(body: &[u8], fetched_at: DateTime<Utc>) -> Result<(FeedChannel, Vec<FeedItem>)> {
    let feed = parser::parse(body).map_err(|e| WikiError::FeedParse(e.to_string()))?;

    let channel = FeedChannel {
        title: feed.title.map(|t| t.content).unwrap_or_default(),
        description: feed.description.map(|d| d.content).unwrap_or_default(),
        link: feed.links.first().map(|l| l.href.clone()).unwrap_or_default(),
        last_build_date: feed.updated.unwrap_or(fetched_at),
    };

    let items = feed
        .entries
        .into_iter()
        .map(|entry| FeedItem {
            title: entry.title.map(|t| t.content),
            description: entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default(),
            published_at: entry
                .published
                .or(entry.updated)
                .unwrap_or(channel.last_build_date),
            author: entry.authors.first().map(|a| a.name.clone()),
            link: entry.links.first().map(|l| l.href.clone()),
        })
        .collect();

    Ok((channel, items))
}
