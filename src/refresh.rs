//! Time-gated re-ingestion of the feed.
//!
//! The scheduler is invoked on every inbound request. Once the refresh
//! interval has elapsed since the last successful build it attempts one
//! re-ingestion; failures keep the previous snapshot and are retried on the
//! next invocation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::app::Result;
use crate::config::format_interval;
use crate::ingest::{IngestOutcome, Ingestor, Validators};
use crate::store::{SnapshotCell, WikiSnapshot};

pub const DEFAULT_REFRESH_HOURS: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Interval not yet elapsed; nothing attempted.
    Fresh,
    /// A new snapshot was built and installed.
    Refreshed,
    /// Upstream reported no change; the timer was reset.
    NotModified,
    /// Fetch or parse failed; the previous snapshot stays.
    Failed,
    /// Another refresh is running; nothing attempted.
    InFlight,
}

#[derive(Debug)]
struct RefreshState {
    last_refresh: DateTime<Utc>,
    validators: Validators,
}

pub struct RefreshScheduler {
    cell: Arc<SnapshotCell>,
    ingestor: Ingestor,
    interval: Duration,
    state: Mutex<RefreshState>,
    attempts: AtomicUsize,
}

impl RefreshScheduler {
    /// Cold start: ingest once and build the first snapshot. Any failure is
    /// returned since there is nothing to serve yet.
    pub async fn start(ingestor: Ingestor, interval: Duration, now: DateTime<Utc>) -> Result<Self> {
        let ingested = ingestor.ingest().await?;
        let snapshot = WikiSnapshot::build(&ingested.channel, &ingested.items, ingested.fetched_at);

        tracing::info!(
            "Serving {} pages from {} (refresh every {})",
            snapshot.page_count(),
            ingestor.url(),
            format_interval(interval.num_seconds().max(0) as u64)
        );

        Ok(Self {
            cell: Arc::new(SnapshotCell::new(snapshot)),
            ingestor,
            interval,
            state: Mutex::new(RefreshState {
                last_refresh: now,
                validators: ingested.validators,
            }),
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn snapshot(&self) -> Arc<WikiSnapshot> {
        self.cell.load()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of re-ingestions attempted since start.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn maybe_refresh(&self, now: DateTime<Utc>) -> RefreshOutcome {
        let Ok(mut state) = self.state.try_lock() else {
            return RefreshOutcome::InFlight;
        };

        // an interval reaching past the representable range never expires
        match state.last_refresh.checked_add_signed(self.interval) {
            Some(due) if now >= due => {}
            _ => return RefreshOutcome::Fresh,
        }

        self.attempts.fetch_add(1, Ordering::SeqCst);
        tracing::info!("Wiki is stale (last refresh {}), re-ingesting", state.last_refresh);

        match self.ingestor.ingest_if_changed(&state.validators).await {
            Ok(IngestOutcome::Fetched(ingested)) => {
                let snapshot =
                    WikiSnapshot::build(&ingested.channel, &ingested.items, ingested.fetched_at);
                let pages = snapshot.page_count();
                self.cell.replace(snapshot);
                state.last_refresh = now;
                state.validators = ingested.validators;
                tracing::info!("Refresh complete: {} pages", pages);
                RefreshOutcome::Refreshed
            }
            Ok(IngestOutcome::NotModified) => {
                state.last_refresh = now;
                RefreshOutcome::NotModified
            }
            Err(e) => {
                tracing::warn!("Refresh of {} failed, keeping previous wiki: {}", self.ingestor.url(), e);
                RefreshOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::WikiError;
    use crate::fetcher::testing::{ScriptedFetcher, RSS_SAMPLE};
    use crate::fetcher::FetchResult;
    use chrono::TimeZone;

    const UPDATED_SAMPLE: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>The RISKS Digest</title>
    <description>Forum On Risks</description>
    <link>http://catless.ncl.ac.uk/Risks/</link>
    <lastBuildDate>Tue, 02 Jan 2024 00:00:00 GMT</lastBuildDate>
    <item><title>Brand new risk</title><link>http://r/1</link><description>New.</description></item>
  </channel>
</rss>"#;

    fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn interval() -> Duration {
        Duration::hours(DEFAULT_REFRESH_HOURS)
    }

    async fn scheduler(fetcher: Arc<ScriptedFetcher>) -> RefreshScheduler {
        fetcher.push(Ok(FetchResult::Content {
            body: RSS_SAMPLE.as_bytes().to_vec(),
            etag: Some("\"v1\"".into()),
            last_modified: Some("Mon, 01 Jan 2024 00:00:00 GMT".into()),
        }));
        let ingestor = Ingestor::new(fetcher, "http://feed.test/rss");
        RefreshScheduler::start(ingestor, interval(), start_time())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_cold_start_failure_is_fatal() {
        let ingestor = Ingestor::new(Arc::new(ScriptedFetcher::new()), "http://feed.test/rss");
        let result = RefreshScheduler::start(ingestor, interval(), start_time()).await;
        assert!(matches!(result, Err(WikiError::Fetch { .. })));
    }

    #[tokio::test]
    async fn test_no_refresh_before_interval() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let scheduler = scheduler(fetcher.clone()).await;

        let almost = start_time() + interval() - Duration::milliseconds(1);
        assert_eq!(scheduler.maybe_refresh(almost).await, RefreshOutcome::Fresh);
        assert_eq!(scheduler.attempts(), 0);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_at_interval_swaps_snapshot() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let scheduler = scheduler(fetcher.clone()).await;
        let before = scheduler.snapshot();
        fetcher.push_feed(UPDATED_SAMPLE, None);

        let due = start_time() + interval();
        assert_eq!(scheduler.maybe_refresh(due).await, RefreshOutcome::Refreshed);
        assert_eq!(scheduler.attempts(), 1);

        let after = scheduler.snapshot();
        assert!(after.page("brand-new-risk").is_some());
        assert!(before.page("brand-new-risk").is_none());
        assert!(before.page("printer-fires-again").is_some());
        assert!(after.is_consistent());

        // timer reset to the refresh time
        assert_eq!(scheduler.maybe_refresh(due + Duration::hours(1)).await, RefreshOutcome::Fresh);
        assert_eq!(scheduler.attempts(), 1);
    }

    #[tokio::test]
    async fn test_refresh_sends_validators() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let scheduler = scheduler(fetcher.clone()).await;
        fetcher.push(Ok(FetchResult::NotModified));

        let due = start_time() + interval();
        assert_eq!(scheduler.maybe_refresh(due).await, RefreshOutcome::NotModified);
        assert_eq!(
            fetcher.requests()[1],
            (
                Some("\"v1\"".to_string()),
                Some("Mon, 01 Jan 2024 00:00:00 GMT".to_string())
            )
        );
        assert_eq!(
            scheduler.maybe_refresh(due + Duration::minutes(1)).await,
            RefreshOutcome::Fresh
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot_and_retries() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let scheduler = scheduler(fetcher.clone()).await;
        let before = scheduler.snapshot();

        let due = start_time() + interval();
        assert_eq!(scheduler.maybe_refresh(due).await, RefreshOutcome::Failed);
        assert!(Arc::ptr_eq(&before, &scheduler.snapshot()));

        fetcher.push_feed("not xml at all", None);
        let later = due + Duration::seconds(1);
        assert_eq!(scheduler.maybe_refresh(later).await, RefreshOutcome::Failed);
        assert!(Arc::ptr_eq(&before, &scheduler.snapshot()));

        fetcher.push_feed(UPDATED_SAMPLE, None);
        assert_eq!(
            scheduler.maybe_refresh(later + Duration::seconds(1)).await,
            RefreshOutcome::Refreshed
        );
        assert_eq!(scheduler.attempts(), 3);
    }

    #[tokio::test]
    async fn test_unrepresentable_due_time_stays_fresh() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.push_feed(RSS_SAMPLE, None);
        let ingestor = Ingestor::new(fetcher.clone(), "http://feed.test/rss");
        let scheduler = RefreshScheduler::start(ingestor, Duration::MAX, start_time())
            .await
            .unwrap();

        assert_eq!(scheduler.maybe_refresh(Utc::now()).await, RefreshOutcome::Fresh);
        assert_eq!(scheduler.attempts(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_is_single_flight() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let scheduler = Arc::new(scheduler(fetcher.clone()).await);
        let before = scheduler.snapshot();
        fetcher.push_feed(UPDATED_SAMPLE, None);
        fetcher.hold_next();

        let due = start_time() + interval();
        let background = scheduler.clone();
        let handle = tokio::spawn(async move { background.maybe_refresh(due).await });

        fetcher.entered.notified().await;
        assert_eq!(scheduler.maybe_refresh(due).await, RefreshOutcome::InFlight);
        // readers still get the complete previous snapshot
        assert!(Arc::ptr_eq(&before, &scheduler.snapshot()));

        fetcher.release.notify_one();
        assert_eq!(handle.await.unwrap(), RefreshOutcome::Refreshed);
        assert_eq!(scheduler.attempts(), 1);
        assert_eq!(fetcher.calls(), 2);
        assert!(scheduler.snapshot().page("brand-new-risk").is_some());
    }
}
