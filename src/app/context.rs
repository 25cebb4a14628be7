use std::sync::Arc;

use chrono::Utc;

use crate::app::Result;
use crate::config::Config;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::ingest::Ingestor;
use crate::refresh::RefreshScheduler;

pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(
            config.fetch_timeout(),
            &config.user_agent,
        )?);

        Ok(Self::with_fetcher(config, fetcher))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self { config, fetcher }
    }

    pub fn ingestor(&self) -> Ingestor {
        Ingestor::new(self.fetcher.clone(), self.config.feed_url.clone())
    }

    /// Cold-start ingestion. Fails when the feed cannot be fetched or parsed.
    pub async fn start_scheduler(&self) -> Result<RefreshScheduler> {
        RefreshScheduler::start(self.ingestor(), self.config.refresh_interval(), Utc::now()).await
    }
}
