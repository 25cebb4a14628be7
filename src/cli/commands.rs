use std::sync::Arc;

use crate::app::{AppContext, Result};
use crate::render::render;
use crate::server::{self, AppState};
use crate::store::WikiSnapshot;

pub async fn serve(ctx: &AppContext, bind: &str) -> anyhow::Result<()> {
    let scheduler = ctx.start_scheduler().await?;

    let state = AppState {
        scheduler: Arc::new(scheduler),
        feed_url: Arc::from(ctx.config.feed_url.as_str()),
    };
    server::serve(bind, state).await
}

pub async fn dump(ctx: &AppContext, page: Option<&str>, index: bool) -> Result<()> {
    let ingested = ctx.ingestor().ingest().await?;
    let snapshot = WikiSnapshot::build(&ingested.channel, &ingested.items, ingested.fetched_at);

    println!("{}", dump_json(&snapshot, page, index)?);
    Ok(())
}

/// JSON printed by `dump`: one rendered page, the index export, or the
/// sitemap.
pub fn dump_json(snapshot: &WikiSnapshot, page: Option<&str>, index: bool) -> Result<String> {
    let json = match page {
        Some(slug) => serde_json::to_string_pretty(&render(slug, snapshot)?)?,
        None if index => serde_json::to_string_pretty(&snapshot.search_index().export())?,
        None => serde_json::to_string_pretty(snapshot.sitemap())?,
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::WikiError;
    use crate::domain::FeedChannel;
    use crate::store::WELCOME_SLUG;

    fn snapshot() -> WikiSnapshot {
        let channel = FeedChannel {
            title: "The RISKS Digest".into(),
            description: "Forum On Risks".into(),
            link: "http://catless.ncl.ac.uk/Risks/".into(),
            last_build_date: chrono::Utc::now(),
        };
        WikiSnapshot::build(&channel, &[], channel.last_build_date)
    }

    #[test]
    fn test_dump_sitemap_by_default() {
        let json: serde_json::Value =
            serde_json::from_str(&dump_json(&snapshot(), None, false).unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_dump_page() {
        let json: serde_json::Value =
            serde_json::from_str(&dump_json(&snapshot(), Some(WELCOME_SLUG), false).unwrap())
                .unwrap();
        assert_eq!(json["title"], "Welcome Visitors");
    }

    #[test]
    fn test_dump_index() {
        let json: serde_json::Value =
            serde_json::from_str(&dump_json(&snapshot(), None, true).unwrap()).unwrap();
        assert_eq!(json["documentCount"], 2);
    }

    #[test]
    fn test_dump_unknown_page() {
        assert!(matches!(
            dump_json(&snapshot(), Some("missing"), false),
            Err(WikiError::NotFound(_))
        ));
    }
}
