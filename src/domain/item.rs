use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the feed, consumed once into a [`Page`](super::Page).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: Option<String>,
    /// Raw HTML description, not entity-decoded.
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub author: Option<String>,
    pub link: Option<String>,
}

impl FeedItem {
    pub fn author_or_unknown(&self) -> &str {
        self.author.as_deref().unwrap_or("unknown")
    }
}
