use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Channel-level metadata of the ingested feed. Becomes the home page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedChannel {
    pub title: String,
    pub description: String,
    pub link: String,
    pub last_build_date: DateTime<Utc>,
}

impl FeedChannel {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.link
        } else {
            &self.title
        }
    }
}
