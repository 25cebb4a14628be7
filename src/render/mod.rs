//! Projects a stored page into the federated wiki page document.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::app::{Result, WikiError};
use crate::domain::{Page, StoryFragment};
use crate::store::WikiSnapshot;

const ITEM_ID_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryItem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedItem {
    pub title: String,
    pub story: Vec<StoryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Create {
        #[serde(with = "chrono::serde::ts_milliseconds")]
        date: DateTime<Utc>,
        item: CreatedItem,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDocument {
    pub title: String,
    pub story: Vec<StoryItem>,
    pub journal: Vec<Action>,
}

/// Item id for the `count`-th item (1-based) of the page `slug`.
pub fn item_id(slug: &str, count: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(count.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(slug.as_bytes());
    let mut id = hex::encode(hasher.finalize());
    id.truncate(ITEM_ID_LEN);
    id
}

pub fn render(slug: &str, snapshot: &WikiSnapshot) -> Result<PageDocument> {
    let page = snapshot
        .page(slug)
        .ok_or_else(|| WikiError::NotFound(slug.to_string()))?;
    Ok(render_page(page))
}

pub fn render_page(page: &Page) -> PageDocument {
    let story: Vec<StoryItem> = page
        .story
        .iter()
        .enumerate()
        .map(|(index, fragment)| {
            let kind = match fragment {
                StoryFragment::Plain(_) => "paragraph",
                StoryFragment::Markdown(_) => "markdown",
            };
            StoryItem {
                kind,
                id: item_id(&page.slug, index + 1),
                text: fragment.text().to_string(),
            }
        })
        .collect();

    let journal = vec![Action::Create {
        date: page.created.date,
        item: CreatedItem {
            title: page.title.clone(),
            story: story.clone(),
        },
    }];

    PageDocument {
        title: page.title.clone(),
        story,
        journal,
    }
}
