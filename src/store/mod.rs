//! In-memory wiki built from one ingestion pass.
//!
//! A [`WikiSnapshot`] is assembled wholesale and never mutated afterwards.
//! [`SnapshotCell`] holds the snapshot currently being served and swaps it
//! as a whole on refresh.

pub mod search;

pub use search::{ExportedIndex, SearchIndex};

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::domain::{Created, FeedChannel, FeedItem, Page, SitemapEntry, StoryFragment};
use crate::normalizer::{item_story, slugify};

pub const WELCOME_TITLE: &str = "Welcome Visitors";
pub const WELCOME_SLUG: &str = "welcome-visitors";

#[derive(Debug, Clone)]
pub struct WikiSnapshot {
    sitemap: Vec<SitemapEntry>,
    pages: HashMap<String, Page>,
    search_index: SearchIndex,
    last_update: DateTime<Utc>,
    last_build_date: DateTime<Utc>,
}

impl WikiSnapshot {
    /// Builds the home page, the welcome page and one page per titled item.
    /// Items whose slug is already taken are dropped.
    pub fn build(channel: &FeedChannel, items: &[FeedItem], fetched_at: DateTime<Utc>) -> Self {
        let mut builder = SnapshotBuilder::default();

        builder.add_page(channel_page(channel));
        builder.add_page(welcome_page(channel));

        let mut skipped = 0;
        for item in items {
            let Some(title) = item.title.as_deref() else {
                tracing::warn!("Skipping untitled item {:?}", item.link);
                skipped += 1;
                continue;
            };

            let page = Page {
                slug: slugify(title),
                title: title.to_string(),
                story: item_story(item),
                created: Created {
                    date: item.published_at,
                    source: item.author.clone(),
                    link: item.link.clone(),
                },
            };

            if !builder.add_page(page) {
                skipped += 1;
            }
        }

        tracing::info!(
            "Built wiki from {}: {} pages, {} items skipped",
            channel.display_title(),
            builder.sitemap.len(),
            skipped
        );

        Self {
            sitemap: builder.sitemap,
            pages: builder.pages,
            search_index: builder.search_index,
            last_update: fetched_at,
            last_build_date: channel.last_build_date,
        }
    }

    pub fn sitemap(&self) -> &[SitemapEntry] {
        &self.sitemap
    }

    pub fn page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Slugs in sitemap order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.sitemap.iter().map(|entry| entry.slug.as_str())
    }

    pub fn search_index(&self) -> &SearchIndex {
        &self.search_index
    }

    /// Last-Modified of the feed response this snapshot was built from.
    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    /// The channel's own `lastBuildDate`.
    pub fn last_build_date(&self) -> DateTime<Utc> {
        self.last_build_date
    }

    /// Sitemap, page table and search index agree on membership.
    pub fn is_consistent(&self) -> bool {
        self.sitemap.len() == self.pages.len()
            && self.search_index.len() == self.pages.len()
            && self.sitemap.iter().all(|entry| self.pages.contains_key(&entry.slug))
            && self.pages.keys().all(|slug| self.search_index.contains(slug))
    }
}

#[derive(Default)]
struct SnapshotBuilder {
    sitemap: Vec<SitemapEntry>,
    pages: HashMap<String, Page>,
    search_index: SearchIndex,
}

impl SnapshotBuilder {
    /// Returns false when the slug is already taken; the first page wins.
    fn add_page(&mut self, page: Page) -> bool {
        if self.pages.contains_key(&page.slug) {
            tracing::debug!("Dropping duplicate page {:?} ({})", page.title, page.slug);
            return false;
        }

        self.sitemap.push(SitemapEntry::from(&page));
        self.search_index
            .add(&page.slug, &page.title, &page.content());
        self.pages.insert(page.slug.clone(), page);
        true
    }
}

fn channel_page(channel: &FeedChannel) -> Page {
    let title = channel.display_title().to_string();
    Page {
        slug: slugify(&title),
        title,
        story: vec![
            StoryFragment::Plain(channel.description.clone()),
            StoryFragment::Plain(format!(
                "Content created from The Risks Digest [{} {}]",
                channel.link, channel.link
            )),
        ],
        created: Created::at(channel.last_build_date),
    }
}

fn welcome_page(channel: &FeedChannel) -> Page {
    Page {
        slug: WELCOME_SLUG.to_string(),
        title: WELCOME_TITLE.to_string(),
        story: vec![
            StoryFragment::Plain(
                "Welcome to this read-only Federated Wiki site. Its pages are generated from \
                 The Risks Digest feed and are rebuilt when the feed changes."
                    .to_string(),
            ),
            StoryFragment::Plain(format!(
                "Start with [[{}]] for a description of the digest, or browse the recent \
                 items listed in the sitemap.",
                channel.display_title()
            )),
            StoryFragment::Plain(
                "Any page can be forked into your own wiki, where it can be annotated and linked."
                    .to_string(),
            ),
        ],
        created: Created::at(channel.last_build_date),
    }
}

/// Holds the snapshot being served. Readers clone the `Arc` and keep a
/// complete snapshot for as long as they need it; a swap replaces the
/// pointer as a whole.
#[derive(Debug)]
pub struct SnapshotCell {
    current: RwLock<Arc<WikiSnapshot>>,
}

impl SnapshotCell {
    pub fn new(snapshot: WikiSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn load(&self) -> Arc<WikiSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs `snapshot` and returns the one it replaced.
    pub fn replace(&self, snapshot: WikiSnapshot) -> Arc<WikiSnapshot> {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, Arc::new(snapshot))
    }
}
