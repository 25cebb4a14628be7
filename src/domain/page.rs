use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One paragraph-level unit of page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "lowercase")]
pub enum StoryFragment {
    Plain(String),
    Markdown(String),
}

impl StoryFragment {
    pub fn text(&self) -> &str {
        match self {
            StoryFragment::Plain(text) | StoryFragment::Markdown(text) => text,
        }
    }
}

/// Provenance of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Created {
    pub fn at(date: DateTime<Utc>) -> Self {
        Self {
            date,
            source: None,
            link: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub slug: String,
    pub title: String,
    pub story: Vec<StoryFragment>,
    pub created: Created,
}

impl Page {
    /// Text used as the sitemap synopsis.
    pub fn synopsis(&self) -> &str {
        self.story.first().map(StoryFragment::text).unwrap_or("")
    }

    /// Story texts joined with single spaces, as fed to the search index.
    pub fn content(&self) -> String {
        self.story
            .iter()
            .map(StoryFragment::text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Entry of `/system/sitemap.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub slug: String,
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub synopsis: String,
}

impl From<&Page> for SitemapEntry {
    fn from(page: &Page) -> Self {
        Self {
            slug: page.slug.clone(),
            title: page.title.clone(),
            date: page.created.date,
            synopsis: page.synopsis().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn page() -> Page {
        Page {
            slug: "risks-digest-3410".into(),
            title: "Risks Digest 34.10".into(),
            story: vec![
                StoryFragment::Plain("First.".into()),
                StoryFragment::Markdown("Second &amp; last.".into()),
            ],
            created: Created::at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_synopsis_is_first_fragment() {
        assert_eq!(page().synopsis(), "First.");
    }

    #[test]
    fn test_synopsis_empty_story() {
        let mut page = page();
        page.story.clear();
        assert_eq!(page.synopsis(), "");
    }

    #[test]
    fn test_content_joins_with_spaces() {
        assert_eq!(page().content(), "First. Second &amp; last.");
    }

    #[test]
    fn test_sitemap_entry_serializes_date_as_millis() {
        let entry = SitemapEntry::from(&page());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], serde_json::json!(1_704_067_200_000i64));
        assert_eq!(json["slug"], "risks-digest-3410");
        assert_eq!(json["synopsis"], "First.");
    }

    #[test]
    fn test_created_omits_missing_fields() {
        let json = serde_json::to_value(Created::at(page().created.date)).unwrap();
        assert!(json.get("source").is_none());
        assert!(json.get("link").is_none());
    }
}
