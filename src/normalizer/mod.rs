//! Cleans Risks Digest item HTML into wiki story fragments.
//!
//! The upstream markup is a narrow, stable dialect, so every step is a plain
//! text transform. A step that finds nothing to rewrite leaves the text
//! untouched; normalization never fails.

pub mod slug;

pub use slug::slugify;

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{FeedItem, StoryFragment};

const PRE_OPEN: &str = "<pre>";
const PRE_CLOSE: &str = "</pre>";

const DECORATIVE_ICONS: [&str; 2] = [
    r#"<i class="shield fad fa-shield"></i>"#,
    r#"<i class="flashlight fad fa-flashlight"></i>"#,
];

// Greedy on purpose: a line holding two anchors collapses into one link
// spanning from the first href to the last </a>. Tag brackets may arrive
// entity-escaped when the description was double-encoded.
static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:&lt;)?(?:<|&lt;)a href="(.*)"(?:>|&gt;)(.*)(?:<|&lt;)/a(?:>|&gt;)(?:&gt;)?"#)
        .expect("anchor pattern is valid")
});

/// Runs every cleaning step over a raw item description.
pub fn normalize(raw_html: &str) -> Vec<StoryFragment> {
    let text = strip_pre(raw_html);
    let text = remove_icons(text);
    let text = rewrite_links(&text);

    split_paragraphs(&text)
        .into_iter()
        .map(classify)
        .collect()
}

/// Story of a feed item: the normalized description followed by the
/// attribution fragment.
pub fn item_story(item: &FeedItem) -> Vec<StoryFragment> {
    let mut story = normalize(&item.description);
    story.push(source_attribution(
        item.author_or_unknown(),
        item.link.as_deref().unwrap_or(""),
    ));
    story
}

pub fn source_attribution(author: &str, permalink: &str) -> StoryFragment {
    StoryFragment::Markdown(format!(
        "Source: {} via [{} The Risks Digest]",
        author, permalink
    ))
}

pub fn strip_pre(text: &str) -> &str {
    match text.strip_prefix(PRE_OPEN) {
        Some(inner) => inner.strip_suffix(PRE_CLOSE).unwrap_or(inner),
        None => text,
    }
}

pub fn remove_icons(text: &str) -> String {
    DECORATIVE_ICONS
        .iter()
        .fold(text.to_string(), |acc, icon| acc.replace(icon, ""))
}

/// Rewrites `<a href="URL">TEXT</a>`, optionally wrapped in escaped angle
/// brackets, into `[URL TEXT]`.
pub fn rewrite_links(text: &str) -> String {
    ANCHOR.replace_all(text, "[$1 $2]").into_owned()
}

/// Splits on blank lines and joins the remaining line breaks of each block
/// with spaces. Blank blocks are dropped.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        // Unlike a plain split, blank blocks (trailing or repeated blank
        // lines) are skipped so they never become empty paragraphs.
        .filter(|block| !block.trim().is_empty())
        .map(|block| block.replace('\n', " "))
        .collect()
}

/// Blocks carrying an ampersand (wiki links, HTML entities) need the
/// markdown plugin to render.
pub fn classify(block: String) -> StoryFragment {
    if block.contains('&') {
        StoryFragment::Markdown(block)
    } else {
        StoryFragment::Plain(block)
    }
}
