//! Full-text index over page titles and content.
//!
//! Exported with the MiniSearch JSON layout so the wiki client can load it
//! directly with `MiniSearch.loadJSON`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

const FIELDS: [&str; 2] = ["title", "content"];
const TITLE: usize = 0;
const CONTENT: usize = 1;
const SERIALIZATION_VERSION: u32 = 2;

static SPACE_OR_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\n\r\p{Z}\p{P}]+").expect("tokenizer pattern is valid"));

/// term -> field id -> short document id -> term frequency
pub type PostingList = BTreeMap<usize, BTreeMap<usize, usize>>;

#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    document_ids: Vec<String>,
    field_lengths: Vec<[usize; 2]>,
    index: BTreeMap<String, PostingList>,
}

pub fn tokenize(text: &str) -> Vec<String> {
    SPACE_OR_PUNCTUATION
        .split(text)
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: &str, title: &str, content: &str) {
        let short_id = self.document_ids.len();
        self.document_ids.push(id.to_string());

        let mut lengths = [0; 2];
        for (field, text) in [(TITLE, title), (CONTENT, content)] {
            let tokens = tokenize(text);
            lengths[field] = tokens.len();
            for term in tokens {
                *self
                    .index
                    .entry(term)
                    .or_default()
                    .entry(field)
                    .or_default()
                    .entry(short_id)
                    .or_default() += 1;
            }
        }
        self.field_lengths.push(lengths);
    }

    pub fn len(&self) -> usize {
        self.document_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document_ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.document_ids.iter().any(|doc| doc == id)
    }

    /// Ids of documents containing `term` in any field, in insertion order.
    pub fn lookup(&self, term: &str) -> Vec<&str> {
        let Some(postings) = self.index.get(&term.to_lowercase()) else {
            return Vec::new();
        };
        let mut short_ids: Vec<usize> = postings
            .values()
            .flat_map(|docs| docs.keys().copied())
            .collect();
        short_ids.sort_unstable();
        short_ids.dedup();
        short_ids
            .into_iter()
            .map(|short_id| self.document_ids[short_id].as_str())
            .collect()
    }

    pub fn export(&self) -> ExportedIndex<'_> {
        let count = self.document_ids.len();
        let average_field_length = if count == 0 {
            [0.0; 2]
        } else {
            let mut totals = [0usize; 2];
            for lengths in &self.field_lengths {
                totals[TITLE] += lengths[TITLE];
                totals[CONTENT] += lengths[CONTENT];
            }
            [
                totals[TITLE] as f64 / count as f64,
                totals[CONTENT] as f64 / count as f64,
            ]
        };

        ExportedIndex {
            document_count: count,
            next_id: count,
            document_ids: self
                .document_ids
                .iter()
                .enumerate()
                .map(|(short_id, id)| (short_id, id.as_str()))
                .collect(),
            field_ids: FIELDS
                .iter()
                .enumerate()
                .map(|(field_id, name)| (*name, field_id))
                .collect(),
            field_length: self.field_lengths.iter().copied().enumerate().collect(),
            average_field_length,
            stored_fields: BTreeMap::new(),
            dirt_count: 0,
            index: self
                .index
                .iter()
                .map(|(term, postings)| (term.as_str(), postings))
                .collect(),
            serialization_version: SERIALIZATION_VERSION,
        }
    }
}

/// Serialized form of [`SearchIndex`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedIndex<'a> {
    pub document_count: usize,
    pub next_id: usize,
    pub document_ids: BTreeMap<usize, &'a str>,
    pub field_ids: BTreeMap<&'static str, usize>,
    pub field_length: BTreeMap<usize, [usize; 2]>,
    pub average_field_length: [f64; 2],
    pub stored_fields: BTreeMap<usize, serde_json::Value>,
    pub dirt_count: usize,
    pub index: Vec<(&'a str, &'a PostingList)>,
    pub serialization_version: u32,
}
