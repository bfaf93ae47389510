use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::normalize::{identity_key, is_zero_width, sanitize};

static ASSETS: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets");

/// Separates a word from its example sentence in the line-based list format.
pub const SENTENCE_SEPARATOR: char = '|';

/// One word to practise, with an optional example sentence for context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence: Option<String>,
}

impl Entry {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            sentence: None,
        }
    }

    pub fn with_sentence(word: impl Into<String>, sentence: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            sentence: Some(sentence.into()),
        }
    }

    /// Identity key: case-folded, trimmed, zero-width stripped word.
    pub fn key(&self) -> String {
        identity_key(&self.word)
    }

    /// Cleans word and sentence; `None` when nothing usable remains of the word.
    fn sanitized(self) -> Option<Self> {
        let word = sanitize(&self.word);
        if word.is_empty() {
            return None;
        }
        let sentence = self
            .sentence
            .map(|s| {
                s.chars()
                    .filter(|c| !is_zero_width(*c))
                    .collect::<String>()
                    .trim()
                    .to_string()
            })
            .filter(|s| !s.is_empty());
        Some(Self { word, sentence })
    }

    /// Parses `word` or `word | sentence`.
    pub fn parse_line(line: &str) -> Self {
        match line.split_once(SENTENCE_SEPARATOR) {
            Some((word, sentence)) => Self::with_sentence(word, sentence),
            None => Self::new(line),
        }
    }

    pub fn to_line(&self) -> String {
        match &self.sentence {
            Some(sentence) => format!("{} {SENTENCE_SEPARATOR} {}", self.word, sentence),
            None => self.word.clone(),
        }
    }
}

/// Either shape found in a persisted word list: bare strings from older
/// files, or full entries.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredEntry {
    Plain(String),
    Full(Entry),
}

impl From<StoredEntry> for Entry {
    fn from(stored: StoredEntry) -> Self {
        match stored {
            StoredEntry::Plain(word) => Entry::new(word),
            StoredEntry::Full(entry) => entry,
        }
    }
}

/// Ordered set of unique entries making up a practice session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<StoredEntry>", into = "Vec<Entry>")]
pub struct WordPool {
    entries: Vec<Entry>,
}

impl WordPool {
    /// Sanitizes and de-duplicates by identity key; the first occurrence wins.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Entry>,
    {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter_map(Entry::sanitized)
            .filter(|entry| seen.insert(entry.key()))
            .collect();
        Self { entries }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_entries(words.into_iter().map(Entry::new))
    }

    /// One entry per non-blank line, `word` or `word | sentence`.
    pub fn parse_lines(text: &str) -> Self {
        Self::from_entries(
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(Entry::parse_line),
        )
    }

    pub fn to_lines(&self) -> String {
        self.entries.iter().map(Entry::to_line).join("\n")
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, idx: usize) -> Option<&Entry> {
        self.entries.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_sentences(&self) -> bool {
        self.entries.iter().any(|e| e.sentence.is_some())
    }
}

impl From<Vec<StoredEntry>> for WordPool {
    fn from(stored: Vec<StoredEntry>) -> Self {
        Self::from_entries(stored.into_iter().map(Entry::from))
    }
}

impl From<WordPool> for Vec<Entry> {
    fn from(pool: WordPool) -> Self {
        pool.entries
    }
}

impl<'a> IntoIterator for &'a WordPool {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// The sample list a fresh install starts with.
pub fn default_pool() -> WordPool {
    let file = ASSETS
        .get_file("default_words.json")
        .expect("default word list is embedded");
    let text = file
        .contents_utf8()
        .expect("default word list is valid utf-8");
    serde_json::from_str(text).expect("default word list is valid json")
}
