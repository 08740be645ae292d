//! Document statistics: word count, reading time and table of contents.

use serde::Serialize;

use crate::schema::{Block, Document, HeadingLevel};

/// Assumed reading speed, in words per minute.
pub const WORDS_PER_MINUTE: usize = 200;

/// Letters kept by [`slugify`] besides ASCII letters and digits.
const SLUG_EXTRA_CHARS: &str = "čďěňřšťůýžáéíóú";

/// One table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Anchor id, from [`slugify`]
    pub id: String,
    /// Heading text
    pub text: String,
    /// Heading level
    pub level: HeadingLevel,
}

/// Count whitespace-separated words over every text run in the document.
pub fn count_words(doc: &Document) -> usize {
    doc.content
        .iter()
        .flat_map(Block::texts)
        .map(|t| t.text.split_whitespace().count())
        .sum()
}

/// Estimated reading time in whole minutes; never less than one.
pub fn estimate_reading_time(doc: &Document) -> usize {
    reading_time_for(count_words(doc))
}

fn reading_time_for(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

/// The document's headings, in order, with anchor ids.
pub fn extract_headings(doc: &Document) -> Vec<TocEntry> {
    doc.content
        .iter()
        .filter_map(|block| match block {
            Block::Heading(h) => {
                let text: String = h.content.iter().map(|t| t.text.as_str()).collect();
                Some(TocEntry {
                    id: slugify(&text),
                    text,
                    level: h.level(),
                })
            }
            _ => None,
        })
        .collect()
}

/// Make an anchor id from heading text: lowercase it, drop everything but
/// ASCII letters, digits, spaces and Czech accented letters, then replace
/// each run of spaces with a single hyphen.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.to_lowercase().chars() {
        if c == ' ' {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() || SLUG_EXTRA_CHARS.contains(c) {
            slug.push(c);
            in_space = false;
        }
        // Anything else is dropped without ending a run of spaces.
    }
    slug
}

/// [`count_words`] on stored JSON; malformed input counts as no words.
pub fn count_words_json(json: &str) -> usize {
    match Document::from_json_lenient(json) {
        Ok(doc) => count_words(&doc),
        Err(e) => {
            log::debug!("count_words_json: {}", e);
            0
        }
    }
}

/// [`estimate_reading_time`] on stored JSON; malformed input takes no time
/// at all.
pub fn estimate_reading_time_json(json: &str) -> usize {
    match Document::from_json_lenient(json) {
        Ok(doc) => estimate_reading_time(&doc),
        Err(e) => {
            log::debug!("estimate_reading_time_json: {}", e);
            0
        }
    }
}

/// [`extract_headings`] on stored JSON; malformed input has no headings.
pub fn extract_headings_json(json: &str) -> Vec<TocEntry> {
    match Document::from_json_lenient(json) {
        Ok(doc) => extract_headings(&doc),
        Err(e) => {
            log::debug!("extract_headings_json: {}", e);
            Vec::new()
        }
    }
}
