//! Batch import of source pages.
//!
//! Pages are fetched and converted strictly in order, with a fixed delay
//! between fetches.  A page which fails is logged and counted, and the batch
//! carries on with the next one.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::IngestConfig;
use crate::analyze::slugify;
use crate::{Error, Result};

/// Something which can fetch the HTML of a source page.
pub trait PageSource {
    /// Return the HTML at `url`.
    fn fetch(&mut self, url: &str) -> Result<String>;
}

impl<F> PageSource for F
where
    F: FnMut(&str) -> Result<String>,
{
    fn fetch(&mut self, url: &str) -> Result<String> {
        self(url)
    }
}

/// Metadata supplied alongside a source URL.  Anything missing is taken
/// from the page itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    /// Slug to store the article under
    #[serde(default)]
    pub slug: Option<String>,
    /// Article title
    #[serde(default)]
    pub title: Option<String>,
    /// Featured image URL
    #[serde(default)]
    pub featured_image: Option<String>,
}

/// One page to import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Where to fetch the page from
    pub url: String,
    /// Known metadata
    #[serde(default)]
    pub metadata: RecordMetadata,
}

impl ImportRecord {
    /// A record with no metadata.
    pub fn new(url: impl Into<String>) -> ImportRecord {
        ImportRecord {
            url: url.into(),
            metadata: RecordMetadata::default(),
        }
    }
}

/// The result of importing one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedArticle {
    /// Slug
    pub slug: String,
    /// Title
    pub title: String,
    /// Featured image URL, if any
    pub featured_image: Option<String>,
    /// The serialized document
    pub content: String,
    /// Number of top-level blocks in the document
    pub content_length: usize,
}

/// A page which could not be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    /// The page
    pub url: String,
    /// Why
    pub message: String,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Imported articles, in input order
    pub articles: Vec<ImportedArticle>,
    /// Pages which failed
    pub failures: Vec<ImportFailure>,
    /// URLs skipped because their slug was already imported in this batch
    pub skipped: Vec<String>,
    /// Slugs of imported articles with no content, for manual review
    pub needs_review: Vec<String>,
}

impl ImportReport {
    /// Number of imported articles.
    pub fn imported(&self) -> usize {
        self.articles.len()
    }

    /// Number of failed pages.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Number of skipped pages.
    pub fn skipped(&self) -> usize {
        self.skipped.len()
    }
}

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Pause between consecutive page fetches
    pub delay: Duration,
}

impl Default for ImportOptions {
    fn default() -> ImportOptions {
        ImportOptions {
            delay: Duration::from_secs(1),
        }
    }
}

/// Runs batch imports from a [`PageSource`].
pub struct Importer<S: PageSource> {
    source: S,
    config: IngestConfig,
    options: ImportOptions,
}

impl<S: PageSource> Importer<S> {
    /// Create an importer with default configuration.
    pub fn new(source: S) -> Importer<S> {
        Importer {
            source,
            config: IngestConfig::default(),
            options: ImportOptions::default(),
        }
    }

    /// Use this ingestion configuration.
    pub fn with_config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    /// Use these batch options.
    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// Import every record in order.  Never fails as a whole.
    pub fn run(&mut self, records: &[ImportRecord]) -> ImportReport {
        let mut report = ImportReport::default();
        let mut seen = HashSet::new();

        for (i, record) in records.iter().enumerate() {
            if i > 0 && !self.options.delay.is_zero() {
                thread::sleep(self.options.delay);
            }
            match self.import_one(record) {
                Ok(article) => {
                    if !seen.insert(article.slug.clone()) {
                        log::info!("skipping {}: slug {:?} already imported", record.url, article.slug);
                        report.skipped.push(record.url.clone());
                        continue;
                    }
                    if article.content_length == 0 {
                        log::warn!("{} ({}) has no content; flagged for review", article.slug, record.url);
                        report.needs_review.push(article.slug.clone());
                    } else {
                        log::info!("imported {} ({} blocks)", article.slug, article.content_length);
                    }
                    report.articles.push(article);
                }
                Err(e) => {
                    log::warn!("failed to import {}: {}", record.url, e);
                    report.failures.push(ImportFailure {
                        url: record.url.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "import finished: {} imported, {} failed, {} skipped, {} need review",
            report.imported(),
            report.failed(),
            report.skipped(),
            report.needs_review.len()
        );
        report
    }

    /// Fetch and convert a single record.
    pub fn import_one(&mut self, record: &ImportRecord) -> Result<ImportedArticle> {
        let html = self.source.fetch(&record.url)?;
        let page = self.config.page_from_read(html.as_bytes())?;
        let meta = &record.metadata;

        let title = meta
            .title
            .clone()
            .or(page.title)
            .unwrap_or_default();
        let slug = meta
            .slug
            .clone()
            .or_else(|| slug_from_url(&record.url))
            .unwrap_or_else(|| slugify(&title));
        if slug.is_empty() {
            return Err(Error::Fetch {
                url: record.url.clone(),
                message: "cannot derive a slug".into(),
            });
        }

        Ok(ImportedArticle {
            slug,
            title,
            featured_image: meta.featured_image.clone().or(page.featured_image),
            content_length: page.document.content.len(),
            content: page.document.to_json(),
        })
    }
}

/// The last non-empty path segment of a URL, ignoring any query or fragment.
pub fn slug_from_url(url: &str) -> Option<String> {
    let path = url.split(|c| c == '?' || c == '#').next().unwrap_or("");
    let path = path.split_once("://").map(|(_, rest)| rest).unwrap_or(path);
    // Drop the host part of absolute URLs.
    let path = if url.contains("://") {
        path.split_once('/').map(|(_, rest)| rest).unwrap_or("")
    } else {
        path
    };
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .last()
        .map(|segment| segment.trim_end_matches(".html").to_string())
        .filter(|segment| !segment.is_empty())
}
