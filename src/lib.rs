//! Convert HTML to a rich-text document tree, and back.
//!
//! This crate ingests article HTML into a small, JSON-serializable
//! [`Document`](schema::Document) (headings, paragraphs, lists and images,
//! with bold/italic/link marks), analyses documents (word count, reading
//! time, table of contents), renders them back to HTML, and provides the
//! attribute commands an editor toolbar needs.
//!
//! # Examples
//!
//! ```rust
//! # use html2doc::{from_fragment, render_to_html};
//! let doc = from_fragment(
//!     "<h1>Title</h1><p>Hello <strong>world</strong></p><ul><li>One</li></ul>",
//! );
//! assert_eq!(doc.content.len(), 3);
//! assert_eq!(
//!     render_to_html(&doc),
//!     "<h2 id=\"title\">Title</h2><p>Hello <strong>world</strong></p><ul><li>One</li></ul>"
//! );
//! ```
//!
//! A couple of simple demonstration programs are included under `demos/`:
//!
//! ### html2doc
//!
//! Converts HTML on stdin (or a file) into a JSON document, or renders a
//! stored JSON document back to HTML:
//!
//! ```sh
//! $ cargo run --example html2doc < page.html > doc.json
//! $ cargo run --example html2doc -- --render doc.json
//! ```
//!
//! ### import
//!
//! Runs a batch import over a JSON list of `{url, metadata}` records, reading
//! each page from the local filesystem.
//!

#![deny(missing_docs)]

#[macro_use]
extern crate html5ever;

#[macro_use]
mod macros;

pub mod analyze;
pub mod commands;
pub mod ingest;
pub mod render;
pub mod schema;

use schema::{Document, SchemaError};
use std::io;

/// Errors from this crate.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The stored payload was not valid JSON.
    #[error("malformed document JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A node failed strict validation.
    #[error("invalid document: {0}")]
    Schema(#[from] SchemaError),
    /// An error reading input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A source page could not be fetched or read during ingestion.
    #[error("failed to fetch {url}: {message}")]
    Fetch {
        /// The page which failed
        url: String,
        /// What went wrong
        message: String,
    },
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

pub mod config {
    //! Configure ingestion and rendering using the `IngestConfig` and
    //! `RenderConfig` types, constructed using the functions in this module.

    pub use crate::ingest::{IngestConfig, MarkMode, RootSelector};
    pub use crate::render::html_renderer::RenderConfig;

    /// Return the default ingestion configuration.
    pub fn ingest() -> IngestConfig {
        IngestConfig::default()
    }

    /// Return the default rendering configuration.
    pub fn render() -> RenderConfig {
        RenderConfig::default()
    }
}

/// Reads a whole HTML page from `input`, and extracts its main content
/// region as a document.
pub fn from_read<R>(input: R) -> Result<Document>
where
    R: io::Read,
{
    config::ingest().document_from_read(input)
}

/// Extracts a document from an HTML fragment holding the markup of a
/// page's content region.  Never fails; unusable input gives an empty
/// document.
pub fn from_fragment(html: &str) -> Document {
    config::ingest().document_from_fragment(html)
}

/// Renders a document to HTML with the default configuration.
pub fn render_to_html(doc: &Document) -> String {
    config::render().render(doc)
}

/// Renders stored document JSON to HTML, optionally wrapped in a `<div>`
/// with the given class.  Malformed JSON renders as an empty string and
/// invalid nodes are skipped.
pub fn render_json(json: &str, class: Option<&str>) -> String {
    config::render().render_json(json, class)
}

#[cfg(test)]
mod tests;
