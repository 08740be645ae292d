//! Rendering documents to HTML.
//!
//! The output is deterministic: the same document always renders to the
//! same bytes.  Text and attribute values are escaped; that escaping is the
//! only sanitization applied.

use std::collections::HashMap;

use super::{render_document, Renderer, WalkOptions};
use crate::schema::{Alignment, Document, HeadingLevel, ImageAttrs, Mark, MarkKind, Size};

/// Configure HTML rendering.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    walk: WalkOptions,
    image_base_classes: String,
    alignment_classes: HashMap<Alignment, String>,
    size_classes: HashMap<Size, String>,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        let alignment_classes = [
            (Alignment::Left, "float-left mr-6"),
            (Alignment::Center, "mx-auto"),
            (Alignment::Right, "float-right ml-6"),
            (Alignment::Full, "w-full"),
        ];
        let size_classes = [
            (Size::Small, "max-w-xs"),
            (Size::Medium, "max-w-md"),
            (Size::Large, "max-w-2xl"),
            (Size::Full, "max-w-full"),
        ];
        RenderConfig {
            walk: WalkOptions::default(),
            image_base_classes: "rounded-lg my-4".into(),
            alignment_classes: alignment_classes
                .iter()
                .map(|&(a, c)| (a, c.to_string()))
                .collect(),
            size_classes: size_classes
                .iter()
                .map(|&(s, c)| (s, c.to_string()))
                .collect(),
        }
    }
}

impl RenderConfig {
    /// Set the nesting order of marks, outermost first.
    pub fn mark_order(mut self, order: Vec<MarkKind>) -> Self {
        self.walk.mark_order = order;
        self
    }

    /// Whether headings get `id` attributes matching
    /// [`extract_headings`](crate::analyze::extract_headings).
    pub fn heading_ids(mut self, on: bool) -> Self {
        self.walk.heading_ids = on;
        self
    }

    /// Classes every image carries.
    pub fn image_base_classes(mut self, classes: impl Into<String>) -> Self {
        self.image_base_classes = classes.into();
        self
    }

    /// Classes for images with this alignment.
    pub fn alignment_class(mut self, alignment: Alignment, classes: impl Into<String>) -> Self {
        self.alignment_classes.insert(alignment, classes.into());
        self
    }

    /// Classes for images of this size.
    pub fn size_class(mut self, size: Size, classes: impl Into<String>) -> Self {
        self.size_classes.insert(size, classes.into());
        self
    }

    /// The `class` attribute for an image.
    pub fn image_class(&self, attrs: &ImageAttrs) -> String {
        let parts = [
            self.image_base_classes.as_str(),
            self.alignment_classes
                .get(&attrs.alignment)
                .map(String::as_str)
                .unwrap_or(""),
            self.size_classes
                .get(&attrs.size)
                .map(String::as_str)
                .unwrap_or(""),
        ];
        parts
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render a document to HTML.
    pub fn render(&self, doc: &Document) -> String {
        let mut renderer = HtmlRenderer::new(self);
        render_document(&mut renderer, doc, &self.walk);
        renderer.into_string()
    }

    /// Render a document wrapped in a `<div>` with the given class.
    pub fn render_with_class(&self, doc: &Document, class: &str) -> String {
        let mut out = String::from("<div class=\"");
        escape_into(&mut out, class, true);
        out.push_str("\">");
        out.push_str(&self.render(doc));
        out.push_str("</div>");
        out
    }

    /// Render stored JSON.  Malformed JSON gives an empty string; invalid
    /// nodes are skipped.
    pub fn render_json(&self, json: &str, class: Option<&str>) -> String {
        match Document::from_json_lenient(json) {
            Ok(doc) => match class {
                Some(class) => self.render_with_class(&doc, class),
                None => self.render(&doc),
            },
            Err(e) => {
                log::debug!("not rendering malformed document: {}", e);
                String::new()
            }
        }
    }
}

/// A [`Renderer`] producing HTML markup.
pub struct HtmlRenderer<'c> {
    config: &'c RenderConfig,
    out: String,
}

impl<'c> HtmlRenderer<'c> {
    /// Create an empty renderer.
    pub fn new(config: &'c RenderConfig) -> HtmlRenderer<'c> {
        HtmlRenderer {
            config,
            out: String::new(),
        }
    }

    /// Return the markup produced so far.
    pub fn into_string(self) -> String {
        self.out
    }

    fn push_attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        escape_into(&mut self.out, value, true);
        self.out.push('"');
    }
}

impl Renderer for HtmlRenderer<'_> {
    fn start_heading(&mut self, level: HeadingLevel, id: Option<&str>) {
        self.out.push_str(&format!("<h{}", level.as_u8()));
        if let Some(id) = id {
            self.push_attr("id", id);
        }
        self.out.push('>');
    }

    fn end_heading(&mut self, level: HeadingLevel) {
        self.out.push_str(&format!("</h{}>", level.as_u8()));
    }

    fn start_paragraph(&mut self) {
        self.out.push_str("<p>");
    }

    fn end_paragraph(&mut self) {
        self.out.push_str("</p>");
    }

    fn start_list(&mut self, ordered: bool) {
        self.out.push_str(if ordered { "<ol>" } else { "<ul>" });
    }

    fn end_list(&mut self, ordered: bool) {
        self.out.push_str(if ordered { "</ol>" } else { "</ul>" });
    }

    fn start_list_item(&mut self) {
        self.out.push_str("<li>");
    }

    fn end_list_item(&mut self) {
        self.out.push_str("</li>");
    }

    fn add_image(&mut self, attrs: &ImageAttrs) {
        let class = self.config.image_class(attrs);
        self.out.push_str("<img");
        self.push_attr("src", &attrs.src);
        self.push_attr("alt", &attrs.alt);
        self.push_attr("class", &class);
        self.push_attr("data-alignment", attrs.alignment.as_str());
        self.push_attr("data-size", attrs.size.as_str());
        self.out.push('>');
    }

    fn start_mark(&mut self, mark: &Mark) {
        match mark {
            Mark::Bold => self.out.push_str("<strong>"),
            Mark::Italic => self.out.push_str("<em>"),
            Mark::Link { attrs } => {
                self.out.push_str("<a");
                self.push_attr("href", &attrs.href);
                self.push_attr("target", "_blank");
                self.push_attr("rel", "noopener noreferrer");
                self.out.push('>');
            }
        }
    }

    fn end_mark(&mut self, mark: &Mark) {
        self.out.push_str(match mark {
            Mark::Bold => "</strong>",
            Mark::Italic => "</em>",
            Mark::Link { .. } => "</a>",
        });
    }

    fn add_text(&mut self, text: &str) {
        escape_into(&mut self.out, text, false);
    }
}

/// Append `s` to `out`, escaping markup characters (and quotes, if
/// `in_attr`).
fn escape_into(out: &mut String, s: &str, in_attr: bool) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attr => out.push_str("&quot;"),
            '\'' if in_attr => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Escape text for use in HTML content.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s, false);
    out
}
