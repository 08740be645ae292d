//! Module containing the `Renderer` interface for producing output from a
//! document, and the walk which drives it.

pub mod html_renderer;

use crate::analyze::slugify;
use crate::schema::{Block, Document, HeadingLevel, ImageAttrs, List, Mark, MarkKind, Text};

/// A type which is a backend for document rendering.
pub trait Renderer {
    /// Start a heading.  `id` is the anchor to attach, if any.
    fn start_heading(&mut self, level: HeadingLevel, id: Option<&str>);

    /// Finish a heading started with `start_heading`.
    fn end_heading(&mut self, level: HeadingLevel);

    /// Start a paragraph.
    fn start_paragraph(&mut self);

    /// Finish a paragraph.
    fn end_paragraph(&mut self);

    /// Start a list.
    fn start_list(&mut self, ordered: bool);

    /// Finish a list.
    fn end_list(&mut self, ordered: bool);

    /// Start a list item.
    fn start_list_item(&mut self);

    /// Finish a list item.
    fn end_list_item(&mut self);

    /// Add an image.
    fn add_image(&mut self, attrs: &ImageAttrs);

    /// Start a marked region.  Marks are always closed in the reverse
    /// order they were opened.
    fn start_mark(&mut self, mark: &Mark);

    /// Finish a marked region.
    fn end_mark(&mut self, mark: &Mark);

    /// Add some raw (unescaped) text.
    fn add_text(&mut self, text: &str);
}

/// Options for the document walk which don't depend on the backend.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Marks are opened in this order (first is outermost).  Kinds not
    /// listed are opened innermost, in their stored order.
    pub mark_order: Vec<MarkKind>,
    /// Give headings an `id` matching the table of contents.
    pub heading_ids: bool,
}

impl Default for WalkOptions {
    fn default() -> WalkOptions {
        WalkOptions {
            mark_order: vec![MarkKind::Link, MarkKind::Bold, MarkKind::Italic],
            heading_ids: true,
        }
    }
}

/// Render a whole document to `renderer`.
pub fn render_document<R: Renderer>(renderer: &mut R, doc: &Document, options: &WalkOptions) {
    for block in &doc.content {
        render_block(renderer, block, options);
    }
}

fn render_block<R: Renderer>(renderer: &mut R, block: &Block, options: &WalkOptions) {
    match block {
        Block::Heading(heading) => {
            let level = heading.level();
            let id = if options.heading_ids {
                let text: String = heading.content.iter().map(|t| t.text.as_str()).collect();
                Some(slugify(&text)).filter(|id| !id.is_empty())
            } else {
                None
            };
            renderer.start_heading(level, id.as_deref());
            render_inlines(renderer, &heading.content, options);
            renderer.end_heading(level);
        }
        Block::Paragraph(paragraph) => {
            renderer.start_paragraph();
            render_inlines(renderer, &paragraph.content, options);
            renderer.end_paragraph();
        }
        Block::BulletList(list) => render_list(renderer, list, false, options),
        Block::OrderedList(list) => render_list(renderer, list, true, options),
        Block::Image(image) => renderer.add_image(&image.attrs),
    }
}

fn render_list<R: Renderer>(renderer: &mut R, list: &List, ordered: bool, options: &WalkOptions) {
    renderer.start_list(ordered);
    for item in &list.items {
        renderer.start_list_item();
        render_inlines(renderer, &item.content.content, options);
        renderer.end_list_item();
    }
    renderer.end_list(ordered);
}

fn render_inlines<R: Renderer>(renderer: &mut R, texts: &[Text], options: &WalkOptions) {
    for text in texts {
        let marks = canonical_marks(&text.marks, &options.mark_order);
        for mark in &marks {
            renderer.start_mark(mark);
        }
        renderer.add_text(&text.text);
        for mark in marks.iter().rev() {
            renderer.end_mark(mark);
        }
    }
}

/// The marks to open, outermost first: at most one of each kind, sorted by
/// `order`.  The same set of marks always comes out the same way.
pub fn canonical_marks<'a>(marks: &'a [Mark], order: &[MarkKind]) -> Vec<&'a Mark> {
    let mut result: Vec<&Mark> = Vec::with_capacity(marks.len());
    for mark in marks {
        if !result.iter().any(|m| m.kind() == mark.kind()) {
            result.push(mark);
        }
    }
    let rank = |mark: &Mark| {
        order
            .iter()
            .position(|&kind| kind == mark.kind())
            .unwrap_or(order.len())
    };
    // Stable, so unlisted kinds keep their relative order.
    result.sort_by_key(|mark| rank(*mark));
    result
}
