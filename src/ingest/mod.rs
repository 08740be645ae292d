//! Ingestion: turning third-party HTML into a [`Document`].
//!
//! The content region of a page is split into its immediate child
//! elements ("containers").  Containers which look like share widgets,
//! carousels or marketing call-outs are skipped whole; from the rest every
//! heading, paragraph and list is extracted, in document order.  Anything
//! else (images, tables, embeds...) is dropped silently.

pub mod batch;
pub mod dom;

use std::collections::VecDeque;
use std::io;

use html5ever::driver::ParseOpts;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{parse_document, parse_fragment, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::schema::{Block, Document, Heading, HeadingLevel, List, ListItem, Mark, Paragraph, Text};
use crate::Result;
use dom::{descendants, element_children, find_first, get_attr, has_class, tag_name, text_content};

/// The call-to-action phrase which marks promotional blocks on the source
/// site.
pub const DEFAULT_EXCLUDED_PHRASE: &str = "Objednejte se";

/// How to locate a page's main content region.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RootSelector {
    /// The first `<article>`, else the first `<main>`, else `<body>`.
    #[default]
    Auto,
    /// The first element with this tag name.
    Tag(String),
    /// The first element carrying this class.
    Class(String),
}

/// How marks are attributed to text inside nested formatting tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkMode {
    /// Only the innermost-matched wrapping tag counts, and its whole text
    /// becomes one run: `<strong><em>x</em></strong>` is just bold.
    #[default]
    Shallow,
    /// Marks accumulate down the tree: `<strong><em>x</em></strong>` is
    /// bold and italic.
    Nested,
}

/// Configuration for HTML ingestion.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    root: RootSelector,
    excluded_class_fragments: Vec<String>,
    excluded_classes: Vec<String>,
    excluded_phrases: Vec<String>,
    mark_mode: MarkMode,
}

impl Default for IngestConfig {
    fn default() -> IngestConfig {
        IngestConfig {
            root: RootSelector::Auto,
            excluded_class_fragments: vec!["share".into()],
            excluded_classes: vec!["swiper".into()],
            excluded_phrases: vec![DEFAULT_EXCLUDED_PHRASE.into()],
            mark_mode: MarkMode::Shallow,
        }
    }
}

/// A parsed source page: its extracted document plus page-level metadata.
#[derive(Debug, Clone)]
pub struct Page {
    /// The extracted content
    pub document: Document,
    /// The first `<h1>`, else the `<title>`, if any.
    pub title: Option<String>,
    /// The `og:image` meta property, if any.
    pub featured_image: Option<String>,
}

impl IngestConfig {
    /// Select the content region with `root`.
    pub fn content_root(mut self, root: RootSelector) -> Self {
        self.root = root;
        self
    }

    /// Skip containers holding any element whose class attribute contains
    /// `fragment` as a substring.
    pub fn exclude_class_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.excluded_class_fragments.push(fragment.into());
        self
    }

    /// Skip containers holding any element with exactly this class.
    pub fn exclude_class(mut self, class: impl Into<String>) -> Self {
        self.excluded_classes.push(class.into());
        self
    }

    /// Skip containers whose text contains `phrase`.
    pub fn exclude_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.excluded_phrases.push(phrase.into());
        self
    }

    /// Remove all exclusion rules, including the defaults.
    pub fn clear_exclusions(mut self) -> Self {
        self.excluded_class_fragments.clear();
        self.excluded_classes.clear();
        self.excluded_phrases.clear();
        self
    }

    /// Set how marks are attributed inside nested formatting.
    pub fn mark_mode(mut self, mode: MarkMode) -> Self {
        self.mark_mode = mode;
        self
    }

    /// Reads a whole HTML page from `input` and extracts the document from
    /// its content region.  A page with no content region gives an empty
    /// document.
    pub fn document_from_read<R: io::Read>(&self, input: R) -> Result<Document> {
        Ok(self.page_from_read(input)?.document)
    }

    /// Reads a whole HTML page and extracts both the document and the
    /// page's title and featured image.
    pub fn page_from_read<R: io::Read>(&self, mut input: R) -> Result<Page> {
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                drop_doctype: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let dom = parse_document(RcDom::default(), opts)
            .from_utf8()
            .read_from(&mut input)?;
        let document = match self.find_root(&dom.document) {
            Some(root) => self.document_from_root(&root),
            None => Document::default(),
        };
        Ok(Page {
            document,
            title: page_title(&dom.document),
            featured_image: featured_image(&dom.document),
        })
    }

    /// Extracts a document from a fragment of HTML holding the markup of a
    /// content region.  If the fragment is a single wrapper element (a
    /// `<div>`, `<article>`, `<section>` or `<main>`), that element is the
    /// content region; otherwise the fragment's top-level nodes are its
    /// children.
    pub fn document_from_fragment(&self, html: &str) -> Document {
        let dom = parse_fragment(
            RcDom::default(),
            ParseOpts::default(),
            QualName::new(None, ns!(html), local_name!("body")),
            Vec::new(),
        )
        .one(html);
        // The fragment parser puts everything under a synthetic <html>.
        let container = match element_children(&dom.document).into_iter().next() {
            Some(container) => container,
            None => return Document::default(),
        };
        // A wrapper which is itself excluded stays a container, so it is
        // skipped like any other.
        let root = lone_wrapper(&container)
            .filter(|wrapper| !self.has_excluded_class(wrapper))
            .unwrap_or(container);
        self.document_from_root(&root)
    }

    /// Extracts a document from a DOM subtree which is a page's content
    /// region.
    pub fn document_from_root(&self, root: &Handle) -> Document {
        let mut content = Vec::new();
        for container in element_children(root) {
            if self.is_excluded(&container) {
                html_trace!("skipping excluded container <{:?}>", tag_name(&container));
                continue;
            }
            for node in descendants(&container) {
                if let Some(block) = self.process_element(&node) {
                    content.push(block);
                }
            }
        }
        Document::new(content)
    }

    fn find_root(&self, document: &Handle) -> Option<Handle> {
        match self.root {
            RootSelector::Auto => ["article", "main", "body"]
                .iter()
                .find_map(|tag| find_first(document, |n| tag_name(n) == Some(*tag))),
            RootSelector::Tag(ref tag) => {
                find_first(document, |n| tag_name(n) == Some(tag.as_str()))
            }
            RootSelector::Class(ref class) => find_first(document, |n| has_class(n, class)),
        }
    }

    /// Returns true if the container (or anything inside it) matches one of
    /// the exclusion rules.
    fn is_excluded(&self, container: &Handle) -> bool {
        if descendants(container).any(|node| self.has_excluded_class(&node)) {
            return true;
        }
        if self.excluded_phrases.is_empty() {
            return false;
        }
        let text = text_content(container);
        self.excluded_phrases
            .iter()
            .any(|phrase| text.contains(phrase.as_str()))
    }

    /// Returns true if the element's own class attribute matches one of the
    /// class rules.
    fn has_excluded_class(&self, node: &Handle) -> bool {
        let classes = match get_attr(node, "class") {
            Some(classes) => classes,
            None => return false,
        };
        self.excluded_class_fragments
            .iter()
            .any(|fragment| classes.contains(fragment.as_str()))
            || classes
                .split_whitespace()
                .any(|class| self.excluded_classes.iter().any(|ex| ex == class))
    }

    fn process_element(&self, handle: &Handle) -> Option<Block> {
        let name = match handle.data {
            NodeData::Element { ref name, .. } => name,
            _ => return None,
        };
        match name.expanded() {
            expanded_name!(html "h1")
            | expanded_name!(html "h2")
            | expanded_name!(html "h3")
            | expanded_name!(html "h4") => {
                let source_level: u8 = name.local[1..].parse().ok()?;
                heading_from_element(handle, HeadingLevel::from_source_level(source_level)?)
            }
            expanded_name!(html "p") => {
                let content = self.paragraph_content(handle);
                if content.is_empty() {
                    None
                } else {
                    Some(Block::Paragraph(Paragraph { content }))
                }
            }
            expanded_name!(html "ul") => list_from_element(handle).map(Block::BulletList),
            expanded_name!(html "ol") => list_from_element(handle).map(Block::OrderedList),
            _ => None,
        }
    }

    /// Collect the text runs of a paragraph.
    ///
    /// This is a worklist traversal: nodes are taken from the front of the
    /// queue, and the children of anything which isn't text or a
    /// recognised formatting tag are put back on the front, so runs come
    /// out in document order.
    fn paragraph_content(&self, paragraph: &Handle) -> Vec<Text> {
        let mut runs = Vec::new();
        let mut queue: VecDeque<(Handle, Vec<Mark>)> = paragraph
            .children
            .borrow()
            .iter()
            .map(|child| (child.clone(), Vec::new()))
            .collect();

        while let Some((node, marks)) = queue.pop_front() {
            match node.data {
                NodeData::Text { ref contents } => {
                    let text = contents.borrow();
                    if !text.trim().is_empty() {
                        runs.push(Text::with_marks(&**text, marks));
                    }
                }
                NodeData::Element { ref name, .. } => {
                    let mark = match name.expanded() {
                        expanded_name!(html "strong") | expanded_name!(html "b") => {
                            Some(Mark::Bold)
                        }
                        expanded_name!(html "em") | expanded_name!(html "i") => {
                            Some(Mark::Italic)
                        }
                        expanded_name!(html "a") => get_attr(&node, "href")
                            .filter(|href| !href.is_empty())
                            .map(Mark::link),
                        _ => None,
                    };
                    match (mark, self.mark_mode) {
                        (Some(mark), MarkMode::Shallow) => {
                            let text = text_content(&node);
                            if !text.trim().is_empty() {
                                runs.push(Text::with_marks(text, vec![mark]));
                            }
                        }
                        (Some(mark), MarkMode::Nested) => {
                            let mut marks = marks;
                            if !marks.iter().any(|m| m.kind() == mark.kind()) {
                                marks.push(mark);
                            }
                            push_children_front(&mut queue, &node, &marks);
                        }
                        (None, _) => push_children_front(&mut queue, &node, &marks),
                    }
                }
                _ => {}
            }
        }
        runs
    }
}

fn push_children_front(queue: &mut VecDeque<(Handle, Vec<Mark>)>, node: &Handle, marks: &[Mark]) {
    for child in node.children.borrow().iter().rev() {
        queue.push_front((child.clone(), marks.to_vec()));
    }
}

fn heading_from_element(handle: &Handle, level: HeadingLevel) -> Option<Block> {
    let text = text_content(handle);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(Block::Heading(Heading::new(level, text)))
}

/// Only direct `<li>` children count; each is flattened to its plain text.
fn list_from_element(handle: &Handle) -> Option<List> {
    let items: Vec<ListItem> = element_children(handle)
        .iter()
        .filter(|child| tag_name(child) == Some("li"))
        .filter_map(|li| {
            let text = text_content(li);
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                Some(ListItem::from_text(text))
            }
        })
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(List { items })
    }
}

/// If `container` holds exactly one generic wrapper element and nothing
/// else of substance, return that element.
fn lone_wrapper(container: &Handle) -> Option<Handle> {
    let children = container.children.borrow();
    let mut elements = children.iter().filter(|c| !dom::is_insignificant(c));
    let only = elements.next()?;
    if elements.next().is_some() {
        return None;
    }
    match tag_name(only) {
        Some("div") | Some("article") | Some("section") | Some("main") => Some(only.clone()),
        _ => None,
    }
}

fn page_title(document: &Handle) -> Option<String> {
    ["h1", "title"].iter().find_map(|tag| {
        let node = find_first(document, |n| tag_name(n) == Some(*tag))?;
        let text = text_content(&node);
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    })
}

fn featured_image(document: &Handle) -> Option<String> {
    let meta = find_first(document, |n| {
        tag_name(n) == Some("meta") && get_attr(n, "property").as_deref() == Some("og:image")
    })?;
    get_attr(&meta, "content").filter(|src| !src.is_empty())
}
