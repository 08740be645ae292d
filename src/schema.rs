//! The document model.
//!
//! A [`Document`] is a flat list of [`Block`]s; blocks hold runs of [`Text`]
//! which in turn carry zero or more [`Mark`]s.  Documents serialize to the
//! ProseMirror-style JSON shape used by the editor:
//!
//! ```json
//! {"type":"doc","content":[
//!   {"type":"heading","attrs":{"level":2},"content":[{"type":"text","text":"Title","marks":[]}]},
//!   {"type":"paragraph","content":[
//!     {"type":"text","text":"Hello ","marks":[]},
//!     {"type":"text","text":"world","marks":[{"type":"bold"}]}]}
//! ]}
//! ```
//!
//! Loading goes through [`Document::from_json`] (strict: any unrecognised or
//! invalid node is an error) or [`Document::from_json_lenient`] (invalid
//! nodes are dropped).  The raw-value predicates [`is_block`], [`is_inline`]
//! and [`is_mark`] apply the same rules to a single node.

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Horizontal placement of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Floated left
    Left,
    /// Centred (the default)
    #[default]
    Center,
    /// Floated right
    Right,
    /// Full content width
    Full,
}

impl Alignment {
    /// Every alignment, in display order.
    pub const ALL: [Alignment; 4] = [
        Alignment::Left,
        Alignment::Center,
        Alignment::Right,
        Alignment::Full,
    ];

    /// The serialized name.
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Full => "full",
        }
    }
}

/// Display size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    /// Small
    Small,
    /// Medium
    Medium,
    /// Large
    Large,
    /// Full width (the default)
    #[default]
    Full,
}

impl Size {
    /// Every size, in display order.
    pub const ALL: [Size; 4] = [Size::Small, Size::Medium, Size::Large, Size::Full];

    /// The serialized name.
    pub fn as_str(self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
            Size::Full => "full",
        }
    }
}

/// Heading level.  Source headings are collapsed onto two levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingLevel {
    /// Section heading (`<h2>`)
    H2,
    /// Subsection heading (`<h3>`)
    H3,
}

impl HeadingLevel {
    /// Map a source heading level (the `n` of `<hn>`) to a stored level:
    /// 1 and 2 become `H2`, 3 and 4 become `H3`; anything else is not a
    /// heading we keep.
    pub fn from_source_level(n: u8) -> Option<HeadingLevel> {
        match n {
            1 | 2 => Some(HeadingLevel::H2),
            3 | 4 => Some(HeadingLevel::H3),
            _ => None,
        }
    }

    /// The numeric level as stored and rendered.
    pub fn as_u8(self) -> u8 {
        match self {
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

impl Serialize for HeadingLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// The target of a link.  Only new-window links exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LinkTarget {
    /// `_blank`
    #[default]
    #[serde(rename = "_blank")]
    Blank,
}

/// Attributes of a link mark.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkAttrs {
    /// Link destination; opaque.
    pub href: String,
    /// Always `_blank`.
    #[serde(default)]
    pub target: LinkTarget,
}

/// A style or annotation on a run of text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
    /// Strong text
    Bold,
    /// Emphasised text
    Italic,
    /// Hyperlink
    Link {
        /// Where it goes
        attrs: LinkAttrs,
    },
}

impl Mark {
    /// Make a link mark opening in a new window.
    pub fn link(href: impl Into<String>) -> Mark {
        Mark::Link {
            attrs: LinkAttrs {
                href: href.into(),
                target: LinkTarget::Blank,
            },
        }
    }

    /// The kind of mark, ignoring attributes.
    pub fn kind(&self) -> MarkKind {
        match self {
            Mark::Bold => MarkKind::Bold,
            Mark::Italic => MarkKind::Italic,
            Mark::Link { .. } => MarkKind::Link,
        }
    }
}

/// Mark discriminant, used to configure rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkKind {
    /// `bold`
    Bold,
    /// `italic`
    Italic,
    /// `link`
    Link,
}

/// A run of text.  The text is never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename = "text")]
pub struct Text {
    /// The raw (unescaped) text.
    pub text: String,
    /// Marks in no particular order.
    pub marks: Vec<Mark>,
}

impl Text {
    /// Text without marks.
    pub fn plain(text: impl Into<String>) -> Text {
        Text {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    /// Text carrying the given marks.
    pub fn with_marks(text: impl Into<String>, marks: Vec<Mark>) -> Text {
        Text {
            text: text.into(),
            marks,
        }
    }
}

/// Heading attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HeadingAttrs {
    /// 2 or 3
    pub level: HeadingLevel,
}

/// A section heading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Heading {
    /// Level
    pub attrs: HeadingAttrs,
    /// Never empty
    pub content: Vec<Text>,
}

impl Heading {
    /// A heading holding a single plain text run.
    pub fn new(level: HeadingLevel, text: impl Into<String>) -> Heading {
        Heading {
            attrs: HeadingAttrs { level },
            content: vec![Text::plain(text)],
        }
    }

    /// The heading's level.
    pub fn level(&self) -> HeadingLevel {
        self.attrs.level
    }
}

/// A paragraph of text runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Paragraph {
    /// Never empty in a stored document.
    pub content: Vec<Text>,
}

impl Paragraph {
    /// A paragraph holding a single plain text run.
    pub fn from_text(text: impl Into<String>) -> Paragraph {
        Paragraph {
            content: vec![Text::plain(text)],
        }
    }
}

/// One list entry: a single plain-text paragraph.  Nested lists and inline
/// marks inside list items are not represented.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename = "listItem")]
pub struct ListItem {
    /// The item's text.
    #[serde(serialize_with = "serialize_item_paragraph")]
    pub content: Paragraph,
}

impl ListItem {
    /// A list item from plain text.
    pub fn from_text(text: impl Into<String>) -> ListItem {
        ListItem {
            content: Paragraph::from_text(text),
        }
    }
}

/// Stored as `[{"type":"paragraph","content":[...]}]`.
fn serialize_item_paragraph<S: Serializer>(
    paragraph: &Paragraph,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    #[serde(tag = "type", rename = "paragraph")]
    struct Tagged<'a> {
        content: &'a [Text],
    }
    let mut seq = serializer.serialize_seq(Some(1))?;
    seq.serialize_element(&Tagged {
        content: &paragraph.content,
    })?;
    seq.end()
}

/// A bullet or ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct List {
    /// Never empty in a stored document.
    #[serde(rename = "content")]
    pub items: Vec<ListItem>,
}

/// Image attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageAttrs {
    /// Image URL; opaque.
    pub src: String,
    /// Alternative text
    #[serde(default)]
    pub alt: String,
    /// Placement
    #[serde(default)]
    pub alignment: Alignment,
    /// Display size
    #[serde(default)]
    pub size: Size,
}

impl Default for ImageAttrs {
    fn default() -> ImageAttrs {
        default_image_attrs("")
    }
}

/// Attributes for a freshly inserted image: no alt text, centred, full size.
pub fn default_image_attrs(src: impl Into<String>) -> ImageAttrs {
    ImageAttrs {
        src: src.into(),
        alt: String::new(),
        alignment: Alignment::default(),
        size: Size::default(),
    }
}

/// An image block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Image {
    /// Attributes
    pub attrs: ImageAttrs,
}

impl Image {
    /// An image with default attributes.
    pub fn new(src: impl Into<String>) -> Image {
        Image {
            attrs: default_image_attrs(src),
        }
    }
}

/// A top-level content unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    /// Heading
    Heading(Heading),
    /// Paragraph
    Paragraph(Paragraph),
    /// Unordered list
    BulletList(List),
    /// Numbered list
    OrderedList(List),
    /// Image
    Image(Image),
}

impl Block {
    /// The node's `type` string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Block::Heading(_) => "heading",
            Block::Paragraph(_) => "paragraph",
            Block::BulletList(_) => "bulletList",
            Block::OrderedList(_) => "orderedList",
            Block::Image(_) => "image",
        }
    }

    /// All text runs reachable from this block, in order.
    pub fn texts(&self) -> Box<dyn Iterator<Item = &Text> + '_> {
        match self {
            Block::Heading(h) => Box::new(h.content.iter()),
            Block::Paragraph(p) => Box::new(p.content.iter()),
            Block::BulletList(l) | Block::OrderedList(l) => {
                Box::new(l.items.iter().flat_map(|item| item.content.content.iter()))
            }
            Block::Image(_) => Box::new(std::iter::empty()),
        }
    }
}

/// The root of a content tree.  An empty document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(tag = "type", rename = "doc")]
pub struct Document {
    /// Top-level blocks, in order.
    pub content: Vec<Block>,
}

impl Document {
    /// Create a document from blocks.
    pub fn new(content: Vec<Block>) -> Document {
        Document { content }
    }

    /// Returns true if there is no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Serialize to JSON text.
    pub fn to_json(&self) -> String {
        // Serializing plain strings and enums into a String cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Load a document, rejecting any node that is not valid.
    pub fn from_json(json: &str) -> crate::Result<Document> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Document::from_value(&value, Mode::Strict)?)
    }

    /// Load a document, dropping any node that is not valid.  Only a JSON
    /// syntax error (or a root that is not a document) fails.
    pub fn from_json_lenient(json: &str) -> crate::Result<Document> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Document::from_value(&value, Mode::Lenient)?)
    }

    /// Build a document from an already-parsed JSON value.
    pub fn from_value(value: &Value, mode: Mode) -> Result<Document, SchemaError> {
        let path = Path::root();
        let obj = expect_node(value, &path, "doc")?;
        let mut content = Vec::new();
        for (i, child) in children(obj, &path)?.iter().enumerate() {
            let child_path = path.index("content", i);
            match block_from_value(child, &child_path, mode) {
                Ok(block) => content.push(block),
                Err(e) if mode == Mode::Lenient => {
                    log::debug!("dropping invalid block: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(Document { content })
    }
}

/// How to treat invalid nodes while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fail on the first invalid node.
    Strict,
    /// Drop invalid nodes (and blocks left empty by dropping).
    Lenient,
}

/// What was wrong with a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaErrorKind {
    /// Not a JSON object
    #[error("node is not an object")]
    NotAnObject,
    /// No `type` string
    #[error("node has no type")]
    MissingType,
    /// A `type` we don't know, or one not allowed here
    #[error("unexpected node type {0:?} (expected {1})")]
    UnexpectedType(String, &'static str),
    /// Bad or missing attribute
    #[error("invalid attribute {0:?}")]
    InvalidAttribute(&'static str),
    /// A node which must have content has none
    #[error("empty content")]
    EmptyContent,
}

/// A node failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {kind}")]
pub struct SchemaError {
    /// JSON path to the node, e.g. `content[2].content[0]`.
    pub path: String,
    /// The problem
    pub kind: SchemaErrorKind,
}

#[derive(Clone)]
struct Path(String);

impl Path {
    fn root() -> Path {
        Path(String::new())
    }
    fn index(&self, field: &str, i: usize) -> Path {
        if self.0.is_empty() {
            Path(format!("{}[{}]", field, i))
        } else {
            Path(format!("{}.{}[{}]", self.0, field, i))
        }
    }
    fn err(&self, kind: SchemaErrorKind) -> SchemaError {
        SchemaError {
            path: if self.0.is_empty() {
                "$".into()
            } else {
                self.0.clone()
            },
            kind,
        }
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn node_type<'v>(value: &'v Value, path: &Path) -> Result<(&'v Map<String, Value>, &'v str), SchemaError> {
    let obj = value
        .as_object()
        .ok_or_else(|| path.err(SchemaErrorKind::NotAnObject))?;
    let ty = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| path.err(SchemaErrorKind::MissingType))?;
    Ok((obj, ty))
}

fn expect_node<'v>(
    value: &'v Value,
    path: &Path,
    expected: &'static str,
) -> Result<&'v Map<String, Value>, SchemaError> {
    let (obj, ty) = node_type(value, path)?;
    if ty != expected {
        return Err(path.err(SchemaErrorKind::UnexpectedType(ty.into(), expected)));
    }
    Ok(obj)
}

/// The `content` array, which may be absent.
fn children<'v>(obj: &'v Map<String, Value>, path: &Path) -> Result<&'v [Value], SchemaError> {
    match obj.get("content") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(v)) => Ok(v),
        Some(_) => Err(path.err(SchemaErrorKind::InvalidAttribute("content"))),
    }
}

fn attr<'v>(obj: &'v Map<String, Value>, name: &'static str, path: &Path) -> Result<&'v Value, SchemaError> {
    obj.get("attrs")
        .and_then(|attrs| attrs.get(name))
        .ok_or_else(|| path.err(SchemaErrorKind::InvalidAttribute(name)))
}

fn mark_from_value(value: &Value, path: &Path) -> Result<Mark, SchemaError> {
    let (obj, ty) = node_type(value, path)?;
    match ty {
        "bold" => Ok(Mark::Bold),
        "italic" => Ok(Mark::Italic),
        "link" => {
            let attrs = obj
                .get("attrs")
                .cloned()
                .ok_or_else(|| path.err(SchemaErrorKind::InvalidAttribute("href")))?;
            let attrs: LinkAttrs = serde_json::from_value(attrs)
                .map_err(|_| path.err(SchemaErrorKind::InvalidAttribute("href")))?;
            if attrs.href.is_empty() {
                return Err(path.err(SchemaErrorKind::InvalidAttribute("href")));
            }
            Ok(Mark::Link { attrs })
        }
        other => Err(path.err(SchemaErrorKind::UnexpectedType(
            other.into(),
            "bold, italic or link",
        ))),
    }
}

fn text_from_value(value: &Value, path: &Path, mode: Mode) -> Result<Text, SchemaError> {
    let obj = expect_node(value, path, "text")?;
    let text = obj
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| path.err(SchemaErrorKind::InvalidAttribute("text")))?;
    if text.trim().is_empty() {
        return Err(path.err(SchemaErrorKind::EmptyContent));
    }
    let mut marks = Vec::new();
    if let Some(raw_marks) = obj.get("marks") {
        let raw_marks = raw_marks
            .as_array()
            .ok_or_else(|| path.err(SchemaErrorKind::InvalidAttribute("marks")))?;
        for (i, raw) in raw_marks.iter().enumerate() {
            match mark_from_value(raw, &path.index("marks", i)) {
                Ok(mark) => marks.push(mark),
                Err(e) if mode == Mode::Lenient => log::debug!("dropping invalid mark: {}", e),
                Err(e) => return Err(e),
            }
        }
    }
    Ok(Text {
        text: text.into(),
        marks,
    })
}

fn inline_content(
    obj: &Map<String, Value>,
    path: &Path,
    mode: Mode,
) -> Result<Vec<Text>, SchemaError> {
    let mut content = Vec::new();
    for (i, child) in children(obj, path)?.iter().enumerate() {
        match text_from_value(child, &path.index("content", i), mode) {
            Ok(text) => content.push(text),
            Err(e) if mode == Mode::Lenient => log::debug!("dropping invalid inline: {}", e),
            Err(e) => return Err(e),
        }
    }
    if content.is_empty() {
        return Err(path.err(SchemaErrorKind::EmptyContent));
    }
    Ok(content)
}

fn paragraph_from_value(value: &Value, path: &Path, mode: Mode) -> Result<Paragraph, SchemaError> {
    let obj = expect_node(value, path, "paragraph")?;
    Ok(Paragraph {
        content: inline_content(obj, path, mode)?,
    })
}

fn list_item_from_value(value: &Value, path: &Path, mode: Mode) -> Result<ListItem, SchemaError> {
    let obj = expect_node(value, path, "listItem")?;
    let paragraphs = children(obj, path)?;
    if paragraphs.len() != 1 {
        return Err(path.err(SchemaErrorKind::InvalidAttribute("content")));
    }
    Ok(ListItem {
        content: paragraph_from_value(&paragraphs[0], &path.index("content", 0), mode)?,
    })
}

fn list_from_value(obj: &Map<String, Value>, path: &Path, mode: Mode) -> Result<List, SchemaError> {
    let mut items = Vec::new();
    for (i, child) in children(obj, path)?.iter().enumerate() {
        match list_item_from_value(child, &path.index("content", i), mode) {
            Ok(item) => items.push(item),
            Err(e) if mode == Mode::Lenient => log::debug!("dropping invalid list item: {}", e),
            Err(e) => return Err(e),
        }
    }
    if items.is_empty() {
        return Err(path.err(SchemaErrorKind::EmptyContent));
    }
    Ok(List { items })
}

fn block_from_value(value: &Value, path: &Path, mode: Mode) -> Result<Block, SchemaError> {
    let (obj, ty) = node_type(value, path)?;
    match ty {
        "heading" => {
            let level = attr(obj, "level", path)?
                .as_u64()
                .and_then(|n| match n {
                    2 => Some(HeadingLevel::H2),
                    3 => Some(HeadingLevel::H3),
                    _ => None,
                })
                .ok_or_else(|| path.err(SchemaErrorKind::InvalidAttribute("level")))?;
            Ok(Block::Heading(Heading {
                attrs: HeadingAttrs { level },
                content: inline_content(obj, path, mode)?,
            }))
        }
        "paragraph" => Ok(Block::Paragraph(paragraph_from_value(value, path, mode)?)),
        "bulletList" => Ok(Block::BulletList(list_from_value(obj, path, mode)?)),
        "orderedList" => Ok(Block::OrderedList(list_from_value(obj, path, mode)?)),
        "image" => {
            let attrs = obj
                .get("attrs")
                .cloned()
                .ok_or_else(|| path.err(SchemaErrorKind::InvalidAttribute("src")))?;
            let attrs: ImageAttrs = serde_json::from_value(attrs)
                .map_err(|_| path.err(SchemaErrorKind::InvalidAttribute("attrs")))?;
            Ok(Block::Image(Image { attrs }))
        }
        other => Err(path.err(SchemaErrorKind::UnexpectedType(other.into(), "a block"))),
    }
}

/// Check a raw block node, returning the precise problem if it is invalid.
pub fn validate_block(value: &Value) -> Result<Block, SchemaError> {
    block_from_value(value, &Path::root(), Mode::Strict)
}

/// Returns true if `value` is a valid block node.
pub fn is_block(value: &Value) -> bool {
    validate_block(value).is_ok()
}

/// Returns true if `value` is a valid inline (text) node.
pub fn is_inline(value: &Value) -> bool {
    text_from_value(value, &Path::root(), Mode::Strict).is_ok()
}

/// Returns true if `value` is a valid mark.
pub fn is_mark(value: &Value) -> bool {
    mark_from_value(value, &Path::root()).is_ok()
}
