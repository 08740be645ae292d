//! Attribute commands for an interactive editor.
//!
//! An [`Editor`] owns the live document and at most one targeted node.
//! Commands act on the target only; with no target, or a target of the
//! wrong kind, they do nothing.

use crate::schema::{Alignment, Block, Document, ImageAttrs, Size};
use crate::Result;

/// Locates a node inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodePath {
    /// A top-level block
    Block(usize),
    /// An item of a top-level list
    ListItem {
        /// Index of the list in the document
        block: usize,
        /// Index of the item in the list
        item: usize,
    },
}

/// A single mutation of the targeted node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set an image's alignment
    SetAlignment(Alignment),
    /// Set an image's size
    SetSize(Size),
    /// Set an image's alt text
    SetAlt(String),
    /// Remove the node from its parent
    DeleteNode,
}

/// A live document plus the node currently targeted by the toolbar.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    doc: Document,
    target: Option<NodePath>,
}

impl Editor {
    /// Start editing `doc` with nothing targeted.
    pub fn new(doc: Document) -> Editor {
        Editor { doc, target: None }
    }

    /// Start editing a stored document.  Invalid nodes are dropped.
    pub fn from_json(json: &str) -> Result<Editor> {
        Ok(Editor::new(Document::from_json_lenient(json)?))
    }

    /// The document being edited.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Finish editing, returning the document.
    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Serialize the document for saving.
    pub fn to_json(&self) -> String {
        self.doc.to_json()
    }

    /// The targeted node, if any.
    pub fn target(&self) -> Option<NodePath> {
        self.target
    }

    /// Target the node at `path`.  Returns false (and clears the target)
    /// if there is no such node.
    pub fn select(&mut self, path: NodePath) -> bool {
        let exists = match path {
            NodePath::Block(i) => i < self.doc.content.len(),
            NodePath::ListItem { block, item } => match self.doc.content.get(block) {
                Some(Block::BulletList(list)) | Some(Block::OrderedList(list)) => {
                    item < list.items.len()
                }
                _ => false,
            },
        };
        self.target = if exists { Some(path) } else { None };
        exists
    }

    /// Clear the target.
    pub fn deselect(&mut self) {
        self.target = None;
    }

    /// The attributes of the targeted image, if the target is an image.
    pub fn target_image(&self) -> Option<&ImageAttrs> {
        match self.target? {
            NodePath::Block(i) => match self.doc.content.get(i)? {
                Block::Image(image) => Some(&image.attrs),
                _ => None,
            },
            NodePath::ListItem { .. } => None,
        }
    }

    fn target_image_mut(&mut self) -> Option<&mut ImageAttrs> {
        match self.target? {
            NodePath::Block(i) => match self.doc.content.get_mut(i)? {
                Block::Image(image) => Some(&mut image.attrs),
                _ => None,
            },
            NodePath::ListItem { .. } => None,
        }
    }

    fn with_image<F: FnOnce(&mut ImageAttrs)>(&mut self, what: &str, f: F) {
        match self.target_image_mut() {
            Some(attrs) => f(attrs),
            None => log::debug!("{}: no image targeted", what),
        }
    }

    /// Set the targeted image's alignment.
    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.with_image("set_alignment", |attrs| attrs.alignment = alignment);
    }

    /// Set the targeted image's size.
    pub fn set_size(&mut self, size: Size) {
        self.with_image("set_size", |attrs| attrs.size = size);
    }

    /// Set the targeted image's alt text.
    pub fn set_alt(&mut self, alt: impl Into<String>) {
        let alt = alt.into();
        self.with_image("set_alt", |attrs| attrs.alt = alt);
    }

    /// Remove the targeted node from its parent.  A list left with no items
    /// is removed as well.  The target is cleared.
    pub fn delete_node(&mut self) {
        let target = match self.target.take() {
            Some(target) => target,
            None => return,
        };
        match target {
            NodePath::Block(i) => {
                if i < self.doc.content.len() {
                    self.doc.content.remove(i);
                }
            }
            NodePath::ListItem { block, item } => {
                let now_empty = match self.doc.content.get_mut(block) {
                    Some(Block::BulletList(list)) | Some(Block::OrderedList(list)) => {
                        if item < list.items.len() {
                            list.items.remove(item);
                        }
                        list.items.is_empty()
                    }
                    _ => false,
                };
                if now_empty {
                    self.doc.content.remove(block);
                }
            }
        }
    }

    /// Apply a command to the target.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SetAlignment(alignment) => self.set_alignment(alignment),
            Command::SetSize(size) => self.set_size(size),
            Command::SetAlt(alt) => self.set_alt(alt),
            Command::DeleteNode => self.delete_node(),
        }
    }
}

/// A key press delivered to the alt-text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character
    Char(char),
    /// Delete the last character
    Backspace,
    /// Commit
    Enter,
    /// Cancel
    Escape,
}

/// State of the alt-text input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AltTextState {
    /// Showing the stored alt text
    #[default]
    Idle,
    /// Editing a copy of it
    Editing {
        /// The text being edited
        buffer: String,
        /// The image the text was taken from
        target: NodePath,
    },
}

/// How an edit finished.  Either way the input is back to `Idle`.  An edit
/// whose image is no longer targeted when committed is cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AltTextOutcome {
    /// The buffer was written to the image
    Saved(String),
    /// The buffer was discarded
    Cancelled,
}

/// The alt-text input of the image toolbar.
#[derive(Debug, Clone, Default)]
pub struct AltTextEditor {
    state: AltTextState,
}

impl AltTextEditor {
    /// A new, idle input.
    pub fn new() -> AltTextEditor {
        AltTextEditor::default()
    }

    /// The current state.
    pub fn state(&self) -> &AltTextState {
        &self.state
    }

    /// Returns true while editing.
    pub fn is_editing(&self) -> bool {
        matches!(self.state, AltTextState::Editing { .. })
    }

    /// Start editing, seeding the buffer with the targeted image's alt
    /// text.  Returns false if no image is targeted or already editing.
    pub fn begin(&mut self, editor: &Editor) -> bool {
        if self.is_editing() {
            return false;
        }
        match (editor.target(), editor.target_image()) {
            (Some(target), Some(attrs)) => {
                self.state = AltTextState::Editing {
                    buffer: attrs.alt.clone(),
                    target,
                };
                true
            }
            _ => false,
        }
    }

    /// Replace the whole buffer (e.g. on paste).  Ignored when idle.
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        if let AltTextState::Editing { ref mut buffer, .. } = self.state {
            *buffer = text.into();
        }
    }

    /// Handle a key.  `Enter` saves the buffer through
    /// [`Editor::set_alt`], provided the image it was taken from is still
    /// targeted.  `Escape` discards it.  Both return to `Idle` and report
    /// what happened.  Other keys edit the buffer.
    pub fn handle_key(&mut self, editor: &mut Editor, key: Key) -> Option<AltTextOutcome> {
        let (buffer, target) = match self.state {
            AltTextState::Editing {
                ref mut buffer,
                target,
            } => (buffer, target),
            AltTextState::Idle => return None,
        };
        match key {
            Key::Char(c) => {
                buffer.push(c);
                None
            }
            Key::Backspace => {
                buffer.pop();
                None
            }
            Key::Enter => {
                let text = std::mem::take(buffer);
                self.state = AltTextState::Idle;
                if editor.target() != Some(target) {
                    log::debug!("alt text edit for {:?} dropped: target moved", target);
                    return Some(AltTextOutcome::Cancelled);
                }
                editor.set_alt(text.clone());
                Some(AltTextOutcome::Saved(text))
            }
            Key::Escape => {
                self.state = AltTextState::Idle;
                Some(AltTextOutcome::Cancelled)
            }
        }
    }

    /// What the input shows: the buffer while editing, otherwise the
    /// targeted image's stored alt text.
    pub fn display(&self, editor: &Editor) -> String {
        match self.state {
            AltTextState::Editing { ref buffer, .. } => buffer.clone(),
            AltTextState::Idle => editor
                .target_image()
                .map(|attrs| attrs.alt.clone())
                .unwrap_or_default(),
        }
    }
}
