//! Small helpers over the `markup5ever_rcdom` tree.
//!
//! Everything here walks the DOM with an explicit stack, so arbitrarily deep
//! source markup cannot overflow the call stack.

use markup5ever_rcdom::{Handle, NodeData};

/// The local name of an element, or `None` for other node types.
pub fn tag_name(handle: &Handle) -> Option<&str> {
    match handle.data {
        NodeData::Element { ref name, .. } => Some(&*name.local),
        _ => None,
    }
}

/// The value of an attribute on an element.
pub fn get_attr(handle: &Handle, name: &str) -> Option<String> {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        for attr in attrs.borrow().iter() {
            if &*attr.name.local == name {
                return Some(attr.value.to_string());
            }
        }
    }
    None
}

/// Returns true if the element's class list contains `class` exactly.
pub fn has_class(handle: &Handle, class: &str) -> bool {
    get_attr(handle, "class")
        .map(|classes| classes.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// The element children of a node, in document order.
pub fn element_children(handle: &Handle) -> Vec<Handle> {
    handle
        .children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// Pre-order iterator over a node and all of its descendants.
pub struct Descendants {
    stack: Vec<Handle>,
}

impl Iterator for Descendants {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        let node = self.stack.pop()?;
        // Reversed so that the first child is popped next.
        self.stack
            .extend(node.children.borrow().iter().rev().cloned());
        Some(node)
    }
}

/// Iterate over `handle` and everything below it, in document order.
pub fn descendants(handle: &Handle) -> Descendants {
    Descendants {
        stack: vec![handle.clone()],
    }
}

/// The concatenated text of every text node under `handle`, like the
/// DOM's `textContent`.
pub fn text_content(handle: &Handle) -> String {
    let mut result = String::new();
    for node in descendants(handle) {
        if let NodeData::Text { ref contents } = node.data {
            result.push_str(&contents.borrow());
        }
    }
    result
}

/// The first element at or below `handle` satisfying `pred`.
pub fn find_first<F>(handle: &Handle, mut pred: F) -> Option<Handle>
where
    F: FnMut(&Handle) -> bool,
{
    descendants(handle).find(|node| matches!(node.data, NodeData::Element { .. }) && pred(node))
}

/// Returns true if a node is a text node holding only whitespace (or a
/// comment), i.e. something which doesn't count as content between elements.
pub fn is_insignificant(handle: &Handle) -> bool {
    match handle.data {
        NodeData::Text { ref contents } => contents.borrow().trim().is_empty(),
        NodeData::Comment { .. } => true,
        _ => false,
    }
}
