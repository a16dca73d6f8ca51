//! Document adapter.
//!
//! The extractor, highlighter and overlay only see a page through the
//! [`Document`] trait. A host implements the small required core (node
//! lookup, attributes, tree edits); the trait derives everything else
//! (traversal, text, markup, class lists, visibility) from it.

// ============================================================================
// Imports
// ============================================================================

use crate::identifiers::NodeId;

// ============================================================================
// Constants
// ============================================================================

/// Elements whose text never renders.
const NON_RENDERED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements serialized without a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

// ============================================================================
// NodeRef
// ============================================================================

/// Borrowed view of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    /// Element with its lower-case tag name.
    Element {
        /// Tag name, lower case.
        tag: &'a str,
    },
    /// Text node with its raw text.
    Text(&'a str),
}

// ============================================================================
// Document Trait
// ============================================================================

/// Mutable view of a hosted page's DOM.
///
/// `Send` so a page agent task can own it.
pub trait Document: Send {
    // ------------------------------------------------------------------------
    // Required
    // ------------------------------------------------------------------------

    /// Document title.
    fn title(&self) -> &str;

    /// Document URL.
    fn url(&self) -> &str;

    /// The `<html>` element.
    fn root(&self) -> NodeId;

    /// The `<head>` element.
    fn head(&self) -> NodeId;

    /// The `<body>` element.
    fn body(&self) -> NodeId;

    /// Looks a node up. `None` for an unknown ID.
    fn node(&self, id: NodeId) -> Option<NodeRef<'_>>;

    /// Child nodes, in order.
    fn children(&self, id: NodeId) -> &[NodeId];

    /// Parent node, `None` for the root and detached nodes.
    fn parent(&self, id: NodeId) -> Option<NodeId>;

    /// Attribute value, `None` if absent or `id` is not an element.
    fn attribute(&self, id: NodeId, name: &str) -> Option<&str>;

    /// All attributes of an element, in insertion order.
    fn attributes(&self, id: NodeId) -> Vec<(&str, &str)>;

    /// Sets an attribute, replacing any previous value.
    fn set_attribute(&mut self, id: NodeId, name: &str, value: &str);

    /// Removes an attribute if present.
    fn remove_attribute(&mut self, id: NodeId, name: &str);

    /// Creates a detached element.
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Creates a detached text node.
    fn create_text(&mut self, text: &str) -> NodeId;

    /// Appends `child` as the last child of `parent`, detaching it first.
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Removes a node (and its subtree) from the tree.
    fn detach(&mut self, id: NodeId);

    /// Scrolls the viewport so `id` is centered.
    fn scroll_into_view(&mut self, id: NodeId);

    // ------------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------------

    /// Returns `true` if `id` is an element.
    fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id), Some(NodeRef::Element { .. }))
    }

    /// Descendants of `id` in document (pre-)order, `id` excluded.
    fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();

        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }

        out
    }

    /// Every attached element in document order, root first.
    fn elements(&self) -> Vec<NodeId> {
        let root = self.root();
        std::iter::once(root)
            .chain(self.descendants(root))
            .filter(|id| self.is_element(*id))
            .collect()
    }

    /// First element whose `id` attribute equals `value`.
    fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|id| self.attribute(*id, "id") == Some(value))
    }

    // ------------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------------

    /// Upper-case tag name, `None` for text nodes.
    fn tag_name(&self, id: NodeId) -> Option<String> {
        match self.node(id)? {
            NodeRef::Element { tag } => Some(tag.to_ascii_uppercase()),
            NodeRef::Text(_) => None,
        }
    }

    /// Concatenated text of every descendant text node.
    fn text_content(&self, id: NodeId) -> String {
        if let Some(NodeRef::Text(text)) = self.node(id) {
            return text.to_string();
        }

        self.descendants(id)
            .into_iter()
            .filter_map(|node| match self.node(node) {
                Some(NodeRef::Text(text)) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Rendered text of the body: one line per non-empty text node,
    /// skipping non-rendered and hidden subtrees.
    fn inner_text(&self) -> String {
        let mut lines = Vec::new();
        let mut stack = vec![self.body()];

        while let Some(id) = stack.pop() {
            match self.node(id) {
                Some(NodeRef::Text(text)) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        lines.push(trimmed.to_string());
                    }
                }
                Some(NodeRef::Element { tag }) => {
                    if NON_RENDERED_TAGS.contains(&tag) || self.is_hidden(id) {
                        continue;
                    }
                    stack.extend(self.children(id).iter().rev().copied());
                }
                None => {}
            }
        }

        lines.join("\n")
    }

    /// Serialized markup of a node and its subtree.
    fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        write_html(self, id, &mut out);
        out
    }

    // ------------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------------

    /// Returns `true` if the `class` attribute lists `class`.
    fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }

    /// Adds `class` to the `class` attribute if missing.
    fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let list = match self.attribute(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attribute(id, "class", &list);
    }

    /// Removes `class` from the `class` attribute.
    fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(existing) = self.attribute(id, "class") else {
            return;
        };
        let list = existing
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute(id, "class", &list);
    }

    // ------------------------------------------------------------------------
    // Visibility
    // ------------------------------------------------------------------------

    /// Returns `true` if the inline style sets `display: none`.
    fn is_hidden(&self, id: NodeId) -> bool {
        self.attribute(id, "style").is_some_and(|style| {
            style.split(';').any(|decl| {
                let mut parts = decl.splitn(2, ':');
                let property = parts.next().map(str::trim);
                let value = parts.next().map(str::trim);
                property.is_some_and(|p| p.eq_ignore_ascii_case("display"))
                    && value.is_some_and(|v| v.eq_ignore_ascii_case("none"))
            })
        })
    }

    /// Sets the inline `display` to `none` or `block`.
    fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        let display = if hidden { "none" } else { "block" };
        let mut declarations: Vec<String> = self
            .attribute(id, "style")
            .unwrap_or_default()
            .split(';')
            .map(str::trim)
            .filter(|decl| {
                !decl.is_empty()
                    && !decl
                        .split(':')
                        .next()
                        .is_some_and(|p| p.trim().eq_ignore_ascii_case("display"))
            })
            .map(str::to_string)
            .collect();
        declarations.push(format!("display: {display}"));
        let style = declarations.join("; ");
        self.set_attribute(id, "style", &style);
    }
}

// ============================================================================
// Serialization
// ============================================================================

fn write_html<D: Document + ?Sized>(doc: &D, id: NodeId, out: &mut String) {
    match doc.node(id) {
        Some(NodeRef::Text(text)) => out.push_str(&escape(text, false)),
        Some(NodeRef::Element { tag }) => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in doc.attributes(id) {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape(value, true));
                out.push('"');
            }
            out.push('>');

            if VOID_TAGS.contains(&tag) {
                return;
            }

            for child in doc.children(id) {
                write_html(doc, *child, out);
            }

            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        None => {}
    }
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
