//! In-memory [`Document`] for hosts without a live page, and for tests.
//!
//! Nodes live in an arena indexed by [`NodeId`]. Detached nodes stay in the
//! arena but are unreachable from the root.
//!
//! # Example
//!
//! ```
//! use mcq_overlay::page::{Document, El, StaticDocument};
//!
//! let doc = StaticDocument::new("https://example.com/quiz", "Quiz").with_body([
//!     El::new("p").text("1) What is 2+2?"),
//!     El::new("li").text("A) 3"),
//! ]);
//!
//! assert_eq!(doc.inner_text(), "1) What is 2+2?\nA) 3");
//! ```

// ============================================================================
// Imports
// ============================================================================

use crate::identifiers::NodeId;

use super::document::{Document, NodeRef};

// ============================================================================
// Constants
// ============================================================================

const ROOT: NodeId = NodeId::new(0);
const HEAD: NodeId = NodeId::new(1);
const BODY: NodeId = NodeId::new(2);

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone)]
enum Kind {
    Element(String),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: Kind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<(String, String)>,
}

impl Node {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

// ============================================================================
// StaticDocument
// ============================================================================

/// Arena-backed document: `<html>` with `<head>` and `<body>`.
#[derive(Debug, Clone)]
pub struct StaticDocument {
    url: String,
    title: String,
    nodes: Vec<Node>,
    last_scrolled: Option<NodeId>,
}

impl StaticDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        let mut doc = Self {
            url: url.into(),
            title: title.into(),
            nodes: Vec::new(),
            last_scrolled: None,
        };

        let root = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.append_child(root, head);
        doc.append_child(root, body);

        debug_assert_eq!((root, head, body), (ROOT, HEAD, BODY));
        doc
    }

    /// Appends each builder to `<body>`.
    #[must_use]
    pub fn with_body(mut self, elements: impl IntoIterator<Item = El>) -> Self {
        for element in elements {
            self.append(BODY, element);
        }
        self
    }

    /// Builds `element` and appends it to `parent`. Returns the new node.
    pub fn append(&mut self, parent: NodeId, element: El) -> NodeId {
        let id = self.create_element(&element.tag);
        for (name, value) in &element.attributes {
            self.set_attribute(id, name, value);
        }

        for child in element.children {
            match child {
                Child::Element(el) => {
                    self.append(id, el);
                }
                Child::Text(text) => {
                    let text_id = self.create_text(&text);
                    self.append_child(id, text_id);
                }
            }
        }

        self.append_child(parent, id);
        id
    }

    /// Node most recently scrolled into view.
    #[inline]
    #[must_use]
    pub fn last_scrolled(&self) -> Option<NodeId> {
        self.last_scrolled
    }

    /// Changes the document URL, as a navigation would.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn push(&mut self, kind: Kind) -> NodeId {
        self.nodes.push(Node::new(kind));
        NodeId::new(self.nodes.len() - 1)
    }
}

impl Document for StaticDocument {
    fn title(&self) -> &str {
        &self.title
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn root(&self) -> NodeId {
        ROOT
    }

    fn head(&self) -> NodeId {
        HEAD
    }

    fn body(&self) -> NodeId {
        BODY
    }

    fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.get(id).map(|node| match &node.kind {
            Kind::Element(tag) => NodeRef::Element { tag },
            Kind::Text(text) => NodeRef::Text(text),
        })
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn attributes(&self, id: NodeId) -> Vec<(&str, &str)> {
        self.get(id)
            .map(|node| {
                node.attributes
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(node) = self.get_mut(id) else {
            return;
        };
        if !matches!(node.kind, Kind::Element(_)) {
            return;
        }

        match node.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => value.clone_into(existing),
            None => node.attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.get_mut(id) {
            node.attributes.retain(|(key, _)| key != name);
        }
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Kind::Element(tag.to_ascii_lowercase()))
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Kind::Text(text.to_string()))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.get(parent).is_none() || self.get(child).is_none() {
            return;
        }
        self.detach(child);

        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(node) = self.get_mut(parent) {
            node.children.retain(|child| *child != id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    fn scroll_into_view(&mut self, id: NodeId) {
        self.last_scrolled = Some(id);
    }
}

// ============================================================================
// El Builder
// ============================================================================

#[derive(Debug, Clone)]
enum Child {
    Element(El),
    Text(String),
}

/// Element builder for [`StaticDocument`].
#[derive(Debug, Clone)]
pub struct El {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Child>,
}

impl El {
    /// Starts an element with `tag`.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sets the `id` attribute.
    #[must_use]
    pub fn id(self, value: impl Into<String>) -> Self {
        self.attr("id", value)
    }

    /// Sets the `class` attribute.
    #[must_use]
    pub fn class(self, value: impl Into<String>) -> Self {
        self.attr("class", value)
    }

    /// Sets an arbitrary attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Appends a text child.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    /// Appends an element child.
    #[must_use]
    pub fn child(mut self, element: El) -> Self {
        self.children.push(Child::Element(element));
        self
    }

    /// Appends several element children.
    #[must_use]
    pub fn children(mut self, elements: impl IntoIterator<Item = El>) -> Self {
        self.children
            .extend(elements.into_iter().map(Child::Element));
        self
    }

    /// Shorthand for `<input type="radio" name=.. value=..>`.
    #[must_use]
    pub fn radio(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new("input")
            .attr("type", "radio")
            .attr("name", name)
            .attr("value", value)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton() {
        let doc = StaticDocument::new("https://example.com", "Title");
        assert_eq!(doc.tag_name(doc.root()).as_deref(), Some("HTML"));
        assert_eq!(doc.tag_name(doc.head()).as_deref(), Some("HEAD"));
        assert_eq!(doc.tag_name(doc.body()).as_deref(), Some("BODY"));
        assert_eq!(doc.title(), "Title");
        assert_eq!(
            doc.outer_html(doc.root()),
            "<html><head></head><body></body></html>"
        );
    }

    #[test]
    fn test_builder_nests() {
        let doc = StaticDocument::new("https://example.com", "")
            .with_body([El::new("label").class("opt").child(El::radio("q1", "a")).text("Paris")]);

        let label = doc.children(doc.body())[0];
        assert_eq!(doc.attribute(label, "class"), Some("opt"));
        assert_eq!(doc.children(label).len(), 2);
        assert_eq!(doc.text_content(label), "Paris");
        assert_eq!(
            doc.outer_html(label),
            "<label class=\"opt\"><input type=\"radio\" name=\"q1\" value=\"a\">Paris</label>"
        );
    }

    #[test]
    fn test_append_child_moves_node() {
        let mut doc = StaticDocument::new("https://example.com", "");
        let body = doc.body();
        let first = doc.append(body, El::new("div"));
        let second = doc.append(body, El::new("div"));
        let p = doc.append(first, El::new("p"));

        doc.append_child(second, p);

        assert!(doc.children(first).is_empty());
        assert_eq!(doc.children(second), &[p]);
        assert_eq!(doc.parent(p), Some(second));
    }

    #[test]
    fn test_detach_hides_subtree() {
        let mut doc = StaticDocument::new("https://example.com", "")
            .with_body([El::new("div").id("gone").text("bye")]);
        let gone = doc.element_by_id("gone").expect("div");

        doc.detach(gone);

        assert!(doc.element_by_id("gone").is_none());
        assert_eq!(doc.parent(gone), None);
        assert_eq!(doc.inner_text(), "");
    }

    #[test]
    fn test_attributes_on_text_are_ignored() {
        let mut doc = StaticDocument::new("https://example.com", "");
        let text = doc.create_text("hi");
        doc.set_attribute(text, "id", "x");
        assert_eq!(doc.attribute(text, "id"), None);
    }

    #[test]
    fn test_last_scrolled() {
        let mut doc = StaticDocument::new("https://example.com", "");
        let body = doc.body();
        assert_eq!(doc.last_scrolled(), None);
        doc.scroll_into_view(body);
        assert_eq!(doc.last_scrolled(), Some(body));
    }
}
