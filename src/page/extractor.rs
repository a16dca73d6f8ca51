//! Page content extraction.
//!
//! Produces the [`PageSnapshot`] the detection service consumes: the body's
//! rendered text plus a structural bundle of text nodes and form controls,
//! both in document order.

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;

use crate::identifiers::NodeId;
use crate::protocol::{FormElement, PageLayout, PageSnapshot, TextNode};

use super::document::{Document, NodeRef};

// ============================================================================
// Extraction
// ============================================================================

/// Captures a snapshot of `doc`.
#[must_use]
pub fn extract<D: Document + ?Sized>(doc: &D) -> PageSnapshot {
    let layout = PageLayout {
        html: doc.outer_html(doc.root()),
        title: doc.title().to_string(),
        url: doc.url().to_string(),
        text_nodes: text_nodes(doc),
        form_elements: form_elements(doc),
    };

    debug!(
        url = %layout.url,
        text_nodes = layout.text_nodes.len(),
        form_elements = layout.form_elements.len(),
        "Page extracted"
    );

    PageSnapshot {
        content: doc.inner_text(),
        layout,
    }
}

/// Every non-empty text node under `<body>`, trimmed, with its owning
/// element's tag, class and id.
#[must_use]
pub fn text_nodes<D: Document + ?Sized>(doc: &D) -> Vec<TextNode> {
    doc.descendants(doc.body())
        .into_iter()
        .filter_map(|id| {
            let NodeRef::Text(raw) = doc.node(id)? else {
                return None;
            };
            let text = raw.trim();
            if text.is_empty() {
                return None;
            }

            let owner = doc.parent(id)?;
            Some(TextNode {
                text: text.to_string(),
                tag_name: doc.tag_name(owner).unwrap_or_default(),
                class_name: attribute_or_empty(doc, owner, "class"),
                id: attribute_or_empty(doc, owner, "id"),
            })
        })
        .collect()
}

/// Every radio, checkbox, select and button, indexed from zero.
#[must_use]
pub fn form_elements<D: Document + ?Sized>(doc: &D) -> Vec<FormElement> {
    doc.elements()
        .into_iter()
        .filter_map(|id| control_kind(doc, id).map(|kind| (id, kind)))
        .enumerate()
        .map(|(index, (id, kind))| {
            let value = control_value(doc, id, &kind);
            let content = doc.text_content(id);
            FormElement {
                kind,
                id: attribute_or_empty(doc, id, "id"),
                name: attribute_or_empty(doc, id, "name"),
                text: if content.is_empty() {
                    value.clone()
                } else {
                    content
                },
                value,
                class_name: attribute_or_empty(doc, id, "class"),
                index,
            }
        })
        .collect()
}

// ============================================================================
// Control Helpers
// ============================================================================

/// Returns the control type, or `None` if `id` is not an extracted control.
fn control_kind<D: Document + ?Sized>(doc: &D, id: NodeId) -> Option<String> {
    let NodeRef::Element { tag } = doc.node(id)? else {
        return None;
    };

    match tag {
        "input" => {
            let kind = doc.attribute(id, "type")?.trim().to_ascii_lowercase();
            matches!(kind.as_str(), "radio" | "checkbox").then_some(kind)
        }
        "select" => Some(if doc.attribute(id, "multiple").is_some() {
            "select-multiple".to_string()
        } else {
            "select-one".to_string()
        }),
        "button" => {
            let kind = doc
                .attribute(id, "type")
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| matches!(t.as_str(), "submit" | "reset" | "button"));
            Some(kind.unwrap_or_else(|| "submit".to_string()))
        }
        _ => None,
    }
}

/// Current value of a control.
///
/// Checkable inputs default to `"on"`; a select reports its selected
/// option (or the first one).
fn control_value<D: Document + ?Sized>(doc: &D, id: NodeId, kind: &str) -> String {
    match kind {
        "radio" | "checkbox" => doc.attribute(id, "value").unwrap_or("on").to_string(),
        "select-one" | "select-multiple" => {
            let options: Vec<NodeId> = doc
                .descendants(id)
                .into_iter()
                .filter(|node| matches!(doc.node(*node), Some(NodeRef::Element { tag: "option" })))
                .collect();

            options
                .iter()
                .find(|option| doc.attribute(**option, "selected").is_some())
                .or_else(|| options.first())
                .map(|option| match doc.attribute(*option, "value") {
                    Some(value) => value.to_string(),
                    None => collapse_whitespace(&doc.text_content(*option)),
                })
                .unwrap_or_default()
        }
        _ => attribute_or_empty(doc, id, "value"),
    }
}

fn attribute_or_empty<D: Document + ?Sized>(doc: &D, id: NodeId, name: &str) -> String {
    doc.attribute(id, name).unwrap_or_default().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Tests
// ============================================================================
