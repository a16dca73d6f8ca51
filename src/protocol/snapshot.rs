//! Page snapshot types.
//!
//! A [`PageSnapshot`] is the structural bundle the page agent captures and
//! the detection service consumes to map free text back to option identity.
//!
//! # Format
//!
//! ```json
//! {
//!   "content": "1) What is 2+2? ...",
//!   "layout": {
//!     "html": "<html>...</html>",
//!     "title": "Quiz",
//!     "url": "https://example.com/quiz",
//!     "textNodes": [{ "text": "...", "tagName": "LI", "className": "", "id": "" }],
//!     "formElements": [{ "type": "radio", "id": "", "name": "q1", "value": "a", "text": "a", "className": "", "index": 0 }]
//!   }
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// PageSnapshot
// ============================================================================

/// Captured text plus structural bundle of a page at one instant.
///
/// Lives for a single round-trip; nothing keeps it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Full visible text of the page body.
    pub content: String,
    /// Structural description of the page.
    pub layout: PageLayout,
}

// ============================================================================
// PageLayout
// ============================================================================

/// Structural part of a [`PageSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    /// Serialized document markup.
    pub html: String,
    /// Document title.
    pub title: String,
    /// Document URL.
    pub url: String,
    /// Non-empty text nodes, document order.
    #[serde(default)]
    pub text_nodes: Vec<TextNode>,
    /// Interactive controls, document order.
    #[serde(default)]
    pub form_elements: Vec<FormElement>,
}

impl PageLayout {
    /// Checks the invariants the extractor guarantees.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a text node is blank or the
    /// form element indices are not `0..n` in order.
    pub fn validate(&self) -> Result<()> {
        if let Some(position) = self
            .text_nodes
            .iter()
            .position(|node| node.text.trim().is_empty())
        {
            return Err(Error::invalid_argument(format!(
                "layout.textNodes[{position}] has empty text"
            )));
        }

        for (expected, element) in self.form_elements.iter().enumerate() {
            if element.index != expected {
                return Err(Error::invalid_argument(format!(
                    "layout.formElements[{expected}] has index {}",
                    element.index
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// TextNode
// ============================================================================

/// One non-empty text-bearing node and its owning element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    /// Trimmed text.
    pub text: String,
    /// Owning element tag, upper case.
    pub tag_name: String,
    /// Owning element `class` attribute.
    pub class_name: String,
    /// Owning element `id` attribute.
    pub id: String,
}

// ============================================================================
// FormElement
// ============================================================================

/// One radio, checkbox, select or button control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormElement {
    /// Control type (`radio`, `checkbox`, `select-one`, `submit`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// `id` attribute.
    pub id: String,
    /// `name` attribute.
    pub name: String,
    /// `value` attribute.
    pub value: String,
    /// Text content, or the value when the control has no text.
    pub text: String,
    /// `class` attribute.
    pub class_name: String,
    /// Zero-based position among controls, stable within the snapshot.
    pub index: usize,
}

// ============================================================================
// Tests
// ============================================================================
