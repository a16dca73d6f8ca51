//! Answer highlighting.
//!
//! Locates "option `o` of question `q`" on a page with two heuristics and
//! marks it with [`HIGHLIGHT_CLASS`].
//!
//! # Tiers
//!
//! | Tier | Applies when | Marks |
//! |------|--------------|-------|
//! | [`Structural`](HighlightTier::Structural) | page has radios and group `q` has an element `o` | the radio's parent |
//! | [`Textual`](HighlightTier::Textual) | structural found nothing | every body element whose text starts with the option letter |
//!
//! Marks never accumulate: each call clears the previous ones first. The
//! style sheet backing the class is inserted once per page.

// ============================================================================
// Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::identifiers::NodeId;
use crate::protocol::{HighlightReport, HighlightTier, RadioGrouping, option_letter};

use super::document::{Document, NodeRef};

// ============================================================================
// Constants
// ============================================================================

/// Class applied to marked elements.
pub const HIGHLIGHT_CLASS: &str = "ai-quiz-highlight";

/// `id` of the injected style sheet.
pub const STYLE_ID: &str = "ai-quiz-styles";

/// Option text must be strictly longer than this, in characters.
pub const MIN_OPTION_LEN: usize = 2;

/// Option text must be strictly shorter than this, in characters.
pub const MAX_OPTION_LEN: usize = 200;

const HIGHLIGHT_CSS: &str = "
.ai-quiz-highlight {
  background-color: #90EE90 !important;
  border: 2px solid #32CD32 !important;
  box-shadow: 0 0 10px rgba(50, 205, 50, 0.5) !important;
  border-radius: 4px !important;
  padding: 4px !important;
  animation: ai-quiz-pulse 2s infinite;
}
@keyframes ai-quiz-pulse {
  0% { box-shadow: 0 0 10px rgba(50, 205, 50, 0.5); }
  50% { box-shadow: 0 0 20px rgba(50, 205, 50, 0.8); }
  100% { box-shadow: 0 0 10px rgba(50, 205, 50, 0.5); }
}
";

/// `(L)`, or `L` followed by optional whitespace and `.`, `)` or `:`.
static LETTER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\((?P<paren>[A-Z])\)|(?P<bare>[A-Z])\s*[.):])")
        .expect("letter prefix pattern is valid")
});

// ============================================================================
// Located
// ============================================================================

/// Elements chosen by a tier, before marking.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Located {
    tier: HighlightTier,
    mark: Vec<NodeId>,
    scroll_to: NodeId,
}

// ============================================================================
// Highlighter
// ============================================================================

/// Two-tier answer locator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Highlighter {
    grouping: RadioGrouping,
}

impl Highlighter {
    /// Creates a highlighter with the given radio grouping.
    #[inline]
    #[must_use]
    pub const fn new(grouping: RadioGrouping) -> Self {
        Self { grouping }
    }

    /// Returns the radio grouping in use.
    #[inline]
    #[must_use]
    pub const fn grouping(&self) -> RadioGrouping {
        self.grouping
    }

    /// Clears previous marks, then marks option `option_index` of question
    /// `question_index`.
    ///
    /// Never fails: when nothing matches, the page is left with no marks
    /// and an empty report is returned.
    pub fn highlight<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        question_index: usize,
        option_index: usize,
    ) -> HighlightReport {
        clear_marks(doc);
        ensure_style(doc);

        match self.locate(doc, question_index, option_index) {
            Ok(located) => {
                for id in &located.mark {
                    doc.add_class(*id, HIGHLIGHT_CLASS);
                }
                doc.scroll_into_view(located.scroll_to);

                debug!(
                    question_index,
                    option_index,
                    tier = ?located.tier,
                    marked = located.mark.len(),
                    "Answer highlighted"
                );

                HighlightReport {
                    tier: Some(located.tier),
                    marked: located.mark,
                }
            }
            Err(e) => {
                warn!(error = %e, "Highlight found nothing");
                HighlightReport::none()
            }
        }
    }

    /// Runs the tiers in order without touching the page.
    fn locate<D: Document + ?Sized>(
        &self,
        doc: &D,
        question_index: usize,
        option_index: usize,
    ) -> Result<Located> {
        if let Some(located) = self.structural(doc, question_index, option_index) {
            return Ok(located);
        }

        textual(doc, option_index)
            .ok_or_else(|| Error::highlight_not_found(question_index, option_index))
    }

    /// Tier 1: group radios, pick the option, mark its container.
    fn structural<D: Document + ?Sized>(
        &self,
        doc: &D,
        question_index: usize,
        option_index: usize,
    ) -> Option<Located> {
        let radios = radios(doc);
        if radios.is_empty() {
            return None;
        }

        let radio = match self.grouping {
            RadioGrouping::Fixed(size) => *radios
                .chunks(size.get())
                .nth(question_index)?
                .get(option_index)?,
            RadioGrouping::ByName => *runs_by_name(doc, &radios)
                .get(question_index)?
                .get(option_index)?,
        };

        let container = doc.parent(radio).filter(|id| doc.is_element(*id))?;

        Some(Located {
            tier: HighlightTier::Structural,
            mark: vec![container],
            scroll_to: radio,
        })
    }
}

/// Tier 2: every element inside `<body>` whose trimmed text starts with
/// the option letter.
fn textual<D: Document + ?Sized>(doc: &D, option_index: usize) -> Option<Located> {
    let letter = option_letter(option_index)?;

    let mark: Vec<NodeId> = doc
        .descendants(doc.body())
        .into_iter()
        .filter(|id| doc.is_element(*id) && is_option_text(&doc.text_content(*id), letter))
        .collect();

    let scroll_to = *mark.first()?;
    Some(Located {
        tier: HighlightTier::Textual,
        mark,
        scroll_to,
    })
}

// ============================================================================
// Helpers
// ============================================================================

/// Returns `true` if `text` looks like option `letter`.
#[must_use]
pub fn is_option_text(text: &str, letter: char) -> bool {
    let text = text.trim();
    let len = text.chars().count();
    if len <= MIN_OPTION_LEN || len >= MAX_OPTION_LEN {
        return false;
    }

    LETTER_PREFIX
        .captures(text)
        .and_then(|caps| caps.name("paren").or_else(|| caps.name("bare")))
        .is_some_and(|m| m.as_str().starts_with(letter))
}

fn radios<D: Document + ?Sized>(doc: &D) -> Vec<NodeId> {
    doc.elements()
        .into_iter()
        .filter(|id| {
            matches!(doc.node(*id), Some(NodeRef::Element { tag: "input" }))
                && doc
                    .attribute(*id, "type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case("radio"))
        })
        .collect()
}

/// Splits radios into runs of consecutive controls sharing a `name`.
fn runs_by_name<D: Document + ?Sized>(doc: &D, radios: &[NodeId]) -> Vec<Vec<NodeId>> {
    let mut runs: Vec<Vec<NodeId>> = Vec::new();
    let mut current_name: Option<&str> = None;

    for radio in radios {
        let name = doc.attribute(*radio, "name").unwrap_or_default();
        match runs.last_mut() {
            Some(run) if current_name == Some(name) => run.push(*radio),
            _ => {
                runs.push(vec![*radio]);
                current_name = Some(name);
            }
        }
    }

    runs
}

fn clear_marks<D: Document + ?Sized>(doc: &mut D) {
    let marked: Vec<NodeId> = doc
        .elements()
        .into_iter()
        .filter(|id| doc.has_class(*id, HIGHLIGHT_CLASS))
        .collect();

    for id in marked {
        doc.remove_class(id, HIGHLIGHT_CLASS);
    }
}

fn ensure_style<D: Document + ?Sized>(doc: &mut D) {
    if doc.element_by_id(STYLE_ID).is_some() {
        return;
    }

    let style = doc.create_element("style");
    doc.set_attribute(style, "id", STYLE_ID);
    let css = doc.create_text(HIGHLIGHT_CSS);
    doc.append_child(style, css);

    let head = doc.head();
    doc.append_child(head, style);
}

// ============================================================================
// Tests
// ============================================================================
