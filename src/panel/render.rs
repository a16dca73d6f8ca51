//! Text rendering of the panel views.
//!
//! Views render to plain text, one element per line. [`render_results`] can
//! fail on a result that does not hold its shape; [`render_fallback`] never
//! fails and is what the panel shows instead.

// ============================================================================
// Imports
// ============================================================================

use std::fmt::{self, Write};

use crate::error::{Error, Result};
use crate::protocol::{
    DetectionResult, ModelResponse, ProcessingMode, Question, Rationale, option_letter,
};

use super::state::{PanelState, View};

// ============================================================================
// Constants
// ============================================================================

/// Panel title.
pub const TITLE: &str = "AI Quiz Solver";

/// Heading of the empty results view.
pub const EMPTY_HEADING: &str = "No MCQs Detected";

/// Heading of the fallback view.
pub const FALLBACK_HEADING: &str = "Something went wrong";

/// Label of the fallback view's reload action.
pub const RELOAD_LABEL: &str = "Reload Extension";

const CHECK: char = '\u{2713}';

// ============================================================================
// Dispatch
// ============================================================================

/// Renders the current view of `state`.
///
/// # Errors
///
/// Returns [`Error::Render`] if the held result cannot be displayed.
pub fn render_view(state: &PanelState) -> Result<String> {
    match state.view() {
        View::Main => Ok(render_main(state)),
        View::Results(result) => render_results(result),
    }
}

// ============================================================================
// Main View
// ============================================================================

/// Renders the main view: mode toggle, mode card, detect button.
#[must_use]
pub fn render_main(state: &PanelState) -> String {
    let (single, multi) = if state.multi_model() {
        (' ', 'x')
    } else {
        ('x', ' ')
    };

    let (card, blurb, bullets): (&str, &str, [&str; 3]) = if state.multi_model() {
        (
            "Multi Model Mode",
            "Questions will be processed by multiple AI models for consensus-based answers",
            [
                "Higher accuracy through consensus",
                "Confidence indicators",
                "Model reasoning comparison",
            ],
        )
    } else {
        (
            "Single Model Mode",
            "Questions will be processed by a single AI model for quick answers",
            [
                "Fast processing",
                "Single model reasoning",
                "Efficient for simple MCQs",
            ],
        )
    };

    let button = if state.is_in_flight() {
        "Detecting MCQs..."
    } else {
        "Detect MCQs"
    };

    let mut out = format!(
        "{TITLE}\nDetect and solve MCQs with AI assistance\n\n\
         [{single}] Single Model  [{multi}] Multi Model\n\n{card}\n{blurb}\n"
    );
    for bullet in bullets {
        out.push_str("  - ");
        out.push_str(bullet);
        out.push('\n');
    }
    out.push_str("\n[ ");
    out.push_str(button);
    out.push_str(" ]\n\nMake sure you're on a page with MCQ questions\n");
    out
}

// ============================================================================
// Results View
// ============================================================================

/// Renders a detection result.
///
/// # Errors
///
/// Returns [`Error::Render`] if the result fails validation or has more
/// options than there are letters.
pub fn render_results(result: &DetectionResult) -> Result<String> {
    result
        .validate()
        .map_err(|e| Error::render(format!("cannot display result: {e}")))?;

    if let Some((index, question)) = result
        .questions
        .iter()
        .enumerate()
        .find(|(_, q)| option_letter(q.options.len() - 1).is_none())
    {
        return Err(Error::render(format!(
            "question {index} has {} options",
            question.options.len()
        )));
    }

    let mut out = String::new();
    write_results(&mut out, result).map_err(|e| Error::render(e.to_string()))?;
    Ok(out)
}

fn write_results(out: &mut impl Write, result: &DetectionResult) -> fmt::Result {
    writeln!(out, "\u{2190} Back  Quiz Results  [{}]", result.processing_mode.label())?;

    if result.is_empty() {
        writeln!(out)?;
        writeln!(out, "{EMPTY_HEADING}")?;
        writeln!(out, "No multiple choice questions were found on this page.")?;
        return writeln!(out, "[ Try Another Page ]");
    }

    for (index, question) in result.questions.iter().enumerate() {
        writeln!(out)?;
        write_question(out, result, index, question)?;
    }

    Ok(())
}

fn write_question(
    out: &mut impl Write,
    result: &DetectionResult,
    index: usize,
    question: &Question,
) -> fmt::Result {
    write!(out, "Question {}", index + 1)?;
    if result.processing_mode == ProcessingMode::Multi {
        match result.consensus_for(index) {
            Some(true) => write!(out, "  [Consensus]")?,
            _ => write!(out, "  [No Consensus]")?,
        }
    }
    writeln!(out)?;
    writeln!(out, "{}", question.question)?;

    for (option_index, option) in question.options.iter().enumerate() {
        let letter = option_letter(option_index).unwrap_or('?');
        if option_index == question.correct_option {
            writeln!(out, "  {letter}. {option} {CHECK}")?;
        } else {
            writeln!(out, "  {letter}. {option}")?;
        }
    }

    writeln!(out, "[ Highlight Answer ]  [ Google Search ]")?;

    match question.rationale(result.processing_mode) {
        Some(Rationale::Single {
            reasoning,
            confidence,
        }) => {
            writeln!(out, "AI Reasoning")?;
            writeln!(out, "  {reasoning}")?;
            writeln!(out, "  Confidence: {confidence}%")?;
        }
        Some(Rationale::Multi { responses }) => {
            writeln!(out, "Model Responses")?;
            for response in responses {
                write_model_response(out, response)?;
            }
        }
        None => {}
    }

    Ok(())
}

fn write_model_response(out: &mut impl Write, response: &ModelResponse) -> fmt::Result {
    let answer = usize::try_from(response.selected_option)
        .ok()
        .and_then(option_letter)
        .unwrap_or('-');
    writeln!(
        out,
        "  {}  Answer: {answer}  Confidence: {}%",
        response.model, response.confidence
    )?;
    if !response.reasoning.is_empty() {
        writeln!(out, "    {}", response.reasoning)?;
    }
    Ok(())
}

// ============================================================================
// Fallback View
// ============================================================================

/// Renders the fault view. Infallible.
#[must_use]
pub fn render_fallback(fault: &str) -> String {
    format!(
        "\u{1f6a8} {FALLBACK_HEADING}\n\
         The extension encountered an error. Please check the console for details.\n\n\
         Error Details\n  {fault}\n\n[ {RELOAD_LABEL} ]\n"
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn single_result() -> DetectionResult {
        DetectionResult {
            questions: vec![Question {
                question: "What is 2+2?".into(),
                options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
                correct_option: 1,
                reasoning: Some("2+2 equals 4".into()),
                confidence: Some(95.0),
                model_responses: None,
            }],
            consensus: Vec::new(),
            processing_mode: ProcessingMode::Single,
            total_questions: None,
            cached: false,
        }
    }

    fn multi_result() -> DetectionResult {
        DetectionResult {
            questions: vec![Question {
                question: "Capital of France?".into(),
                options: vec!["Paris".into(), "Rome".into()],
                correct_option: 0,
                reasoning: None,
                confidence: None,
                model_responses: Some(vec![
                    ModelResponse {
                        model: "gpt-4.1".into(),
                        selected_option: 0,
                        confidence: 90.0,
                        reasoning: "known".into(),
                    },
                    ModelResponse {
                        model: "gemini-2.5-pro".into(),
                        selected_option: -1,
                        confidence: 10.0,
                        reasoning: String::new(),
                    },
                ]),
            }],
            consensus: vec![false],
            processing_mode: ProcessingMode::Multi,
            total_questions: Some(1),
            cached: false,
        }
    }

    #[test]
    fn test_main_view_follows_mode_and_flight() {
        let mut state = PanelState::new();
        let page = render_main(&state);
        assert!(page.contains("[x] Single Model"));
        assert!(page.contains("Single Model Mode"));
        assert!(page.contains("[ Detect MCQs ]"));

        state.set_multi_model(true);
        assert!(state.begin_detection());
        let page = render_main(&state);
        assert!(page.contains("[x] Multi Model"));
        assert!(page.contains("Higher accuracy through consensus"));
        assert!(page.contains("Detecting MCQs..."));
    }

    #[test]
    fn test_single_result_marks_correct_option() {
        let page = render_results(&single_result()).expect("render");
        assert!(page.contains("[Single Model]"));
        assert!(page.contains("Question 1"));
        assert!(page.contains("  B. 4 \u{2713}"));
        assert!(page.contains("  A. 3\n"));
        assert!(page.contains("AI Reasoning"));
        assert!(page.contains("Confidence: 95%"));
        assert!(!page.contains("Consensus"));
    }

    #[test]
    fn test_multi_result_shows_models_and_badge() {
        let page = render_results(&multi_result()).expect("render");
        assert!(page.contains("[No Consensus]"));
        assert!(page.contains("Model Responses"));
        assert!(page.contains("gpt-4.1  Answer: A  Confidence: 90%"));
        assert!(page.contains("gemini-2.5-pro  Answer: -"));
    }

    #[test]
    fn test_empty_result() {
        let mut result = single_result();
        result.questions.clear();
        let page = render_results(&result).expect("render");
        assert!(page.contains(EMPTY_HEADING));
        assert!(page.contains("Try Another Page"));
    }

    #[test]
    fn test_invalid_result_is_render_error() {
        let mut result = single_result();
        result.questions[0].correct_option = 9;
        assert!(matches!(
            render_results(&result),
            Err(Error::Render { .. })
        ));

        let mut result = single_result();
        result.questions[0].options = (0..27).map(|i| i.to_string()).collect();
        assert!(render_results(&result).is_err());
    }

    #[test]
    fn test_fallback() {
        let page = render_fallback("boom");
        assert!(page.contains(FALLBACK_HEADING));
        assert!(page.contains("boom"));
        assert!(page.contains(RELOAD_LABEL));
    }
}
