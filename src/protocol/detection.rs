//! Detection request and result types.
//!
//! These mirror the JSON exchanged with the external detection service.
//! Results are validated on arrival so the rest of the crate can rely on
//! `correct_option` being in range and on the per-mode fields being present.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::snapshot::PageLayout;

// ============================================================================
// DetectionRequest
// ============================================================================

/// Page content forwarded to the detection service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRequest {
    /// Full visible text of the page.
    pub content: String,
    /// Structural layout captured alongside the text.
    pub layout: PageLayout,
    /// URL of the page the snapshot came from.
    pub url: String,
    /// Selects the multi-model endpoint.
    #[serde(rename = "useMultiModel", default)]
    pub use_multi_model: bool,
}

impl DetectionRequest {
    /// Checks that the request is worth sending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `content` is blank or the
    /// layout is not well-formed.
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(Error::invalid_argument("content is empty"));
        }
        self.layout.validate()
    }

    /// Returns the processing mode this request asks for.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ProcessingMode {
        if self.use_multi_model {
            ProcessingMode::Multi
        } else {
            ProcessingMode::Single
        }
    }
}

// ============================================================================
// ProcessingMode
// ============================================================================

/// Which answering pipeline produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// One model, one reasoning/confidence pair per question.
    Single,
    /// Several models, per-model responses and a consensus flag.
    Multi,
}

impl ProcessingMode {
    /// Label shown in the results header.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single Model",
            Self::Multi => "Multi Model",
        }
    }
}

// ============================================================================
// ModelResponse
// ============================================================================

/// One model's answer in multi mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Model name.
    pub model: String,
    /// Chosen option index; negative when the model gave up.
    pub selected_option: i64,
    /// Confidence, 0-100.
    pub confidence: f64,
    /// Free-text reasoning.
    #[serde(default)]
    pub reasoning: String,
}

// ============================================================================
// Question
// ============================================================================

/// One detected question and its answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Question text.
    pub question: String,
    /// Option texts, without letter prefixes.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_option: usize,
    /// Reasoning (single mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Confidence, 0-100 (single mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Per-model answers (multi mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_responses: Option<Vec<ModelResponse>>,
}

/// Mode-specific justification of an answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rationale<'a> {
    /// Single model reasoning.
    Single {
        /// Reasoning text.
        reasoning: &'a str,
        /// Confidence, 0-100.
        confidence: f64,
    },
    /// Multi model responses.
    Multi {
        /// Every model's answer.
        responses: &'a [ModelResponse],
    },
}

impl Question {
    /// Returns the justification for `mode`, if the fields are present.
    #[must_use]
    pub fn rationale(&self, mode: ProcessingMode) -> Option<Rationale<'_>> {
        match mode {
            ProcessingMode::Single => Some(Rationale::Single {
                reasoning: self.reasoning.as_deref()?,
                confidence: self.confidence?,
            }),
            ProcessingMode::Multi => match self.model_responses.as_deref() {
                Some(responses) if !responses.is_empty() => Some(Rationale::Multi { responses }),
                _ => None,
            },
        }
    }

    /// Returns the text of the correct option.
    #[inline]
    #[must_use]
    pub fn correct_text(&self) -> Option<&str> {
        self.options.get(self.correct_option).map(String::as_str)
    }
}

// ============================================================================
// DetectionResult
// ============================================================================

/// Structured answer set for a page's questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Detected questions, page order.
    pub questions: Vec<Question>,
    /// Per-question agreement flag (multi mode).
    #[serde(default)]
    pub consensus: Vec<bool>,
    /// Pipeline that produced the result.
    pub processing_mode: ProcessingMode,
    /// Count reported by the service, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_questions: Option<usize>,
    /// Whether the service answered from its cache.
    #[serde(default)]
    pub cached: bool,
}

impl DetectionResult {
    /// Checks the shape invariants of a result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] when a question has no options,
    /// `correct_option` is out of range, single-mode reasoning/confidence
    /// is missing, multi-mode responses are missing, or `consensus` does
    /// not cover every question in multi mode.
    pub fn validate(&self) -> Result<()> {
        for (index, question) in self.questions.iter().enumerate() {
            if question.options.is_empty() {
                return Err(Error::malformed(format!("question {index} has no options")));
            }

            if question.correct_option >= question.options.len() {
                return Err(Error::malformed(format!(
                    "question {index}: correct_option {} out of range for {} options",
                    question.correct_option,
                    question.options.len()
                )));
            }

            if question.rationale(self.processing_mode).is_none() {
                let missing = match self.processing_mode {
                    ProcessingMode::Single => "reasoning/confidence",
                    ProcessingMode::Multi => "model_responses",
                };
                return Err(Error::malformed(format!("question {index} is missing {missing}")));
            }
        }

        if self.processing_mode == ProcessingMode::Multi
            && self.consensus.len() < self.questions.len()
        {
            return Err(Error::malformed(format!(
                "consensus covers {} of {} questions",
                self.consensus.len(),
                self.questions.len()
            )));
        }

        Ok(())
    }

    /// Returns `true` if the service found no questions.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Returns the consensus flag for question `index` (always `true` in
    /// single mode).
    #[inline]
    #[must_use]
    pub fn consensus_for(&self, index: usize) -> Option<bool> {
        match self.processing_mode {
            ProcessingMode::Single => (index < self.questions.len()).then_some(true),
            ProcessingMode::Multi => self.consensus.get(index).copied(),
        }
    }
}

// ============================================================================
// Option Letters
// ============================================================================

/// Returns the display letter for option `index` (`0 -> 'A'`).
///
/// Returns `None` past `'Z'`.
#[inline]
#[must_use]
pub fn option_letter(index: usize) -> Option<char> {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn single_result() -> DetectionResult {
        serde_json::from_str(
            r#"{
                "questions": [{
                    "question": "What is 2+2?",
                    "options": ["3", "4", "5", "6"],
                    "correct_option": 1,
                    "reasoning": "2+2 equals 4",
                    "confidence": 95
                }],
                "processing_mode": "single"
            }"#,
        )
        .expect("parse")
    }

    #[test]
    fn test_single_result_parses_and_validates() {
        let result = single_result();
        assert_eq!(result.processing_mode, ProcessingMode::Single);
        assert!(result.consensus.is_empty());
        assert!(result.validate().is_ok());
        assert_eq!(result.questions[0].correct_text(), Some("4"));
        assert_eq!(result.consensus_for(0), Some(true));
        assert_eq!(result.consensus_for(1), None);
    }

    #[test]
    fn test_single_rationale() {
        let result = single_result();
        match result.questions[0].rationale(ProcessingMode::Single) {
            Some(Rationale::Single {
                reasoning,
                confidence,
            }) => {
                assert_eq!(reasoning, "2+2 equals 4");
                assert_eq!(confidence, 95.0);
            }
            other => panic!("unexpected rationale: {other:?}"),
        }
    }

    #[test]
    fn test_single_missing_confidence_is_malformed() {
        let mut result = single_result();
        result.questions[0].confidence = None;
        assert!(matches!(
            result.validate(),
            Err(Error::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_out_of_range_correct_option_is_malformed() {
        let mut result = single_result();
        result.questions[0].correct_option = 4;
        assert!(result.validate().is_err());
    }

    #[test]
    fn test_negative_correct_option_fails_to_parse() {
        let parsed = serde_json::from_str::<DetectionResult>(
            r#"{"questions":[{"question":"q","options":["a"],"correct_option":-1,
                "reasoning":"","confidence":0}],"processing_mode":"single"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_multi_result_requires_consensus_per_question() {
        let json = r#"{
            "questions": [{
                "question": "Capital of France?",
                "options": ["Paris", "Rome"],
                "correct_option": 0,
                "model_responses": [
                    {"model": "gpt-4.1", "selected_option": 0, "confidence": 90, "reasoning": "known"},
                    {"model": "gemini-2.5-pro", "selected_option": 0, "confidence": 88, "reasoning": "known"}
                ]
            }],
            "consensus": [],
            "processing_mode": "multi",
            "total_questions": 1,
            "cached": false
        }"#;

        let mut result: DetectionResult = serde_json::from_str(json).expect("parse");
        assert!(result.validate().is_err());

        result.consensus.push(true);
        assert!(result.validate().is_ok());
        assert_eq!(result.consensus_for(0), Some(true));
        assert_eq!(result.total_questions, Some(1));
    }

    #[test]
    fn test_multi_empty_responses_is_malformed() {
        let result = DetectionResult {
            questions: vec![Question {
                question: "q".into(),
                options: vec!["a".into(), "b".into()],
                correct_option: 0,
                reasoning: None,
                confidence: None,
                model_responses: Some(Vec::new()),
            }],
            consensus: vec![false],
            processing_mode: ProcessingMode::Multi,
            total_questions: None,
            cached: false,
        };
        assert!(result.validate().is_err());
    }

    #[test]
    fn test_request_validate() {
        let request = DetectionRequest {
            content: "  \n ".into(),
            layout: PageLayout::default(),
            url: "https://example.com".into(),
            use_multi_model: false,
        };
        assert!(request.validate().is_err());

        let request = DetectionRequest {
            content: "1) What is 2+2?".into(),
            ..request
        };
        assert!(request.validate().is_ok());
        assert_eq!(request.mode(), ProcessingMode::Single);
    }

    #[test]
    fn test_request_serializes_flag_name() {
        let request = DetectionRequest {
            content: "x".into(),
            layout: PageLayout::default(),
            url: "https://example.com".into(),
            use_multi_model: true,
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["useMultiModel"], true);
    }

    #[test]
    fn test_option_letter() {
        assert_eq!(option_letter(0), Some('A'));
        assert_eq!(option_letter(1), Some('B'));
        assert_eq!(option_letter(25), Some('Z'));
        assert_eq!(option_letter(26), None);
        assert_eq!(option_letter(usize::MAX), None);
    }
}
