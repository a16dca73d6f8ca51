//! Panel state machine.
//!
//! Two views: [`View::Main`] and [`View::Results`]. Main moves to Results
//! only when a detection succeeds; Results moves back only on an explicit
//! `back`, which drops the held result. The in-flight flag is not a view.

// ============================================================================
// Imports
// ============================================================================

use crate::protocol::DetectionResult;

// ============================================================================
// View
// ============================================================================

/// What the panel is showing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum View {
    /// Awaiting a detect command.
    #[default]
    Main,
    /// Showing a detection result.
    Results(DetectionResult),
}

impl View {
    /// Returns `true` for [`View::Main`].
    #[inline]
    #[must_use]
    pub fn is_main(&self) -> bool {
        matches!(self, Self::Main)
    }

    /// Returns the held result in [`View::Results`].
    #[inline]
    #[must_use]
    pub fn result(&self) -> Option<&DetectionResult> {
        match self {
            Self::Results(result) => Some(result),
            Self::Main => None,
        }
    }
}

// ============================================================================
// PanelState
// ============================================================================

/// Mutable UI state of one panel instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    view: View,
    in_flight: bool,
    multi_model: bool,
    closed: bool,
    fault: Option<String>,
}

impl PanelState {
    /// Fresh state: main view, single-model mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current view.
    #[inline]
    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Whether a detection is pending.
    #[inline]
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Whether multi-model mode is selected.
    #[inline]
    #[must_use]
    pub fn multi_model(&self) -> bool {
        self.multi_model
    }

    /// Whether the panel was closed.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Rendering fault being shown, if any.
    #[inline]
    #[must_use]
    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    /// Selects single or multi mode.
    pub fn set_multi_model(&mut self, multi_model: bool) {
        self.multi_model = multi_model;
    }

    /// Claims the in-flight slot. Returns `false` if a detection may not
    /// start now (already pending, showing results, or closed).
    pub fn begin_detection(&mut self) -> bool {
        if self.in_flight || self.closed || !self.view.is_main() {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Releases the in-flight slot.
    pub fn end_detection(&mut self) {
        self.in_flight = false;
    }

    /// Main → Results. Ignored outside the main view.
    pub fn show_results(&mut self, result: DetectionResult) -> bool {
        if !self.view.is_main() {
            return false;
        }
        self.view = View::Results(result);
        true
    }

    /// Results → Main, dropping the held result. Ignored on the main view.
    pub fn back(&mut self) -> bool {
        if self.view.is_main() {
            return false;
        }
        self.view = View::Main;
        true
    }

    /// Marks the panel closed. Later responses are discarded.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Records a rendering fault.
    pub fn set_fault(&mut self, fault: impl Into<String>) {
        self.fault = Some(fault.into());
    }

    /// Reload: back to a fresh main view.
    ///
    /// The closed flag and a pending detection survive.
    pub fn reset(&mut self) {
        *self = Self {
            in_flight: self.in_flight,
            closed: self.closed,
            ..Self::default()
        };
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ProcessingMode;

    fn empty_result() -> DetectionResult {
        DetectionResult {
            questions: Vec::new(),
            consensus: Vec::new(),
            processing_mode: ProcessingMode::Single,
            total_questions: None,
            cached: false,
        }
    }

    #[test]
    fn test_main_to_results_and_back() {
        let mut state = PanelState::new();
        assert!(state.view().is_main());
        assert!(!state.back());

        assert!(state.show_results(empty_result()));
        assert!(state.view().result().is_some());
        assert!(!state.show_results(empty_result()));

        assert!(state.back());
        assert_eq!(state.view(), &View::Main);
    }

    #[test]
    fn test_in_flight_blocks_reentry() {
        let mut state = PanelState::new();
        assert!(state.begin_detection());
        assert!(!state.begin_detection());
        state.end_detection();
        assert!(state.begin_detection());
    }

    #[test]
    fn test_no_detection_from_results_or_closed() {
        let mut state = PanelState::new();
        state.show_results(empty_result());
        assert!(!state.begin_detection());

        let mut state = PanelState::new();
        state.close();
        assert!(!state.begin_detection());
    }

    #[test]
    fn test_reset_keeps_closed() {
        let mut state = PanelState::new();
        state.set_multi_model(true);
        state.set_fault("boom");
        state.show_results(empty_result());
        state.close();

        state.reset();

        assert!(state.view().is_main());
        assert!(state.fault().is_none());
        assert!(!state.multi_model());
        assert!(state.is_closed());
    }

    #[test]
    fn test_reset_keeps_pending_detection() {
        let mut state = PanelState::new();
        assert!(state.begin_detection());

        state.reset();

        assert!(state.is_in_flight());
        assert!(!state.begin_detection());
        state.end_detection();
        assert!(state.begin_detection());
    }
}
