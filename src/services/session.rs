// Detector View Session
// Ephemeral per-view UI bookkeeping: Idle -> Loading -> Success | Failure,
// back to Idle on the next submission. Exactly one of {result, error} is held
// at a time; switching tabs wipes results, errors, and the input buffer.

use crate::models::{AnalysisResult, GrammarResult, PlagiarismResult, RewriteResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorTab {
    Ai,
    Plagiarism,
    Grammar,
    Rewrite,
}

/// Result of whichever feature the active tab ran.
#[derive(Debug, Clone)]
pub enum TabResult {
    Analysis(AnalysisResult),
    Plagiarism(PlagiarismResult),
    Grammar(GrammarResult),
    Rewrite(RewriteResult),
}

#[derive(Debug, Clone)]
pub enum ViewState {
    Idle,
    Loading,
    Success(TabResult),
    Failure(String),
}

pub struct DetectorSession {
    tab: DetectorTab,
    state: ViewState,
    input: String,
}

impl Default for DetectorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorSession {
    pub fn new() -> Self {
        Self {
            tab: DetectorTab::Ai,
            state: ViewState::Idle,
            input: String::new(),
        }
    }

    pub fn tab(&self) -> DetectorTab {
        self.tab
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading)
    }

    pub fn result(&self) -> Option<&TabResult> {
        match &self.state {
            ViewState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ViewState::Failure(message) => Some(message),
            _ => None,
        }
    }

    /// Enter Loading, discarding any previous result or error. Returns false
    /// while a request is already in flight; the caller must not submit again
    /// (this is the whole concurrency discipline of the system).
    pub fn begin_submit(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        self.state = ViewState::Loading;
        true
    }

    pub fn succeed(&mut self, result: TabResult) {
        self.state = ViewState::Success(result);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = ViewState::Failure(message.into());
    }

    /// Switching tabs resets all result/error state and the working input.
    pub fn switch_tab(&mut self, tab: DetectorTab) {
        if tab != self.tab {
            self.tab = tab;
            self.state = ViewState::Idle;
            self.input.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_lifecycle() {
        let mut session = DetectorSession::new();
        assert!(!session.is_loading());
        assert!(session.begin_submit());
        assert!(session.is_loading());

        session.succeed(TabResult::Rewrite(RewriteResult::default()));
        assert!(!session.is_loading());
        assert!(session.result().is_some());
        assert!(session.error().is_none());

        // Next submission returns to a clean Loading state.
        assert!(session.begin_submit());
        assert!(session.result().is_none());
    }

    #[test]
    fn test_failure_restores_actionable_state_with_message() {
        let mut session = DetectorSession::new();
        assert!(session.begin_submit());

        // Gateway reported a server-side failure.
        session.fail("model call failed: HTTP 500: internal error");

        assert!(!session.is_loading());
        let message = session.error().unwrap();
        assert!(!message.is_empty());
        assert!(session.result().is_none());
        // The user can re-trigger the action.
        assert!(session.begin_submit());
    }

    #[test]
    fn test_second_submission_refused_while_loading() {
        let mut session = DetectorSession::new();
        assert!(session.begin_submit());
        assert!(!session.begin_submit());
    }

    #[test]
    fn test_tab_switch_resets_state_and_input() {
        let mut session = DetectorSession::new();
        session.set_input("some draft text");
        session.begin_submit();
        session.fail("model call failed");

        session.switch_tab(DetectorTab::Plagiarism);
        assert_eq!(session.tab(), DetectorTab::Plagiarism);
        assert!(matches!(session.state(), ViewState::Idle));
        assert!(session.input().is_empty());
        assert!(session.error().is_none());
    }

    #[test]
    fn test_switching_to_same_tab_keeps_state() {
        let mut session = DetectorSession::new();
        session.set_input("draft");
        session.switch_tab(DetectorTab::Ai);
        assert_eq!(session.input(), "draft");
    }
}
