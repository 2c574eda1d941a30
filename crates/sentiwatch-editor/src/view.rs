//! Observable result list and loading indicator

use sentiwatch_core::{ScoreResult, ViewState};
use std::sync::Arc;
use tokio::sync::watch;

/// Shared slot for what is displayed below the editor.
///
/// Clones write to the same slot; renderers observe it through
/// [`subscribe`](Self::subscribe).
#[derive(Clone)]
pub struct ResultView {
    sender: Arc<watch::Sender<ViewState>>,
}

impl ResultView {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(ViewState::default());
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.sender.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.sender.borrow().clone()
    }

    pub fn results(&self) -> Vec<ScoreResult> {
        self.sender.borrow().results.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.sender.borrow().loading
    }

    /// Drop all displayed results
    pub fn clear_results(&self) {
        self.sender.send_if_modified(|state| {
            if state.results.is_empty() {
                return false;
            }
            state.results.clear();
            true
        });
    }

    /// Replace the displayed results wholesale
    pub fn replace_results(&self, results: Vec<ScoreResult>) {
        self.sender.send_modify(|state| state.results = results);
    }

    pub fn set_loading(&self, loading: bool) {
        self.sender.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }
}

impl Default for ResultView {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResultView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ResultView").field(&*self.sender.borrow()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_never_merges() {
        let view = ResultView::new();
        view.replace_results(vec![
            ScoreResult::new("NEGATIVE", 0.6),
            ScoreResult::new("POSITIVE", 0.4),
        ]);
        view.replace_results(vec![ScoreResult::new("POSITIVE", 0.98)]);

        assert_eq!(view.results(), vec![ScoreResult::new("POSITIVE", 0.98)]);
    }

    #[test]
    fn test_clear_notifies_only_on_change() {
        let view = ResultView::new();
        let mut rx = view.subscribe();

        view.clear_results();
        assert!(!rx.has_changed().unwrap());

        view.replace_results(vec![ScoreResult::new("POSITIVE", 0.9)]);
        let _ = rx.borrow_and_update();

        view.clear_results();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().results.is_empty());
    }

    #[test]
    fn test_loading_flag() {
        let view = ResultView::new();
        assert!(!view.is_loading());

        view.set_loading(true);
        assert!(view.is_loading());
        assert_eq!(view.snapshot().render_lines(), vec!["Analyzing sentiment..."]);

        view.set_loading(false);
        assert!(!view.is_loading());
    }
}
