//! Shared result and view types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Text shown while a scoring call is in flight
pub const LOADING_TEXT: &str = "Analyzing sentiment...";

/// One label/confidence pair returned by a scoring function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Category name, vocabulary defined by the model
    pub label: String,

    /// Confidence score (typically 0.0-1.0)
    pub score: f32,
}

impl ScoreResult {
    /// Create a new score result
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

impl fmt::Display for ScoreResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // f32's Display is the shortest round-trip form, so 0.98 stays "0.98"
        write!(f, "Label: {} | Score: {}", self.label, self.score)
    }
}

/// State observed by the rendering layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Results of the most recently applied analysis
    pub results: Vec<ScoreResult>,

    /// Whether a scoring call is currently in flight
    pub loading: bool,
}

impl ViewState {
    /// Render the view as display lines: the loading indicator (if active)
    /// followed by one line per result.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.results.len() + 1);
        if self.loading {
            lines.push(LOADING_TEXT.to_string());
        }
        lines.extend(self.results.iter().map(ToString::to_string));
        lines
    }
}
