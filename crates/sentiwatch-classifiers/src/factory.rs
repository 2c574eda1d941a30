//! Extension point for inference engines.

use crate::scorer::Scorer;
use sentiwatch_core::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Pipeline task requested from an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    SentimentAnalysis,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SentimentAnalysis => "sentiment-analysis",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sentiment-analysis" | "text-classification" => Ok(Self::SentimentAnalysis),
            other => Err(Error::config(format!("Unsupported pipeline task '{}'", other))),
        }
    }
}

/// Pluggable inference engine.
///
/// Implementations own model acquisition (download, tokenizer, weights) and
/// hand back a ready scoring function. The loader only sequences "create, then
/// publish".
#[async_trait::async_trait]
pub trait PipelineFactory: Send + Sync {
    /// Create a scoring pipeline for `task` backed by `model_id`.
    async fn create_pipeline(&self, task: Task, model_id: &str) -> Result<Arc<dyn Scorer>>;

    /// List model ids this engine knows about without fetching anything.
    fn available_models(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_parsing() {
        assert_eq!(
            "sentiment-analysis".parse::<Task>().unwrap(),
            Task::SentimentAnalysis
        );
        assert_eq!(Task::SentimentAnalysis.to_string(), "sentiment-analysis");

        let err = "summarization".parse::<Task>().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
