//! Scoring function trait

use async_trait::async_trait;
use sentiwatch_core::{Result, ScoreResult};

/// A scoring function supplied by the inference engine.
///
/// Maps input text to label/confidence pairs, in the order the engine ranks
/// them. Calls may fail and may take arbitrarily long; callers must not hold
/// locks across `score`.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Score the given text
    async fn score(&self, text: &str) -> Result<Vec<ScoreResult>>;

    /// Get the scorer name (usually the model id)
    fn name(&self) -> &str;
}
