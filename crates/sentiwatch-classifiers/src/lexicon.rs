//! Lexicon-based sentiment scorer
//!
//! Offline fallback used when no neural model is wanted (demos, air-gapped
//! machines, tests). Counts positive and negative keyword hits.

use crate::factory::{PipelineFactory, Task};
use crate::scorer::Scorer;
use aho_corasick::AhoCorasick;
use sentiwatch_core::{Result, ScoreResult};
use std::sync::Arc;

/// Model id the lexicon engine answers to
pub const LEXICON_MODEL_ID: &str = "sentiment-lexicon";

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "love",
    "amazing",
    "wonderful",
    "happy",
    "fantastic",
    "awesome",
    "best",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "hate",
    "horrible",
    "worst",
    "sad",
    "angry",
    "disappointed",
    "poor",
];

pub struct LexiconScorer {
    name: String,
    positive: AhoCorasick,
    negative: AhoCorasick,
}

impl LexiconScorer {
    pub fn new() -> Result<Self> {
        Self::with_name(LEXICON_MODEL_ID)
    }

    pub fn with_name(name: impl Into<String>) -> Result<Self> {
        let positive = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(POSITIVE_WORDS)
            .map_err(|e| {
                sentiwatch_core::Error::classifier(format!(
                    "Failed to build positive sentiment matcher: {e}"
                ))
            })?;

        let negative = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(NEGATIVE_WORDS)
            .map_err(|e| {
                sentiwatch_core::Error::classifier(format!(
                    "Failed to build negative sentiment matcher: {e}"
                ))
            })?;

        Ok(Self {
            name: name.into(),
            positive,
            negative,
        })
    }
}

#[async_trait::async_trait]
impl Scorer for LexiconScorer {
    async fn score(&self, text: &str) -> Result<Vec<ScoreResult>> {
        let positive_hits = self.positive.find_iter(text).count() as f32;
        let negative_hits = self.negative.find_iter(text).count() as f32;
        let total = positive_hits + negative_hits;

        let positive = if total == 0.0 {
            0.5
        } else {
            positive_hits / total
        };

        let result = if positive >= 0.5 {
            ScoreResult::new("POSITIVE", positive)
        } else {
            ScoreResult::new("NEGATIVE", 1.0 - positive)
        };

        Ok(vec![result])
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Engine that hands out [`LexiconScorer`]s without touching the network
#[derive(Debug, Default, Clone)]
pub struct LexiconFactory;

#[async_trait::async_trait]
impl PipelineFactory for LexiconFactory {
    async fn create_pipeline(&self, task: Task, model_id: &str) -> Result<Arc<dyn Scorer>> {
        tracing::debug!(%task, model = %model_id, "Building lexicon scorer");
        let scorer = LexiconScorer::with_name(model_id)?;
        Ok(Arc::new(scorer))
    }

    fn available_models(&self) -> Vec<String> {
        vec![LEXICON_MODEL_ID.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_positive_text() {
        let scorer = LexiconScorer::new().unwrap();
        let results = scorer.score("What a GREAT and wonderful day").await.unwrap();

        assert_eq!(results, vec![ScoreResult::new("POSITIVE", 1.0)]);
    }

    #[tokio::test]
    async fn test_mixed_text_leans_negative() {
        let scorer = LexiconScorer::new().unwrap();
        let results = scorer
            .score("good start, but terrible ending and awful acting")
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, "NEGATIVE");
        assert!((results[0].score - 2.0 / 3.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_no_hits_is_neutral_positive() {
        let scorer = LexiconScorer::new().unwrap();
        let results = scorer.score("the cat sat on the mat").await.unwrap();

        assert_eq!(results, vec![ScoreResult::new("POSITIVE", 0.5)]);
    }

    #[tokio::test]
    async fn test_factory_uses_model_id_as_name() {
        let scorer = LexiconFactory
            .create_pipeline(Task::SentimentAnalysis, "custom-lexicon")
            .await
            .unwrap();

        assert_eq!(scorer.name(), "custom-lexicon");
    }
}
