//! Model loader tests
//!
//! Exercise load/publish sequencing with mock engines so no model files or
//! network access are needed.

use async_trait::async_trait;
use sentiwatch_classifiers::{
    LexiconFactory, LoaderState, ModelLoader, PipelineFactory, Scorer, Task, DEFAULT_MODEL_ID,
};
use sentiwatch_core::{Error, Result, ScoreResult};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scorer that echoes a fixed result
struct FixedScorer {
    name: String,
}

#[async_trait]
impl Scorer for FixedScorer {
    async fn score(&self, _text: &str) -> Result<Vec<ScoreResult>> {
        Ok(vec![ScoreResult::new("POSITIVE", 0.98)])
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Engine with configurable latency and failure, recording requests
struct MockFactory {
    fail: bool,
    latency: Option<Duration>,
    calls: AtomicU32,
    requested: Mutex<Vec<(Task, String)>>,
}

impl MockFactory {
    fn new() -> Self {
        Self {
            fail: false,
            latency: None,
            calls: AtomicU32::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PipelineFactory for MockFactory {
    async fn create_pipeline(&self, task: Task, model_id: &str) -> Result<Arc<dyn Scorer>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.requested
            .lock()
            .unwrap()
            .push((task, model_id.to_string()));

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.fail {
            return Err(Error::classifier("weights unavailable"));
        }

        Ok(Arc::new(FixedScorer {
            name: model_id.to_string(),
        }))
    }

    fn available_models(&self) -> Vec<String> {
        vec![DEFAULT_MODEL_ID.to_string()]
    }
}

#[tokio::test]
async fn test_load_publishes_scorer() {
    let factory = Arc::new(MockFactory::new());
    let loader = ModelLoader::new(factory.clone());
    let state = loader.state();

    assert!(!state.is_ready());

    let scorer = loader.load().await.unwrap();
    assert_eq!(scorer.name(), DEFAULT_MODEL_ID);
    assert!(state.is_ready());

    let requested = factory.requested.lock().unwrap().clone();
    assert_eq!(
        requested,
        vec![(Task::SentimentAnalysis, DEFAULT_MODEL_ID.to_string())]
    );
}

#[tokio::test]
async fn test_second_load_reuses_published_scorer() {
    let factory = Arc::new(MockFactory::new());
    let loader = ModelLoader::new(factory.clone()).with_model_id("custom/model");

    loader.load().await.unwrap();
    let again = loader.load().await.unwrap();

    assert_eq!(again.name(), "custom/model");
    assert_eq!(factory.call_count(), 1);
}

#[tokio::test]
async fn test_failed_load_stays_not_ready() {
    let factory = Arc::new(MockFactory::failing());
    let loader = ModelLoader::new(factory.clone());
    let state = loader.state();

    let err = loader.load().await.err().unwrap();

    assert!(matches!(err, Error::ModelLoad(_)));
    assert!(err.to_string().contains("weights unavailable"));
    assert!(!state.is_ready());
    assert!(state.scorer().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_spawn_returns_before_ready() {
    let factory = Arc::new(MockFactory::new().with_latency(Duration::from_secs(2)));
    let (state, handle): (LoaderState, _) = ModelLoader::new(factory).spawn();

    assert!(!state.is_ready());

    handle.await.unwrap();
    assert!(state.is_ready());

    let results = state.scorer().unwrap().score("fine").await.unwrap();
    assert_eq!(results, vec![ScoreResult::new("POSITIVE", 0.98)]);
}

#[tokio::test]
async fn test_spawn_failure_is_not_fatal() {
    let (state, handle) = ModelLoader::new(Arc::new(MockFactory::failing())).spawn();

    handle.await.unwrap();
    assert!(!state.is_ready());
}

#[tokio::test]
async fn test_lexicon_engine_end_to_end() {
    let loader = ModelLoader::new(Arc::new(LexiconFactory)).with_model_id("sentiment-lexicon");

    let scorer = loader.load().await.unwrap();
    let results = scorer.score("I hate this, it is the worst").await.unwrap();

    assert_eq!(results, vec![ScoreResult::new("NEGATIVE", 1.0)]);
}
