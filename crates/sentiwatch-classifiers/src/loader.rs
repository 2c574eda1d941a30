//! Asynchronous model loading and the ready-state handle.

use crate::factory::{PipelineFactory, Task};
use crate::model_config::DEFAULT_MODEL_ID;
use crate::scorer::Scorer;
use sentiwatch_core::{Error, Result};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;

/// Write-once slot holding the scoring function once it is ready.
///
/// Cloning shares the slot. The slot moves from "not ready" to "ready"
/// exactly once and is never reset.
#[derive(Clone, Default)]
pub struct LoaderState {
    slot: Arc<OnceLock<Arc<dyn Scorer>>>,
}

impl LoaderState {
    /// A state that never becomes ready unless published to
    pub fn new() -> Self {
        Self::default()
    }

    /// A state that is ready from the start
    pub fn ready(scorer: Arc<dyn Scorer>) -> Self {
        let state = Self::new();
        state.publish(scorer);
        state
    }

    /// Non-blocking readiness check
    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }

    /// The published scoring function, if any
    pub fn scorer(&self) -> Option<Arc<dyn Scorer>> {
        self.slot.get().cloned()
    }

    /// Publish a scorer; returns the one that ended up in the slot.
    fn publish(&self, scorer: Arc<dyn Scorer>) -> Arc<dyn Scorer> {
        Arc::clone(self.slot.get_or_init(|| scorer))
    }
}

impl fmt::Debug for LoaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderState")
            .field("ready", &self.is_ready())
            .field("scorer", &self.slot.get().map(|s| s.name().to_string()))
            .finish()
    }
}

/// Acquires a sentiment pipeline from an engine and publishes it.
pub struct ModelLoader {
    factory: Arc<dyn PipelineFactory>,
    model_id: String,
    state: LoaderState,
}

impl ModelLoader {
    /// Loader for the default sentiment model
    pub fn new(factory: Arc<dyn PipelineFactory>) -> Self {
        Self {
            factory,
            model_id: DEFAULT_MODEL_ID.to_string(),
            state: LoaderState::new(),
        }
    }

    /// Override the model id handed to the engine
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Handle to the state this loader publishes into
    pub fn state(&self) -> LoaderState {
        self.state.clone()
    }

    /// Fetch the pipeline, then publish it.
    ///
    /// On failure the state stays not ready and the error is logged and
    /// returned. Once loaded, further calls return the published scorer
    /// without asking the engine again.
    pub async fn load(&self) -> Result<Arc<dyn Scorer>> {
        if let Some(scorer) = self.state.scorer() {
            return Ok(scorer);
        }

        tracing::info!(model = %self.model_id, "Loading model...");

        match self
            .factory
            .create_pipeline(Task::SentimentAnalysis, &self.model_id)
            .await
        {
            Ok(scorer) => {
                let scorer = self.state.publish(scorer);
                tracing::info!(model = %self.model_id, "Model loaded successfully.");
                Ok(scorer)
            }
            Err(e) => {
                let err = match e {
                    Error::ModelLoad(msg) => Error::ModelLoad(msg),
                    other => Error::model_load(other.to_string()),
                };
                tracing::error!(model = %self.model_id, error = %err, "Error loading the model");
                Err(err)
            }
        }
    }

    /// Run [`load`](Self::load) once in the background and return the state
    /// handle immediately.
    pub fn spawn(self) -> (LoaderState, JoinHandle<()>) {
        let state = self.state();
        let handle = tokio::spawn(async move {
            // Failure is already logged; the state simply stays not ready
            let _ = self.load().await;
        });
        (state, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LexiconScorer;

    #[test]
    fn test_state_publishes_once() {
        let state = LoaderState::new();
        assert!(!state.is_ready());
        assert!(state.scorer().is_none());

        let first: Arc<dyn Scorer> = Arc::new(LexiconScorer::with_name("first").unwrap());
        let second: Arc<dyn Scorer> = Arc::new(LexiconScorer::with_name("second").unwrap());

        assert_eq!(state.publish(first).name(), "first");
        assert_eq!(state.publish(second).name(), "first");

        let shared = state.clone();
        assert!(shared.is_ready());
        assert_eq!(shared.scorer().unwrap().name(), "first");
    }
}
