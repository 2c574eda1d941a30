//! sentiwatch Classifiers
//!
//! Sentiment scoring functions and the loader that acquires them:
//! - `Scorer`: the scoring function contract (text in, label/score pairs out)
//! - `PipelineFactory`: the inference engine contract
//! - Candle DistilBERT engine (Hugging Face Hub or local checkpoints)
//! - Lexicon engine for offline use
//! - `ModelLoader` / `LoaderState`: load once, publish, check readiness

pub mod distilbert;
pub mod factory;
pub mod lexicon;
pub mod loader;
pub mod model_config;
pub mod scorer;

pub use distilbert::{CandleFactory, DistilBertScorer};
pub use factory::{PipelineFactory, Task};
pub use lexicon::{LexiconFactory, LexiconScorer, LEXICON_MODEL_ID};
pub use loader::{LoaderState, ModelLoader};
pub use model_config::{ModelSpec, SourceKind, DEFAULT_MODEL_ID};
pub use scorer::Scorer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::factory::{PipelineFactory, Task};
    pub use crate::loader::{LoaderState, ModelLoader};
    pub use crate::model_config::ModelSpec;
    pub use crate::scorer::Scorer;
}
