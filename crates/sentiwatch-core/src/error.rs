//! Error types for sentiwatch

/// Result type alias using sentiwatch's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sentiwatch operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The inference engine rejected or failed while acquiring a model
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// Scoring was requested before the model finished loading
    #[error("pipeline not loaded")]
    NotReady,

    /// The inference engine rejected or failed during a scoring call
    #[error("scoring error: {0}")]
    Scoring(String),

    /// Tokenizer, tensor, or weight-level failures inside a classifier
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new model load error
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create a new scoring error
    pub fn scoring(msg: impl Into<String>) -> Self {
        Self::Scoring(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::NotReady.to_string(), "pipeline not loaded");
        assert_eq!(
            Error::model_load("offline").to_string(),
            "model load error: offline"
        );
        assert_eq!(Error::scoring("boom").to_string(), "scoring error: boom");
    }
}
