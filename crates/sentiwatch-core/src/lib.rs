//! sentiwatch Core
//!
//! Types shared across the sentiwatch crates:
//! - Error types and result handling
//! - Score results and the view state rendered below the editor

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ScoreResult, ViewState, LOADING_TEXT};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{ScoreResult, ViewState};
}
