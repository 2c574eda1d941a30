//! sentiwatch Editor
//!
//! The editing side of sentiwatch: a text buffer that reports changes, a
//! single-slot debounce timer, the observable result view, and the watcher
//! that turns bursts of edits into one sentiment analysis pass.

pub mod buffer;
pub mod config;
pub mod debounce;
pub mod view;
pub mod watcher;

pub use buffer::{TextBuffer, TextSource};
pub use config::{EditorConfig, StalePolicy, WatcherConfig, DEFAULT_DEBOUNCE_MS};
pub use debounce::{Debouncer, TimerId};
pub use view::ResultView;
pub use watcher::{EditWatcher, WatcherHandle};
