//! In-memory text buffer with change notifications

use crate::config::EditorConfig;
use parking_lot::{Mutex, RwLock};
use std::ops::Range;
use std::sync::Arc;

type ChangeCallback = Box<dyn Fn() + Send + Sync>;

/// Anything the watcher can read the current plain text from
pub trait TextSource: Send + Sync {
    fn plain_text(&self) -> String;
}

/// Editable document shared between the input side and the watcher.
///
/// Clones share the same document. Every mutation fires the registered
/// text-change callbacks synchronously, after the text has been updated.
#[derive(Clone)]
pub struct TextBuffer {
    inner: Arc<BufferInner>,
}

struct BufferInner {
    config: EditorConfig,
    text: RwLock<String>,
    callbacks: Mutex<Vec<ChangeCallback>>,
}

impl TextBuffer {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            inner: Arc::new(BufferInner {
                config,
                text: RwLock::new(String::new()),
                callbacks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.inner.config
    }

    /// Register a callback fired on every content mutation
    pub fn on_text_change(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.inner.callbacks.lock().push(Box::new(callback));
    }

    /// Replace the whole document
    pub fn set_text(&self, text: impl Into<String>) {
        *self.inner.text.write() = text.into();
        self.notify();
    }

    /// Append at the end of the document
    pub fn append(&self, text: &str) {
        self.inner.text.write().push_str(text);
        self.notify();
    }

    /// Insert at a character index (clamped to the document length)
    pub fn insert(&self, char_idx: usize, text: &str) {
        {
            let mut doc = self.inner.text.write();
            let at = byte_offset(&doc, char_idx);
            doc.insert_str(at, text);
        }
        self.notify();
    }

    /// Delete a character range (clamped to the document length)
    pub fn delete(&self, range: Range<usize>) {
        {
            let mut doc = self.inner.text.write();
            let start = byte_offset(&doc, range.start);
            let end = byte_offset(&doc, range.end.max(range.start));
            doc.replace_range(start..end, "");
        }
        self.notify();
    }

    pub fn clear(&self) {
        self.set_text(String::new());
    }

    /// Number of characters in the document
    pub fn len_chars(&self) -> usize {
        self.inner.text.read().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.text.read().is_empty()
    }

    /// Plain-text snapshot of the document
    pub fn plain_text(&self) -> String {
        self.inner.text.read().clone()
    }

    /// What a renderer should show for the editor body
    pub fn display_text(&self) -> String {
        let doc = self.inner.text.read();
        if doc.is_empty() {
            self.inner.config.placeholder.clone()
        } else {
            doc.clone()
        }
    }

    fn notify(&self) {
        let callbacks = self.inner.callbacks.lock();
        for callback in callbacks.iter() {
            callback();
        }
    }
}

impl TextSource for TextBuffer {
    fn plain_text(&self) -> String {
        TextBuffer::plain_text(self)
    }
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field("config", &self.inner.config)
            .field("len_chars", &self.len_chars())
            .finish()
    }
}

fn byte_offset(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}
