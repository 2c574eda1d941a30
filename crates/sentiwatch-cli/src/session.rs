//! Interactive terminal session and one-shot analysis

use crate::config::AppConfig;
use sentiwatch_classifiers::ModelLoader;
use sentiwatch_core::ViewState;
use sentiwatch_editor::{EditWatcher, TextBuffer};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

/// One line of terminal input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Append the line as a new paragraph
    Append(String),
    /// Replace the whole document
    Set(String),
    /// Empty the document
    Clear,
    /// Leave the session
    Quit,
}

impl EditCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim_end() {
            ":q" | ":quit" => Self::Quit,
            ":clear" => Self::Clear,
            other => match other.strip_prefix(":set ") {
                Some(text) => Self::Set(text.to_string()),
                None => Self::Append(line.to_string()),
            },
        }
    }

    /// Apply the command to the buffer. Returns false on quit.
    pub fn apply(self, buffer: &TextBuffer) -> bool {
        match self {
            Self::Append(line) => {
                if buffer.is_empty() {
                    buffer.append(&line);
                } else {
                    buffer.append(&format!("\n{}", line));
                }
            }
            Self::Set(text) => buffer.set_text(text),
            Self::Clear => buffer.clear(),
            Self::Quit => return false,
        }
        true
    }
}

/// Run the interactive editor until EOF or `:quit`
pub async fn run_watch(config: AppConfig) -> anyhow::Result<()> {
    let (loader, _load_task) = ModelLoader::new(config.model.factory())
        .with_model_id(config.model.model_ref())
        .spawn();

    let buffer = TextBuffer::new(config.editor.clone());
    let (watcher, watcher_task) =
        EditWatcher::spawn(loader, Arc::new(buffer.clone()), config.watcher.clone());
    watcher.attach(&buffer);

    let renderer = tokio::spawn(render_loop(watcher.subscribe()));

    println!("[{}] {}", buffer.config().theme, buffer.display_text());
    println!("Lines are appended to the document. Commands: :set <text>, :clear, :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !EditCommand::parse(&line).apply(&buffer) {
            break;
        }
    }

    watcher.shutdown();
    watcher_task.await?;
    renderer.abort();
    Ok(())
}

async fn render_loop(mut rx: watch::Receiver<ViewState>) {
    while rx.changed().await.is_ok() {
        let view = rx.borrow_and_update().clone();
        for line in render(&view) {
            println!("{}", line);
        }
    }
}

/// Lines printed for one view update; an empty view prints a separator so
/// cleared results are visible.
pub fn render(view: &ViewState) -> Vec<String> {
    let lines = view.render_lines();
    if lines.is_empty() {
        vec!["--".to_string()]
    } else {
        lines
    }
}

/// Load the model, score `text` once, and print the results
pub async fn run_analyze(config: AppConfig, text: &str) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Nothing to analyze");
    }

    let loader = ModelLoader::new(config.model.factory()).with_model_id(config.model.model_ref());
    let scorer = loader.load().await?;
    let results = scorer.score(text).await?;

    let view = ViewState {
        results,
        loading: false,
    };
    for line in view.render_lines() {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentiwatch_core::ScoreResult;
    use sentiwatch_editor::EditorConfig;

    #[test]
    fn test_parse_commands() {
        assert_eq!(EditCommand::parse(":quit"), EditCommand::Quit);
        assert_eq!(EditCommand::parse(":q  "), EditCommand::Quit);
        assert_eq!(EditCommand::parse(":clear"), EditCommand::Clear);
        assert_eq!(
            EditCommand::parse(":set fresh start"),
            EditCommand::Set("fresh start".to_string())
        );
        assert_eq!(
            EditCommand::parse("just text"),
            EditCommand::Append("just text".to_string())
        );
    }

    #[test]
    fn test_apply_builds_paragraphs() {
        let buffer = TextBuffer::new(EditorConfig::default());

        assert!(EditCommand::Append("first".to_string()).apply(&buffer));
        assert!(EditCommand::Append("second".to_string()).apply(&buffer));
        assert_eq!(buffer.plain_text(), "first\nsecond");

        assert!(EditCommand::Set("over".to_string()).apply(&buffer));
        assert_eq!(buffer.plain_text(), "over");

        assert!(EditCommand::Clear.apply(&buffer));
        assert!(buffer.is_empty());

        assert!(!EditCommand::Quit.apply(&buffer));
    }

    #[test]
    fn test_render_separator_when_empty() {
        assert_eq!(render(&ViewState::default()), vec!["--".to_string()]);

        let view = ViewState {
            results: vec![ScoreResult::new("POSITIVE", 0.98)],
            loading: false,
        };
        assert_eq!(render(&view), vec!["Label: POSITIVE | Score: 0.98".to_string()]);
    }

    #[tokio::test]
    async fn test_analyze_rejects_blank_text() {
        assert!(run_analyze(AppConfig::default(), "   ").await.is_err());
    }
}
