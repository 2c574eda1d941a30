//! Debounced analyze-on-edit watcher
//!
//! Edits clear the displayed results immediately and (re)arm a debounce
//! timer. When the timer fires without a newer edit, the current text is
//! scored and the results replace whatever is displayed.
//!
//! A single task owns the timer and the in-flight scoring calls; the
//! [`WatcherHandle`] only sends it messages. Scoring calls are never
//! cancelled once started, so several may overlap; [`StalePolicy`] decides
//! whether a late resolution for outdated text is still displayed.

use crate::buffer::{TextBuffer, TextSource};
use crate::config::{StalePolicy, WatcherConfig};
use crate::debounce::Debouncer;
use crate::view::ResultView;
use sentiwatch_classifiers::LoaderState;
use sentiwatch_core::{Error, Result, ScoreResult, ViewState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};

#[derive(Debug)]
enum WatcherMessage {
    ContentChanged { generation: u64 },
    AnalyzeNow,
    Shutdown,
}

/// Result of one scoring call, tagged with the edit generation it scored
struct ScoringOutcome {
    generation: u64,
    result: Result<Vec<ScoreResult>>,
}

/// Cheap, cloneable front end to a running watcher
#[derive(Clone)]
pub struct WatcherHandle {
    tx: mpsc::UnboundedSender<WatcherMessage>,
    view: ResultView,
    generation: Arc<AtomicU64>,
}

impl WatcherHandle {
    /// Notify the watcher that the editor content changed.
    ///
    /// Clears the displayed results before returning, then re-arms the
    /// debounce timer.
    pub fn content_changed(&self) {
        self.view.clear_results();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.send(WatcherMessage::ContentChanged { generation });
    }

    /// Run an analysis pass now, bypassing the debounce timer
    pub fn analyze_now(&self) {
        self.send(WatcherMessage::AnalyzeNow);
    }

    /// Subscribe `buffer`'s text-change notifications to this watcher
    pub fn attach(&self, buffer: &TextBuffer) {
        let handle = self.clone();
        buffer.on_text_change(move || handle.content_changed());
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.subscribe()
    }

    pub fn view(&self) -> ViewState {
        self.view.snapshot()
    }

    /// Stop the watcher; in-flight scoring calls are aborted
    pub fn shutdown(&self) {
        self.send(WatcherMessage::Shutdown);
    }

    fn send(&self, message: WatcherMessage) {
        if let Err(e) = self.tx.send(message) {
            tracing::debug!(message = ?e.0, "Watcher stopped, dropping message");
        }
    }
}

/// The consumer task behind a [`WatcherHandle`]
pub struct EditWatcher {
    rx: mpsc::UnboundedReceiver<WatcherMessage>,
    loader: LoaderState,
    source: Arc<dyn TextSource>,
    view: ResultView,
    config: WatcherConfig,
    debouncer: Debouncer,
    in_flight: JoinSet<ScoringOutcome>,
    generation: Arc<AtomicU64>,
}

impl EditWatcher {
    /// Start a watcher reading text from `source` and scoring with whatever
    /// `loader` has published at the time each analysis runs.
    pub fn spawn(
        loader: LoaderState,
        source: Arc<dyn TextSource>,
        config: WatcherConfig,
    ) -> (WatcherHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let view = ResultView::new();
        let generation = Arc::new(AtomicU64::new(0));

        let watcher = Self {
            rx,
            loader,
            source,
            view: view.clone(),
            debouncer: Debouncer::new(config.debounce()),
            config,
            in_flight: JoinSet::new(),
            generation: generation.clone(),
        };

        let task = tokio::spawn(watcher.run());
        let handle = WatcherHandle {
            tx,
            view,
            generation,
        };
        (handle, task)
    }

    async fn run(mut self) {
        tracing::debug!(
            debounce_ms = self.config.debounce_ms,
            stale_policy = ?self.config.stale_policy,
            "Edit watcher started"
        );

        loop {
            tokio::select! {
                message = self.rx.recv() => match message {
                    Some(WatcherMessage::ContentChanged { generation }) => {
                        let timer = self.debouncer.arm();
                        tracing::trace!(generation, %timer, "Content changed");
                    }
                    Some(WatcherMessage::AnalyzeNow) => self.analyze(),
                    Some(WatcherMessage::Shutdown) | None => break,
                },
                timer = self.debouncer.fired() => {
                    tracing::trace!(%timer, "Debounce timer fired");
                    self.analyze();
                }
                Some(joined) = self.in_flight.join_next() => self.apply(joined),
            }
        }

        self.in_flight.abort_all();
        self.view.set_loading(false);
        tracing::debug!("Edit watcher stopped");
    }

    fn analyze(&mut self) {
        let text = self.source.plain_text();
        if text.trim().is_empty() {
            tracing::trace!("Content is empty, skipping analysis");
            return;
        }

        let Some(scorer) = self.loader.scorer() else {
            tracing::error!(error = %Error::NotReady, "Dropping analysis request");
            metrics::counter!("sentiwatch_scoring_dropped_total").increment(1);
            return;
        };

        let generation = self.generation.load(Ordering::SeqCst);
        metrics::counter!("sentiwatch_scoring_calls_total").increment(1);
        tracing::debug!(generation, chars = text.chars().count(), scorer = scorer.name(), "Scoring content");

        self.view.set_loading(true);
        self.in_flight.spawn(async move {
            let result = scorer.score(&text).await;
            ScoringOutcome { generation, result }
        });
    }

    fn apply(&mut self, joined: std::result::Result<ScoringOutcome, JoinError>) {
        match joined {
            Ok(ScoringOutcome {
                generation,
                result: Ok(results),
            }) => {
                let latest = self.generation.load(Ordering::SeqCst);
                if self.config.stale_policy == StalePolicy::DiscardStale && generation < latest {
                    tracing::debug!(generation, latest, "Discarding stale scoring result");
                    metrics::counter!("sentiwatch_stale_discarded_total").increment(1);
                } else {
                    tracing::debug!(generation, ?results, "Scoring finished");
                    self.view.replace_results(results);
                }
            }
            Ok(ScoringOutcome {
                generation,
                result: Err(e),
            }) => {
                tracing::error!(generation, error = %e, "Error analyzing sentiment");
                metrics::counter!("sentiwatch_scoring_failures_total").increment(1);
            }
            Err(e) => {
                tracing::error!(error = %e, "Scoring task did not complete");
                metrics::counter!("sentiwatch_scoring_failures_total").increment(1);
            }
        }

        self.view.set_loading(!self.in_flight.is_empty());
    }
}
