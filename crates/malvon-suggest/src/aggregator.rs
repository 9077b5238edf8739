//! Suggestion aggregator
//!
//! ```text
//! Idle
//!   ↓ keystroke
//! Pending(query)  ── keystroke ──→ Pending(new query)   (previous pipeline aborted)
//!   ↓ local debounce elapsed
//! Dispatching: top searches + history (blocking workers)
//!   ↓ remote debounce − local debounce
//! Remote fetch
//! ```

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use malvon_history::{
    HistoryStore, SearchFrequencyStore, TOP_SEARCH_LIMIT, TOP_SEARCH_MIN_OCCURRENCES,
};

use crate::remote::RemoteSuggestions;
use crate::Result;

pub const LOCAL_DEBOUNCE: Duration = Duration::from_millis(150);
pub const REMOTE_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy)]
pub struct SuggestionSettings {
    /// Quiet period before the local stores are queried
    pub local_debounce: Duration,
    /// Quiet period before the remote service is queried, measured from
    /// the keystroke
    pub remote_debounce: Duration,
    pub top_search_limit: usize,
    pub top_search_min_occurrences: u32,
}

impl SuggestionSettings {
    /// Extra wait after the local lookups were dispatched.
    pub fn remote_delay(&self) -> Duration {
        self.remote_debounce.saturating_sub(self.local_debounce)
    }
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            local_debounce: LOCAL_DEBOUNCE,
            remote_debounce: REMOTE_DEBOUNCE,
            top_search_limit: TOP_SEARCH_LIMIT,
            top_search_min_occurrences: TOP_SEARCH_MIN_OCCURRENCES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySuggestion {
    pub title: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionUpdate {
    /// Raw query echo, sent before any source result
    Query,
    TopSearches(Vec<String>),
    History(Vec<HistorySuggestion>),
    Remote(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionEvent {
    /// Incremented on every [`SuggestionAggregator::update`]
    pub generation: u64,
    pub query: String,
    pub update: SuggestionUpdate,
}

/// One per address bar session. Creating one outside a Tokio runtime fails
/// with [`crate::SuggestError::NoRuntime`].
pub struct SuggestionAggregator {
    history: Option<HistoryStore>,
    searches: Option<SearchFrequencyStore>,
    remote: Arc<dyn RemoteSuggestions>,
    settings: SuggestionSettings,
    generation: AtomicU64,
    pending: Mutex<Option<JoinHandle<()>>>,
    events: mpsc::UnboundedSender<SuggestionEvent>,
    runtime: tokio::runtime::Handle,
}

impl SuggestionAggregator {
    pub fn new(
        remote: Arc<dyn RemoteSuggestions>,
        settings: SuggestionSettings,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SuggestionEvent>)> {
        let runtime = tokio::runtime::Handle::try_current()?;
        let (events, receiver) = mpsc::unbounded_channel();

        let aggregator = Self {
            history: None,
            searches: None,
            remote,
            settings,
            generation: AtomicU64::new(0),
            pending: Mutex::new(None),
            events,
            runtime,
        };

        Ok((aggregator, receiver))
    }

    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_search_frequency(mut self, searches: SearchFrequencyStore) -> Self {
        self.searches = Some(searches);
        self
    }

    pub fn settings(&self) -> &SuggestionSettings {
        &self.settings
    }

    /// Handle a keystroke. Echoes `query` immediately, cancels the previous
    /// pipeline and schedules a new one. Returns the new generation.
    pub fn update(&self, query: &str) -> u64 {
        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let _ = self.events.send(SuggestionEvent {
            generation,
            query: query.to_string(),
            update: SuggestionUpdate::Query,
        });

        let pipeline = Pipeline {
            generation,
            query: query.to_string(),
            history: self.history.clone(),
            searches: self.searches.clone(),
            remote: Arc::clone(&self.remote),
            settings: self.settings,
            events: self.events.clone(),
        };
        *pending = Some(self.runtime.spawn(pipeline.run()));

        tracing::trace!(generation, query = %query, "Scheduled suggestion pipeline");
        generation
    }

    /// Abort the pending pipeline, if any. Safe to call repeatedly.
    pub fn cancel(&self) {
        if let Some(previous) = self.pending.lock().take() {
            previous.abort();
        }
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// False when a newer [`update`](Self::update) superseded the event.
    pub fn is_current(&self, event: &SuggestionEvent) -> bool {
        event.generation == self.current_generation()
    }
}

impl Drop for SuggestionAggregator {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct Pipeline {
    generation: u64,
    query: String,
    history: Option<HistoryStore>,
    searches: Option<SearchFrequencyStore>,
    remote: Arc<dyn RemoteSuggestions>,
    settings: SuggestionSettings,
    events: mpsc::UnboundedSender<SuggestionEvent>,
}

impl Pipeline {
    async fn run(self) {
        tokio::time::sleep(self.settings.local_debounce).await;

        self.dispatch_top_searches();
        self.dispatch_history();

        tokio::time::sleep(self.settings.remote_delay()).await;

        let suggestions = self.remote.fetch(&self.query).await;
        self.send(SuggestionUpdate::Remote(suggestions));
    }

    // Local lookups are detached: aborting the pipeline does not stop them,
    // consumers drop their results by generation.
    fn dispatch_top_searches(&self) {
        let Some(searches) = self.searches.clone() else {
            self.send(SuggestionUpdate::TopSearches(Vec::new()));
            return;
        };

        let events = self.events.clone();
        let generation = self.generation;
        let query = self.query.clone();
        let limit = self.settings.top_search_limit;
        let min_occurrences = self.settings.top_search_min_occurrences;

        tokio::task::spawn_blocking(move || {
            let terms = searches
                .relevant_suggestions(&query, limit, min_occurrences)
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Top search lookup failed");
                    Vec::new()
                });

            let _ = events.send(SuggestionEvent {
                generation,
                query,
                update: SuggestionUpdate::TopSearches(terms),
            });
        });
    }

    fn dispatch_history(&self) {
        let Some(history) = self.history.clone() else {
            self.send(SuggestionUpdate::History(Vec::new()));
            return;
        };

        let events = self.events.clone();
        let generation = self.generation;
        let query = self.query.clone();

        tokio::task::spawn_blocking(move || {
            let websites = history
                .search(&query)
                .into_iter()
                .map(|record| HistorySuggestion {
                    title: record.title,
                    address: record.address,
                })
                .collect();

            let _ = events.send(SuggestionEvent {
                generation,
                query,
                update: SuggestionUpdate::History(websites),
            });
        });
    }

    fn send(&self, update: SuggestionUpdate) {
        let _ = self.events.send(SuggestionEvent {
            generation: self.generation,
            query: self.query.clone(),
            update,
        });
    }
}
