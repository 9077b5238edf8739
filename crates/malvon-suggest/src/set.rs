//! Address bar suggestion state
//!
//! Folds [`SuggestionEvent`]s into what the address bar shows, dropping
//! anything that belongs to an older query.

use crate::aggregator::{HistorySuggestion, SuggestionEvent, SuggestionUpdate};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionSet {
    generation: u64,
    pub query: String,
    pub top_searches: Vec<String>,
    pub history: Vec<HistorySuggestion>,
    pub remote: Vec<String>,
}

impl SuggestionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply an event. Returns false (and changes nothing) for stale events.
    pub fn apply(&mut self, event: SuggestionEvent) -> bool {
        if event.generation < self.generation {
            tracing::trace!(
                stale = event.generation,
                current = self.generation,
                "Dropping stale suggestion event"
            );
            return false;
        }

        if event.generation > self.generation {
            *self = Self {
                generation: event.generation,
                query: event.query,
                ..Self::default()
            };
        }

        match event.update {
            SuggestionUpdate::Query => {}
            SuggestionUpdate::TopSearches(terms) => self.top_searches = terms,
            SuggestionUpdate::History(websites) => self.history = websites,
            SuggestionUpdate::Remote(suggestions) => self.remote = suggestions,
        }

        true
    }

    pub fn is_empty(&self) -> bool {
        self.top_searches.is_empty() && self.history.is_empty() && self.remote.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(generation: u64, query: &str, update: SuggestionUpdate) -> SuggestionEvent {
        SuggestionEvent {
            generation,
            query: query.to_string(),
            update,
        }
    }

    #[test]
    fn test_sources_fill_in_any_order() {
        let mut set = SuggestionSet::new();

        assert!(set.apply(event(1, "ru", SuggestionUpdate::Query)));
        assert!(set.apply(event(1, "ru", SuggestionUpdate::Remote(vec!["rust".to_string()]))));
        assert!(set.apply(event(1, "ru", SuggestionUpdate::TopSearches(vec!["ruby".to_string()]))));

        assert_eq!(set.query, "ru");
        assert_eq!(set.remote, vec!["rust"]);
        assert_eq!(set.top_searches, vec!["ruby"]);
        assert!(set.history.is_empty());
    }

    #[test]
    fn test_newer_query_resets_results() {
        let mut set = SuggestionSet::new();
        set.apply(event(1, "ru", SuggestionUpdate::Remote(vec!["rust".to_string()])));
        set.apply(event(2, "rus", SuggestionUpdate::Query));

        assert_eq!(set.generation(), 2);
        assert_eq!(set.query, "rus");
        assert!(set.is_empty());
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let mut set = SuggestionSet::new();
        set.apply(event(3, "rust", SuggestionUpdate::Query));

        let stale = event(
            2,
            "rus",
            SuggestionUpdate::History(vec![HistorySuggestion {
                title: "Rust".to_string(),
                address: "https://rust-lang.org".to_string(),
            }]),
        );
        assert!(!set.apply(stale));
        assert!(set.history.is_empty());
        assert_eq!(set.query, "rust");
    }
}
