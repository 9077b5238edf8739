//! Malvon Suggestions
//!
//! Turns address bar keystrokes into suggestions from three sources:
//! 1. Top searches (local search frequency store)
//! 2. Browsing history
//! 3. A remote suggestion service
//!
//! Keystrokes are debounced; every new query cancels the pending pipeline
//! (timer and remote request). Results arrive per source on a channel,
//! tagged with a generation so stale deliveries can be dropped.

mod aggregator;
mod error;
mod remote;
mod set;

pub use aggregator::{
    HistorySuggestion, SuggestionAggregator, SuggestionEvent, SuggestionSettings,
    SuggestionUpdate, LOCAL_DEBOUNCE, REMOTE_DEBOUNCE,
};
pub use error::SuggestError;
pub use remote::{parse_suggestions, GoogleSuggestions, RemoteSuggestions, GOOGLE_SUGGEST_ENDPOINT};
pub use set::SuggestionSet;

pub type Result<T> = std::result::Result<T, SuggestError>;
