//! Malvon Core
//!
//! Coordination layer for the Malvon browser: owns configuration, the
//! profile registry, the shared search frequency store and every open
//! profile, and hands out suggestion aggregators wired to them.

mod browser;
mod config;
mod error;

pub use browser::Browser;
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use malvon_history::{HistoryError, HistoryRecord, HistoryStore, SearchFrequencyStore};
pub use malvon_profile::{Profile, ProfileError, ProfileOptions, ProfileRegistry};
pub use malvon_suggest::{
    GoogleSuggestions, RemoteSuggestions, SuggestError, SuggestionAggregator, SuggestionEvent,
    SuggestionSet, SuggestionSettings, SuggestionUpdate,
};
pub use malvon_tabs::{
    ConfigurationHandle, Renderer, RendererFactory, Tab, TabError, TabGroup, WebConfiguration,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// default `info` filter.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
