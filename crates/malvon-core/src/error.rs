//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Profile error: {0}")]
    Profile(#[from] malvon_profile::ProfileError),

    #[error("History error: {0}")]
    History(#[from] malvon_history::HistoryError),

    #[error("Suggestion error: {0}")]
    Suggest(#[from] malvon_suggest::SuggestError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
