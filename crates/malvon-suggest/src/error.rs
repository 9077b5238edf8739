//! Suggestion error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SuggestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid suggestion endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("No Tokio runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}
