//! Profile error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("Profile name cannot be empty")]
    EmptyName,

    #[error("Invalid profile name: {0}")]
    InvalidName(String),

    #[error("Invalid partition id for profile {name}: {value}")]
    InvalidPartitionId { name: String, value: String },

    #[error("Tab group index {index} out of bounds for {len} groups")]
    TabGroupOutOfBounds { index: usize, len: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] malvon_storage::StorageError),

    #[error("History error: {0}")]
    History(#[from] malvon_history::HistoryError),

    #[error("Tab error: {0}")]
    Tab(#[from] malvon_tabs::TabError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
