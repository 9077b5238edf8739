//! History error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Storage error: {0}")]
    Storage(#[from] malvon_storage::StorageError),

    #[error("History store has no backing database")]
    Unavailable,
}
