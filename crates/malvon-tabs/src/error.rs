//! Tab error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Tab index {index} out of bounds ({len} tabs)")]
    IndexOutOfBounds { index: usize, len: usize },
}
