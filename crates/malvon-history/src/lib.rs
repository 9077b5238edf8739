//! Malvon History
//!
//! Two durable counters feed the address bar:
//! - [`HistoryStore`]: one per profile, buffers page visits and flushes them
//!   in batches, deduplicating by address.
//! - [`SearchFrequencyStore`]: shared across profiles, counts submitted search
//!   terms to rank "top searches".

mod error;
mod record;
mod search_frequency;
mod store;

pub use error::HistoryError;
pub use record::HistoryRecord;
pub use search_frequency::{SearchFrequencyStore, TOP_SEARCH_LIMIT, TOP_SEARCH_MIN_OCCURRENCES};
pub use store::{HistoryStore, DEFAULT_BATCH_SIZE, SEARCH_MIN_TIMES_ACCESSED};

pub type Result<T> = std::result::Result<T, HistoryError>;
