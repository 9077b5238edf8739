//! History record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Row id, `None` until the record has been flushed
    pub id: Option<i64>,
    pub title: String,
    /// Canonical address, unique across persisted records
    pub address: String,
    /// Last access time
    pub timestamp: DateTime<Utc>,
    pub times_accessed: u32,
}

impl HistoryRecord {
    /// A single visit recorded now.
    pub fn new(title: String, address: String) -> Self {
        Self {
            id: None,
            title,
            address,
            timestamp: Utc::now(),
            times_accessed: 1,
        }
    }

    pub fn with_times_accessed(mut self, times_accessed: u32) -> Self {
        self.times_accessed = times_accessed.max(1);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Day bucket stored alongside each row, `YYYY-MM-DD`.
    pub fn date_string(&self) -> String {
        self.timestamp.format("%Y-%m-%d").to_string()
    }

    /// Case-sensitive substring match on title or address.
    pub fn matches(&self, query: &str) -> bool {
        self.title.contains(query) || self.address.contains(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_record() {
        let record = HistoryRecord::new("Rust".to_string(), "https://rust-lang.org".to_string());
        assert_eq!(record.id, None);
        assert_eq!(record.times_accessed, 1);
    }

    #[test]
    fn test_times_accessed_is_positive() {
        let record = HistoryRecord::new(String::new(), "a.com".to_string()).with_times_accessed(0);
        assert_eq!(record.times_accessed, 1);
    }

    #[test]
    fn test_date_string() {
        let at = Utc.with_ymd_and_hms(2024, 12, 25, 23, 59, 0).unwrap();
        let record = HistoryRecord::new(String::new(), "a.com".to_string()).with_timestamp(at);
        assert_eq!(record.date_string(), "2024-12-25");
    }

    #[test]
    fn test_matches_is_case_sensitive() {
        let record = HistoryRecord::new("Example".to_string(), "https://example.com".to_string());
        assert!(record.matches("Exam"));
        assert!(record.matches("example.com"));
        assert!(!record.matches("EXAMPLE"));
    }
}
