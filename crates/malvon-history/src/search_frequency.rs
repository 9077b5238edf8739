//! Search term frequency
//!
//! Counts how often each literal search term is submitted so the address
//! bar can offer "top searches".

use rusqlite::OptionalExtension;
use std::path::Path;

use malvon_storage::{Database, Migration};

use crate::Result;

/// A term needs at least this many submissions to be suggested.
pub const TOP_SEARCH_MIN_OCCURRENCES: u32 = 3;
pub const TOP_SEARCH_LIMIT: usize = 4;

const MIGRATIONS: &[Migration] = &[Migration::new(
    1,
    "Search occurrences table",
    r#"
    CREATE TABLE IF NOT EXISTS SearchOccurrences (
        url TEXT PRIMARY KEY,
        occurrences INTEGER NOT NULL DEFAULT 1
    );
"#,
)];

pub struct SearchFrequencyStore {
    db: Database,
}

impl SearchFrequencyStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Database::open(path.as_ref(), MIGRATIONS)?;
        tracing::info!(path = %path.as_ref().display(), "Opened search frequency store");
        Ok(Self { db })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: Database::open_in_memory(MIGRATIONS)?,
        })
    }

    /// Record one submission of `term`.
    pub fn increment_occurrence(&self, term: &str) -> Result<()> {
        self.db.transaction(|tx| {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT occurrences FROM SearchOccurrences WHERE url = ?1",
                    [term],
                    |row| row.get(0),
                )
                .optional()?;

            if existing.is_some() {
                tx.execute(
                    "UPDATE SearchOccurrences SET occurrences = occurrences + 1 WHERE url = ?1",
                    [term],
                )?;
            } else {
                tx.execute(
                    "INSERT INTO SearchOccurrences (url, occurrences) VALUES (?1, 1)",
                    [term],
                )?;
            }

            Ok(())
        })?;

        tracing::trace!(term = %term, "Recorded search");
        Ok(())
    }

    /// Terms starting with `prefix` (case-sensitive) that were submitted at
    /// least `min_occurrences` times, most frequent first.
    pub fn relevant_suggestions(
        &self,
        prefix: &str,
        limit: usize,
        min_occurrences: u32,
    ) -> Result<Vec<String>> {
        Ok(self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT url FROM SearchOccurrences
                 WHERE substr(url, 1, length(?1)) = ?1 AND occurrences >= ?2
                 ORDER BY occurrences DESC
                 LIMIT ?3",
            )?;

            let terms: Vec<String> = stmt
                .query_map(
                    rusqlite::params![prefix, i64::from(min_occurrences), limit as i64],
                    |row| row.get(0),
                )?
                .filter_map(|r| r.ok())
                .collect();

            Ok(terms)
        })?)
    }

    pub fn occurrences(&self, term: &str) -> Result<u32> {
        Ok(self.db.with_connection(|conn| {
            let count: Option<i64> = conn
                .query_row(
                    "SELECT occurrences FROM SearchOccurrences WHERE url = ?1",
                    [term],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(count.unwrap_or(0).max(0) as u32)
        })?)
    }

    pub fn clear(&self) -> Result<()> {
        Ok(self.db.with_connection(|conn| {
            conn.execute("DELETE FROM SearchOccurrences", [])?;
            Ok(())
        })?)
    }
}

impl Clone for SearchFrequencyStore {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit(store: &SearchFrequencyStore, term: &str, times: usize) {
        for _ in 0..times {
            store.increment_occurrence(term).unwrap();
        }
    }

    #[test]
    fn test_three_submissions_surface_as_top_search() {
        let store = SearchFrequencyStore::open_in_memory().unwrap();
        submit(&store, "weather", 3);

        let suggestions = store
            .relevant_suggestions("wea", TOP_SEARCH_LIMIT, TOP_SEARCH_MIN_OCCURRENCES)
            .unwrap();
        assert_eq!(suggestions, vec!["weather".to_string()]);
    }

    #[test]
    fn test_two_submissions_are_not_enough() {
        let store = SearchFrequencyStore::open_in_memory().unwrap();
        submit(&store, "weather", 2);

        let suggestions = store
            .relevant_suggestions("wea", TOP_SEARCH_LIMIT, TOP_SEARCH_MIN_OCCURRENCES)
            .unwrap();
        assert!(suggestions.is_empty());
        assert_eq!(store.occurrences("weather").unwrap(), 2);
    }

    #[test]
    fn test_suggestions_are_ranked_and_limited() {
        let store = SearchFrequencyStore::open_in_memory().unwrap();
        submit(&store, "rust book", 3);
        submit(&store, "rust lang", 6);
        submit(&store, "rust traits", 4);
        submit(&store, "rustls", 5);
        submit(&store, "rust async", 8);
        submit(&store, "python", 9);

        let suggestions = store
            .relevant_suggestions("rust", TOP_SEARCH_LIMIT, TOP_SEARCH_MIN_OCCURRENCES)
            .unwrap();
        assert_eq!(
            suggestions,
            vec!["rust async", "rust lang", "rustls", "rust traits"]
        );
    }

    #[test]
    fn test_prefix_match_is_literal() {
        let store = SearchFrequencyStore::open_in_memory().unwrap();
        submit(&store, "100% cotton", 3);
        submit(&store, "1000 words", 3);
        submit(&store, "Weather", 3);

        let suggestions = store.relevant_suggestions("100%", 4, 3).unwrap();
        assert_eq!(suggestions, vec!["100% cotton"]);
        assert!(store.relevant_suggestions("wea", 4, 3).unwrap().is_empty());
    }

    #[test]
    fn test_clear() {
        let store = SearchFrequencyStore::open_in_memory().unwrap();
        submit(&store, "weather", 3);
        store.clear().unwrap();
        assert_eq!(store.occurrences("weather").unwrap(), 0);
    }
}
