//! Buffered history store
//!
//! Visits are appended to an in-memory buffer and written to SQLite in
//! batches. Re-visiting an address bumps its counter instead of adding a row.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rusqlite::OptionalExtension;
use std::path::Path;
use std::sync::Arc;

use malvon_storage::{Database, Migration};

use crate::error::HistoryError;
use crate::record::HistoryRecord;
use crate::Result;

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Durable rows must have been accessed more than this many times to show
/// up in [`HistoryStore::search`]. Buffered records are not filtered.
pub const SEARCH_MIN_TIMES_ACCESSED: i64 = 4;

const MIGRATIONS: &[Migration] = &[Migration::new(
    1,
    "History table",
    r#"
    CREATE TABLE IF NOT EXISTS history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        address TEXT NOT NULL UNIQUE,
        timestamp TEXT NOT NULL,
        times_accessed INTEGER NOT NULL DEFAULT 1,
        date_string TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_history_times_accessed ON history(times_accessed);
    CREATE INDEX IF NOT EXISTS idx_history_timestamp ON history(timestamp);
"#,
)];

pub struct HistoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    db: Option<Database>,
    pending: RwLock<Vec<HistoryRecord>>,
    /// Serialises flushes so the buffer prefix being written can't be
    /// flushed twice.
    flush_lock: Mutex<()>,
    batch_size: usize,
}

impl HistoryStore {
    pub fn open<P: AsRef<Path>>(path: P, batch_size: usize) -> Result<Self> {
        let db = Database::open(path.as_ref(), MIGRATIONS)?;

        tracing::info!(path = %path.as_ref().display(), batch_size, "Opened history store");

        Ok(Self::with_database(Some(db), batch_size))
    }

    pub fn open_in_memory(batch_size: usize) -> Result<Self> {
        let db = Database::open_in_memory(MIGRATIONS)?;
        Ok(Self::with_database(Some(db), batch_size))
    }

    /// A store without a backing file. Inserts are buffered, flushes fail
    /// and keep the buffer, searches only see buffered records.
    pub fn detached(batch_size: usize) -> Self {
        Self::with_database(None, batch_size)
    }

    fn with_database(db: Option<Database>, batch_size: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                db,
                pending: RwLock::new(Vec::new()),
                flush_lock: Mutex::new(()),
                batch_size: batch_size.max(1),
            }),
        }
    }

    /// Buffer a visit. Reaching the batch size schedules a flush on a
    /// blocking worker when a Tokio runtime is available, otherwise the
    /// flush runs on the calling thread.
    pub fn insert(&self, record: HistoryRecord) {
        let should_flush = {
            let mut pending = self.inner.pending.write();
            pending.push(record);
            pending.len() >= self.inner.batch_size
        };

        if should_flush {
            self.schedule_flush();
        }
    }

    fn schedule_flush(&self) {
        let inner = Arc::clone(&self.inner);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || inner.flush_logged());
            }
            Err(_) => inner.flush_logged(),
        }
    }

    /// Write all buffered records in one transaction and return how many
    /// were written. The buffer is only trimmed after the commit succeeds.
    pub fn flush(&self) -> Result<usize> {
        self.inner.flush()
    }

    /// Records matching `query` (case-sensitive, title or address), most
    /// accessed first. Durable rows need more than
    /// [`SEARCH_MIN_TIMES_ACCESSED`] accesses; buffered ones are always
    /// included.
    pub fn search(&self, query: &str) -> Vec<HistoryRecord> {
        // Buffer before durable rows: a concurrent flush may duplicate a
        // record in the results but never hides it.
        let snapshot = self.inner.pending.read().clone();

        let mut results = match self.search_durable(query) {
            Ok(rows) => rows,
            Err(HistoryError::Unavailable) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "History search failed, using buffered records only");
                Vec::new()
            }
        };

        results.extend(snapshot.into_iter().filter(|r| r.matches(query)));

        results.sort_by(|a, b| b.times_accessed.cmp(&a.times_accessed));
        results
    }

    fn search_durable(&self, query: &str) -> Result<Vec<HistoryRecord>> {
        let db = self.inner.db.as_ref().ok_or(HistoryError::Unavailable)?;

        Ok(db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, address, timestamp, times_accessed FROM history
                 WHERE (instr(title, ?1) > 0 OR instr(address, ?1) > 0)
                   AND times_accessed > ?2
                 ORDER BY times_accessed DESC",
            )?;

            let records: Vec<HistoryRecord> = stmt
                .query_map(
                    rusqlite::params![query, SEARCH_MIN_TIMES_ACCESSED],
                    record_from_row,
                )?
                .filter_map(|r| r.ok())
                .collect();

            Ok(records)
        })?)
    }

    /// Most recently accessed durable records.
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        let db = self.inner.db.as_ref().ok_or(HistoryError::Unavailable)?;

        Ok(db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, address, timestamp, times_accessed FROM history
                 ORDER BY timestamp DESC
                 LIMIT ?1",
            )?;

            let records: Vec<HistoryRecord> = stmt
                .query_map([limit as i64], record_from_row)?
                .filter_map(|r| r.ok())
                .collect();

            Ok(records)
        })?)
    }

    /// Drop every buffered and persisted record.
    pub fn remove_all(&self) -> Result<()> {
        let _flush = self.inner.flush_lock.lock();
        self.inner.pending.write().clear();

        if let Some(db) = &self.inner.db {
            db.with_connection(|conn| {
                conn.execute("DELETE FROM history", [])?;
                Ok(())
            })?;
        }

        tracing::info!("Removed all history");
        Ok(())
    }

    pub fn pending_len(&self) -> usize {
        self.inner.pending.read().len()
    }

    /// Drain the buffer and release the database handle. Must run before
    /// the process exits or buffered visits are lost.
    pub fn flush_and_close(&self) {
        self.inner.flush_and_close();
    }
}

impl Inner {
    fn flush(&self) -> Result<usize> {
        let _flush = self.flush_lock.lock();

        let batch = self.pending.read().clone();
        if batch.is_empty() {
            return Ok(0);
        }

        let db = self.db.as_ref().ok_or(HistoryError::Unavailable)?;

        db.transaction(|tx| {
            let mut check =
                tx.prepare_cached("SELECT id, times_accessed FROM history WHERE address = ?1")?;
            let mut update = tx.prepare_cached(
                "UPDATE history SET times_accessed = ?1, timestamp = ?2 WHERE id = ?3",
            )?;
            let mut insert = tx.prepare_cached(
                "INSERT INTO history (title, address, timestamp, times_accessed, date_string)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for record in &batch {
                let existing: Option<(i64, i64)> = check
                    .query_row([&record.address], |row| Ok((row.get(0)?, row.get(1)?)))
                    .optional()?;

                match existing {
                    Some((id, times_accessed)) => {
                        update.execute(rusqlite::params![
                            times_accessed + i64::from(record.times_accessed),
                            record.timestamp.to_rfc3339(),
                            id,
                        ])?;
                    }
                    None => {
                        insert.execute(rusqlite::params![
                            record.title,
                            record.address,
                            record.timestamp.to_rfc3339(),
                            i64::from(record.times_accessed),
                            record.date_string(),
                        ])?;
                    }
                }
            }

            Ok(())
        })?;

        // Inserts only append, so the flushed records are still the prefix.
        self.pending.write().drain(..batch.len());

        tracing::debug!(count = batch.len(), "Flushed history batch");
        Ok(batch.len())
    }

    fn flush_logged(&self) {
        if let Err(e) = self.flush() {
            tracing::warn!(
                error = %e,
                pending = self.pending.read().len(),
                "History flush failed, keeping buffered records"
            );
        }
    }

    fn flush_and_close(&self) {
        let Some(db) = &self.db else {
            return;
        };
        if db.is_closed() {
            return;
        }

        if let Err(e) = self.flush() {
            tracing::error!(
                error = %e,
                lost = self.pending.read().len(),
                "Failed to flush history before closing"
            );
        }

        if let Err(e) = db.close() {
            tracing::error!(error = %e, "Failed to close history database");
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.flush_and_close();
    }
}

impl Clone for HistoryStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRecord> {
    let timestamp_str: String = row.get(3)?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(HistoryRecord {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        address: row.get(2)?,
        timestamp,
        times_accessed: row.get::<_, i64>(4)?.clamp(1, i64::from(u32::MAX)) as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn visit(address: &str) -> HistoryRecord {
        HistoryRecord::new(format!("Title of {}", address), address.to_string())
    }

    fn durable_count(store: &HistoryStore, address: &str) -> (i64, i64) {
        store
            .inner
            .db
            .as_ref()
            .unwrap()
            .with_connection(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*), COALESCE(SUM(times_accessed), 0) FROM history WHERE address = ?1",
                    [address],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?)
            })
            .unwrap()
    }

    #[test]
    fn test_repeated_visits_collapse_into_one_row() {
        let store = HistoryStore::open_in_memory(DEFAULT_BATCH_SIZE).unwrap();

        for _ in 0..5 {
            store.insert(visit("a.com"));
        }
        assert_eq!(store.flush().unwrap(), 5);

        let results = store.search("a");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].address, "a.com");
        assert_eq!(results[0].times_accessed, 5);
        assert!(results[0].id.is_some());
    }

    #[test]
    fn test_flush_sums_times_accessed_across_batches() {
        let store = HistoryStore::open_in_memory(DEFAULT_BATCH_SIZE).unwrap();

        store.insert(visit("b.com").with_times_accessed(2));
        store.flush().unwrap();
        store.insert(visit("b.com").with_times_accessed(3));
        store.insert(visit("b.com"));
        store.flush().unwrap();

        assert_eq!(durable_count(&store, "b.com"), (1, 6));
    }

    #[test]
    fn test_empty_flush_is_noop() {
        let store = HistoryStore::open_in_memory(DEFAULT_BATCH_SIZE).unwrap();
        assert_eq!(store.flush().unwrap(), 0);
        assert_eq!(store.flush().unwrap(), 0);

        let detached = HistoryStore::detached(DEFAULT_BATCH_SIZE);
        assert_eq!(detached.flush().unwrap(), 0);
    }

    #[test]
    fn test_batch_size_triggers_flush() {
        let store = HistoryStore::open_in_memory(3).unwrap();

        store.insert(visit("one.com"));
        store.insert(visit("two.com"));
        assert_eq!(store.pending_len(), 2);

        store.insert(visit("three.com"));
        assert_eq!(store.pending_len(), 0);
        assert_eq!(store.recent(10).unwrap().len(), 3);
    }

    #[test]
    fn test_search_includes_unflushed_records_without_threshold() {
        let store = HistoryStore::open_in_memory(DEFAULT_BATCH_SIZE).unwrap();

        store.insert(visit("https://docs.rs"));
        let results = store.search("docs");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, None);
    }

    #[test]
    fn test_search_applies_threshold_to_durable_rows() {
        let store = HistoryStore::open_in_memory(DEFAULT_BATCH_SIZE).unwrap();

        store.insert(visit("https://rarely.org").with_times_accessed(4));
        store.insert(visit("https://often.org").with_times_accessed(5));
        store.flush().unwrap();

        let results = store.search(".org");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].address, "https://often.org");
    }

    #[test]
    fn test_search_is_case_sensitive() {
        let store = HistoryStore::open_in_memory(DEFAULT_BATCH_SIZE).unwrap();

        store.insert(visit("https://Example.com").with_times_accessed(9));
        store.flush().unwrap();
        store.insert(visit("https://Example.net"));

        assert!(store.search("example").is_empty());
        assert_eq!(store.search("Example").len(), 2);
    }

    #[test]
    fn test_search_orders_by_times_accessed() {
        let store = HistoryStore::open_in_memory(DEFAULT_BATCH_SIZE).unwrap();

        store.insert(visit("https://a.site").with_times_accessed(7));
        store.insert(visit("https://b.site").with_times_accessed(12));
        store.flush().unwrap();
        store.insert(visit("https://c.site").with_times_accessed(9));
        store.insert(visit("https://d.site"));

        let results = store.search("site");
        let counts: Vec<u32> = results.iter().map(|r| r.times_accessed).collect();
        assert_eq!(counts, vec![12, 9, 7, 1]);
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_failed_flush_keeps_buffer() {
        let store = HistoryStore::detached(2);

        store.insert(visit("kept.com"));
        store.insert(visit("kept.com"));
        assert_eq!(store.pending_len(), 2);

        assert!(matches!(store.flush(), Err(HistoryError::Unavailable)));
        assert_eq!(store.pending_len(), 2);
        assert_eq!(store.search("kept").len(), 2);
    }

    #[test]
    fn test_flush_rolls_back_when_a_row_is_rejected() {
        let store = HistoryStore::open_in_memory(DEFAULT_BATCH_SIZE).unwrap();
        let db = store.inner.db.as_ref().unwrap();
        db.with_connection(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON history
                 WHEN NEW.address = 'bad.com'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )?;
            Ok(())
        })
        .unwrap();

        store.insert(visit("good.com"));
        store.insert(visit("bad.com"));

        assert!(store.flush().is_err());
        assert_eq!(store.pending_len(), 2);

        let rows: i64 = db
            .with_connection(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?)
            })
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_search_never_misses_record_during_concurrent_flush() {
        let store = HistoryStore::open_in_memory(DEFAULT_BATCH_SIZE).unwrap();

        for round in 0..200 {
            let address = format!("https://round{}.test", round);
            store.insert(visit(&address).with_times_accessed(5));

            let flusher = {
                let store = store.clone();
                thread::spawn(move || store.flush().unwrap())
            };
            let found = store.search(&address);
            flusher.join().unwrap();

            assert!(
                found.iter().any(|r| r.address == address),
                "round {} lost {}",
                round,
                address
            );
        }
    }

    #[test]
    fn test_flush_and_close_persists_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.sqlite");

        {
            let store = HistoryStore::open(&path, DEFAULT_BATCH_SIZE).unwrap();
            store.insert(visit("https://persisted.dev"));
            store.flush_and_close();

            // Closed stores keep buffering but cannot flush.
            store.insert(visit("https://late.dev"));
            assert!(store.flush().is_err());
        }

        let reopened = HistoryStore::open(&path, DEFAULT_BATCH_SIZE).unwrap();
        let recent = reopened.recent(10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].address, "https://persisted.dev");
    }

    #[test]
    fn test_drop_flushes_pending_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dropped.sqlite");

        {
            let store = HistoryStore::open(&path, DEFAULT_BATCH_SIZE).unwrap();
            store.insert(visit("https://dropped.dev"));
        }

        let reopened = HistoryStore::open(&path, DEFAULT_BATCH_SIZE).unwrap();
        assert_eq!(reopened.recent(10).unwrap().len(), 1);
    }

    #[test]
    fn test_remove_all() {
        let store = HistoryStore::open_in_memory(DEFAULT_BATCH_SIZE).unwrap();

        store.insert(visit("gone.com"));
        store.flush().unwrap();
        store.insert(visit("also-gone.com"));

        store.remove_all().unwrap();
        assert_eq!(store.pending_len(), 0);
        assert!(store.recent(10).unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_inserts_keep_addresses_unique() {
        let store = HistoryStore::open_in_memory(10).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        store.insert(visit(&format!("site{}.com", i % 5)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        store.flush().unwrap();

        assert_eq!(store.pending_len(), 0);
        for i in 0..5 {
            assert_eq!(durable_count(&store, &format!("site{}.com", i)), (1, 20));
        }
    }
}
