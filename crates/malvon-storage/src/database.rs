//! Database connection and operations

use parking_lot::Mutex;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::Arc;

use crate::error::StorageError;
use crate::migrations::{run_migrations, Migration};
use crate::Result;

/// Shared handle to one SQLite file. Clones share the same connection.
pub struct Database {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl Database {
    /// Open (or create) the database at `path` and bring its schema up to date.
    pub fn open<P: AsRef<Path>>(path: P, migrations: &[Migration]) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrent performance
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        run_migrations(&conn, migrations)?;

        tracing::debug!(path = %path.display(), "Opened database");

        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    pub fn open_in_memory(migrations: &[Migration]) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn, migrations)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(StorageError::Closed)?;
        f(conn)
    }

    /// Run `f` inside a transaction. The transaction commits only if `f`
    /// returns `Ok`; any error rolls it back.
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut guard = self.conn.lock();
        let conn = guard.as_mut().ok_or(StorageError::Closed)?;
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    /// Release the underlying connection. Later calls fail with
    /// [`StorageError::Closed`]; closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        let Some(conn) = self.conn.lock().take() else {
            return Ok(());
        };

        conn.close().map_err(|(_, e)| StorageError::from(e))
    }

    pub fn is_closed(&self) -> bool {
        self.conn.lock().is_none()
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIGRATIONS: &[Migration] = &[Migration::new(
        1,
        "Counters",
        "CREATE TABLE counters (key TEXT PRIMARY KEY, value INTEGER NOT NULL);",
    )];

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory(MIGRATIONS).unwrap();
        db.with_connection(|conn| {
            let count: i32 =
                conn.query_row("SELECT COUNT(*) FROM counters", [], |row| row.get(0))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = Database::open_in_memory(MIGRATIONS).unwrap();

        let result: Result<()> = db.transaction(|tx| {
            tx.execute("INSERT INTO counters (key, value) VALUES ('a', 1)", [])?;
            tx.execute("INSERT INTO missing_table VALUES (1)", [])?;
            Ok(())
        });
        assert!(result.is_err());

        let count: i32 = db
            .with_connection(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM counters", [], |row| row.get(0))?)
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_close_is_idempotent() {
        let db = Database::open_in_memory(MIGRATIONS).unwrap();
        let other = db.clone();

        db.close().unwrap();
        db.close().unwrap();

        assert!(other.is_closed());
        assert!(matches!(
            other.with_connection(|_| Ok(())),
            Err(StorageError::Closed)
        ));
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.sqlite");

        let db = Database::open(&path, MIGRATIONS).unwrap();
        db.close().unwrap();

        assert!(path.exists());
    }
}
