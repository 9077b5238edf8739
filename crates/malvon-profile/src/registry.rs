//! Profile registry
//!
//! Maps profile names to their storage partition and remembers which tab
//! group was selected when the profile was last saved.

use rusqlite::OptionalExtension;
use std::path::Path;
use uuid::Uuid;

use malvon_storage::{Database, Migration};

use crate::error::ProfileError;
use crate::Result;

const MIGRATIONS: &[Migration] = &[Migration::new(
    1,
    "Profiles table",
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        name TEXT PRIMARY KEY,
        partition_id TEXT NOT NULL,
        selected_tab_group_index INTEGER NOT NULL DEFAULT 0
    );
"#,
)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileData {
    pub partition_id: Uuid,
    pub selected_tab_group_index: usize,
}

pub struct ProfileRegistry {
    db: Database,
}

impl ProfileRegistry {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Database::open(path.as_ref(), MIGRATIONS)?;
        tracing::info!(path = %path.as_ref().display(), "Opened profile registry");
        Ok(Self { db })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: Database::open_in_memory(MIGRATIONS)?,
        })
    }

    pub fn load(&self, name: &str) -> Result<Option<ProfileData>> {
        let row = self.db.with_connection(|conn| {
            let row = conn
                .query_row(
                    "SELECT partition_id, selected_tab_group_index FROM profiles WHERE name = ?1",
                    [name],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
                )
                .optional()?;
            Ok(row)
        })?;

        let Some((partition_id, selected)) = row else {
            return Ok(None);
        };

        let partition_id =
            Uuid::parse_str(&partition_id).map_err(|_| ProfileError::InvalidPartitionId {
                name: name.to_string(),
                value: partition_id.clone(),
            })?;

        Ok(Some(ProfileData {
            partition_id,
            selected_tab_group_index: selected.max(0) as usize,
        }))
    }

    /// Load `name`, registering it with a fresh partition if it is new.
    pub fn load_or_create(&self, name: &str) -> Result<ProfileData> {
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        // The name becomes part of a file name inside the data directory.
        if name.contains(['/', '\\', '\0']) || name == "." || name == ".." {
            return Err(ProfileError::InvalidName(name.to_string()));
        }

        if let Some(data) = self.load(name)? {
            return Ok(data);
        }

        let data = ProfileData {
            partition_id: Uuid::new_v4(),
            selected_tab_group_index: 0,
        };

        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO profiles (name, partition_id, selected_tab_group_index) VALUES (?1, ?2, 0)",
                (name, data.partition_id.to_string()),
            )?;
            Ok(())
        })?;

        tracing::info!(profile = %name, partition = %data.partition_id, "Created profile");
        Ok(data)
    }

    pub fn set_selected_tab_group_index(&self, name: &str, index: usize) -> Result<()> {
        let updated = self.db.with_connection(|conn| {
            let updated = conn.execute(
                "UPDATE profiles SET selected_tab_group_index = ?1 WHERE name = ?2",
                (index as i64, name),
            )?;
            Ok(updated)
        })?;

        if updated == 0 {
            return Err(ProfileError::NotFound(name.to_string()));
        }
        Ok(())
    }

    /// Registered profile names, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        let names = self.db.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT name FROM profiles ORDER BY name")?;
            let names = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(names)
        })?;

        Ok(names)
    }

    /// Forget `name`. Returns whether it was registered.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let removed = self.db.with_connection(|conn| {
            let removed = conn.execute("DELETE FROM profiles WHERE name = ?1", [name])?;
            Ok(removed)
        })?;

        if removed > 0 {
            tracing::info!(profile = %name, "Removed profile");
        }
        Ok(removed > 0)
    }

    pub fn close(&self) -> Result<()> {
        self.db.close()?;
        Ok(())
    }
}

impl Clone for ProfileRegistry {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}
