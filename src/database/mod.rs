use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;

use crate::error::StorageError;
use crate::models::{PatternTable, Role};

pub mod queries;
pub mod schema;

pub const PATTERNS_KEY: &str = "mind_patterns";
pub const ROLE_KEY: &str = "mind_role";

pub fn init_database(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(db_path)?;

    conn.pragma_update(None, "journal_mode", &"WAL")?;
    conn.pragma_update(None, "synchronous", &"NORMAL")?;

    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Agent-side durable key/value storage.
pub struct LocalStorage {
    conn: Connection,
}

impl LocalStorage {
    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self {
            conn: init_database(db_path)?,
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::create_tables(&conn)?;
        Ok(Self { conn })
    }

    /// A missing key loads as an empty table.
    pub fn load_patterns(&self) -> Result<PatternTable, StorageError> {
        match queries::get_item(&self.conn, PATTERNS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(PatternTable::new()),
        }
    }

    pub fn save_patterns(&self, patterns: &PatternTable) -> Result<(), StorageError> {
        let raw = serde_json::to_string(patterns)?;
        queries::set_item(&self.conn, PATTERNS_KEY, &raw)?;
        Ok(())
    }

    pub fn clear_patterns(&self) -> Result<bool, StorageError> {
        Ok(queries::remove_item(&self.conn, PATTERNS_KEY)?)
    }

    pub fn load_role(&self) -> Result<Option<Role>, StorageError> {
        let raw = queries::get_item(&self.conn, ROLE_KEY)?;
        Ok(raw.and_then(|r| match r.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                log::warn!("[Storage] Ignoring stored role: {}", e);
                None
            }
        }))
    }

    pub fn save_role(&self, role: Role) -> Result<(), StorageError> {
        queries::set_item(&self.conn, ROLE_KEY, role.as_str())?;
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatternEntry;

    #[test]
    fn patterns_survive_a_reload() {
        let storage = LocalStorage::in_memory().unwrap();
        assert!(storage.load_patterns().unwrap().is_empty());

        let mut table = PatternTable::new();
        table.insert("touch_9", PatternEntry { count: 2, occurrences: vec![1, 2] });
        storage.save_patterns(&table).unwrap();

        assert_eq!(storage.load_patterns().unwrap(), table);
    }

    #[test]
    fn role_round_trips_and_bad_values_are_ignored() {
        let storage = LocalStorage::in_memory().unwrap();
        assert_eq!(storage.load_role().unwrap(), None);

        storage.save_role(Role::Receiver).unwrap();
        assert_eq!(storage.load_role().unwrap(), Some(Role::Receiver));

        queries::set_item(storage.connection(), ROLE_KEY, "wanderer").unwrap();
        assert_eq!(storage.load_role().unwrap(), None);
    }

    #[test]
    fn corrupt_patterns_surface_a_decode_error() {
        let storage = LocalStorage::in_memory().unwrap();
        queries::set_item(storage.connection(), PATTERNS_KEY, "{not json").unwrap();
        assert!(matches!(storage.load_patterns(), Err(StorageError::Decode(_))));
    }
}
