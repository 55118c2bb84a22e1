//! Database handle and schema management.
//!
//! The store is read-only for this crate apart from creating the schema in a
//! fresh database file; items, folders, and memberships are written by the
//! ingestion subsystem.

mod models;
mod schema;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub use models::{FolderRecord, ItemRecord, LibraryRecord, TagCount};
pub(crate) use models::{decode_tags, FOLDER_COLUMNS, ITEM_COLUMNS};
pub use schema::{MIGRATIONS, SCHEMA};

/// Data-access failure. Query text is composed from typed predicates and user
/// input is always bound as an escaped parameter, so there is no
/// malformed-input variant: any user text is a valid query by construction.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Database {
    pub(crate) conn: Connection,
}

impl Database {
    /// Open (creating parent directories if needed) a library database file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Create the schema in a fresh database and apply additive migrations.
    /// Safe to call on every open.
    pub fn initialize(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA)?;
        self.run_migrations()?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<(), StoreError> {
        for migration in MIGRATIONS {
            if let Err(e) = self.conn.execute(migration, []) {
                debug!("migration skipped ({e}): {migration}");
            }
        }
        Ok(())
    }

    /// All libraries in this database, oldest first.
    pub fn libraries(&self) -> Result<Vec<LibraryRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM libraries ORDER BY id")?;
        let libraries = stmt
            .query_map([], LibraryRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(libraries)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures: a tempfile-backed database seeded through raw SQL,
    //! standing in for the ingestion subsystem.

    use super::*;
    use rusqlite::params;

    pub(crate) struct TestDb {
        pub db: Database,
        _dir: tempfile::TempDir,
    }

    pub(crate) fn test_db() -> TestDb {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = Database::open(&dir.path().join("perch.db")).expect("open database");
        db.initialize().expect("initialize schema");
        TestDb { db, _dir: dir }
    }

    pub(crate) fn seed_library(db: &Database, name: &str) -> i64 {
        db.conn
            .execute("INSERT INTO libraries (name) VALUES (?)", params![name])
            .expect("insert library");
        db.conn.last_insert_rowid()
    }

    pub(crate) fn seed_item(
        db: &Database,
        library_id: i64,
        item_id: i64,
        name: &str,
        tags: &[&str],
        deleted: bool,
    ) {
        let tags_json = serde_json::to_string(tags).expect("encode tags");
        db.conn
            .execute(
                "INSERT INTO items (library_id, item_id, name, tags, is_deleted) \
                 VALUES (?, ?, ?, ?, ?)",
                params![library_id, item_id, name, tags_json, deleted],
            )
            .expect("insert item");
    }

    pub(crate) fn set_annotation(db: &Database, library_id: i64, item_id: i64, text: &str) {
        db.conn
            .execute(
                "UPDATE items SET annotation = ? WHERE library_id = ? AND item_id = ?",
                params![text, library_id, item_id],
            )
            .expect("set annotation");
    }

    pub(crate) fn set_size(db: &Database, library_id: i64, item_id: i64, size_bytes: i64) {
        db.conn
            .execute(
                "UPDATE items SET size_bytes = ? WHERE library_id = ? AND item_id = ?",
                params![size_bytes, library_id, item_id],
            )
            .expect("set size");
    }

    pub(crate) fn seed_folder(
        db: &Database,
        library_id: i64,
        folder_id: i64,
        name: &str,
        parent_id: Option<i64>,
    ) {
        db.conn
            .execute(
                "INSERT INTO folders (library_id, folder_id, name, parent_id) \
                 VALUES (?, ?, ?, ?)",
                params![library_id, folder_id, name, parent_id],
            )
            .expect("insert folder");
    }

    pub(crate) fn set_folder_sort(
        db: &Database,
        library_id: i64,
        folder_id: i64,
        sort_key: &str,
        ascending: bool,
    ) {
        db.conn
            .execute(
                "UPDATE folders SET sort_key = ?, sort_ascending = ? \
                 WHERE library_id = ? AND folder_id = ?",
                params![sort_key, ascending, library_id, folder_id],
            )
            .expect("set folder sort");
    }

    pub(crate) fn link(db: &Database, library_id: i64, folder_id: i64, item_id: i64) {
        db.conn
            .execute(
                "INSERT INTO folder_items (library_id, folder_id, item_id) VALUES (?, ?, ?)",
                params![library_id, folder_id, item_id],
            )
            .expect("insert membership");
    }

    pub(crate) fn get_folder(db: &Database, library_id: i64, folder_id: i64) -> FolderRecord {
        db.conn
            .query_row(
                &format!(
                    "SELECT {FOLDER_COLUMNS} FROM folders f \
                     WHERE f.library_id = ? AND f.folder_id = ?"
                ),
                params![library_id, folder_id],
                FolderRecord::from_row,
            )
            .expect("fetch folder")
    }
}
