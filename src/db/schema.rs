pub const SCHEMA: &str = r#"
-- Libraries: scoping roots; every query is parameterized by library_id
CREATE TABLE IF NOT EXISTS libraries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Items: media entries owned by the ingestion subsystem
CREATE TABLE IF NOT EXISTS items (
    library_id INTEGER NOT NULL,
    item_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    ext TEXT,
    annotation TEXT,
    tags TEXT,  -- JSON array of strings
    size_bytes INTEGER NOT NULL DEFAULT 0,
    height INTEGER,
    width INTEGER,
    duration REAL,
    no_thumbnail INTEGER NOT NULL DEFAULT 0,
    is_deleted INTEGER NOT NULL DEFAULT 0,  -- soft delete; hidden from all reads
    added_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (library_id, item_id),
    FOREIGN KEY (library_id) REFERENCES libraries(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_items_library_deleted ON items(library_id, is_deleted);
CREATE INDEX IF NOT EXISTS idx_items_added_at ON items(added_at);

-- Folders: user hierarchy; parent_id NULL means root
CREATE TABLE IF NOT EXISTS folders (
    library_id INTEGER NOT NULL,
    folder_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    parent_id INTEGER,
    sort_key TEXT,            -- per-folder item sort override; NULL = use global
    sort_ascending INTEGER,   -- direction for the override
    added_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (library_id, folder_id),
    FOREIGN KEY (library_id) REFERENCES libraries(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_folders_parent ON folders(library_id, parent_id);

-- Folder membership; an item with zero rows here is "uncategorized"
CREATE TABLE IF NOT EXISTS folder_items (
    library_id INTEGER NOT NULL,
    folder_id INTEGER NOT NULL,
    item_id INTEGER NOT NULL,
    PRIMARY KEY (library_id, folder_id, item_id),
    FOREIGN KEY (library_id, folder_id) REFERENCES folders(library_id, folder_id) ON DELETE CASCADE,
    FOREIGN KEY (library_id, item_id) REFERENCES items(library_id, item_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_folder_items_folder ON folder_items(library_id, folder_id);
CREATE INDEX IF NOT EXISTS idx_folder_items_item ON folder_items(library_id, item_id);
"#;

/// Additive migrations for databases created by older builds.
/// Each statement runs best-effort; "duplicate column" failures are ignored.
pub const MIGRATIONS: &[&str] = &[
    "ALTER TABLE items ADD COLUMN duration REAL",
    "ALTER TABLE items ADD COLUMN no_thumbnail INTEGER NOT NULL DEFAULT 0",
    "ALTER TABLE folders ADD COLUMN sort_key TEXT",
    "ALTER TABLE folders ADD COLUMN sort_ascending INTEGER",
];
