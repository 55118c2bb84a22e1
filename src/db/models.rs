//! Read-only record types returned by the query layer.

use rusqlite::Row;
use tracing::warn;

use crate::query::sort::{FolderSortOverride, ItemSortKey, SortSelection};

/// Column list matching [`ItemRecord::from_row`]; queries alias the items
/// table as `i`.
pub(crate) const ITEM_COLUMNS: &str =
    "i.library_id, i.item_id, i.name, i.ext, i.annotation, i.tags, \
     i.size_bytes, i.height, i.width, i.duration, i.no_thumbnail, i.added_at";

/// Column list matching [`FolderRecord::from_row`]; queries alias the folders
/// table as `f`.
pub(crate) const FOLDER_COLUMNS: &str =
    "f.library_id, f.folder_id, f.name, f.parent_id, f.sort_key, f.sort_ascending, f.added_at";

/// A library root.
#[derive(Debug, Clone)]
pub struct LibraryRecord {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// A media item. Soft-deleted rows never surface, so no deletion flag is
/// carried here.
#[derive(Debug, Clone)]
pub struct ItemRecord {
    pub library_id: i64,
    pub item_id: i64,
    pub name: String,
    pub ext: Option<String>,
    pub annotation: Option<String>,
    pub tags: Vec<String>,
    pub size_bytes: i64,
    pub height: Option<i64>,
    pub width: Option<i64>,
    pub duration: Option<f64>,
    pub no_thumbnail: bool,
    pub added_at: String,
}

/// A folder in the hierarchy. `parent_id` is None for roots.
#[derive(Debug, Clone)]
pub struct FolderRecord {
    pub library_id: i64,
    pub folder_id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub sort_override: Option<SortSelection>,
    pub added_at: String,
}

/// A tag with the number of qualifying items holding it. Derived on read;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

/// Decode the JSON tag column. A NULL, blank, or malformed column yields an
/// empty list; malformed JSON is logged since it points at an ingestion bug.
pub(crate) fn decode_tags(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(tags) => tags,
        Err(e) => {
            warn!("undecodable tag column, treating as untagged: {e}");
            Vec::new()
        }
    }
}

impl ItemRecord {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let tags_raw: Option<String> = row.get(5)?;
        Ok(ItemRecord {
            library_id: row.get(0)?,
            item_id: row.get(1)?,
            name: row.get(2)?,
            ext: row.get(3)?,
            annotation: row.get(4)?,
            tags: decode_tags(tags_raw.as_deref()),
            size_bytes: row.get(6)?,
            height: row.get(7)?,
            width: row.get(8)?,
            duration: row.get(9)?,
            no_thumbnail: row.get(10)?,
            added_at: row.get(11)?,
        })
    }
}

impl FolderRecord {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let sort_key: Option<String> = row.get(4)?;
        let sort_ascending: Option<bool> = row.get(5)?;
        Ok(FolderRecord {
            library_id: row.get(0)?,
            folder_id: row.get(1)?,
            name: row.get(2)?,
            parent_id: row.get(3)?,
            sort_override: decode_sort_override(sort_key.as_deref(), sort_ascending),
            added_at: row.get(6)?,
        })
    }

    /// The folder's ordering choice as the resolution variant.
    pub fn sort_override(&self) -> FolderSortOverride {
        match self.sort_override {
            Some(sel) => FolderSortOverride::UseExplicit(sel),
            None => FolderSortOverride::UseGlobal,
        }
    }
}

/// A stored override needs a recognizable key; unknown text (from a newer or
/// older build) decodes as "no override" rather than failing the row.
fn decode_sort_override(key: Option<&str>, ascending: Option<bool>) -> Option<SortSelection> {
    let key = ItemSortKey::from_str(key?)?;
    Some(SortSelection { key, ascending: ascending.unwrap_or(true) })
}

impl LibraryRecord {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(LibraryRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}
