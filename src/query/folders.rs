//! Folder listings, folder membership queries, and cover lookup.

use rusqlite::{params_from_iter, types::Value};
use tracing::debug;

use crate::db::{Database, FolderRecord, ItemRecord, StoreError, FOLDER_COLUMNS};

use super::expr::{search_predicates, Expr};
use super::items::base_item_predicate;
use super::sort::{
    folder_order_clause, item_order_clause, resolve_item_sort, FolderSort, ItemSortKey,
    SortSelection,
};

/// How deep the cover fallback may look: the folder itself (1), its direct
/// children (2), and its grandchildren (3). Never deeper.
pub const COVER_SEARCH_MAX_DEPTH: u32 = 3;

impl Database {
    /// Folders at the top of the hierarchy, name-searched and sorted.
    pub fn root_folders(
        &self,
        library_id: i64,
        sort: FolderSort,
        search: &str,
    ) -> Result<Vec<FolderRecord>, StoreError> {
        self.query_folders(library_id, Expr::ParentIsNull, sort, search)
    }

    /// Direct children of the given folder.
    pub fn child_folders(
        &self,
        library_id: i64,
        parent_id: i64,
        sort: FolderSort,
        search: &str,
    ) -> Result<Vec<FolderRecord>, StoreError> {
        self.query_folders(library_id, Expr::ParentIs(parent_id), sort, search)
    }

    /// Visible items filed under this folder, ordered by the folder's own
    /// sort override when it has one, else the supplied global selection.
    pub fn folder_items(
        &self,
        folder: &FolderRecord,
        global_sort: SortSelection,
        search: &str,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        let predicate = Expr::All(vec![
            base_item_predicate(folder.library_id, search),
            Expr::InFolders(vec![folder.folder_id]),
        ]);
        let sort = resolve_item_sort(global_sort, folder.sort_override());
        self.query_items(&predicate, &item_order_clause(sort), None)
    }

    /// A representative item for the folder's thumbnail: a random item
    /// directly in the folder, else one found among its descendants within
    /// the depth bound. No candidate anywhere is an empty result, not an
    /// error.
    pub fn folder_cover_item(
        &self,
        folder: &FolderRecord,
    ) -> Result<Option<ItemRecord>, StoreError> {
        if let Some(item) = self.random_item_in_folders(folder.library_id, &[folder.folder_id])? {
            return Ok(Some(item));
        }
        self.cover_item_from_descendants(folder)
    }

    /// Breadth-first walk over the folder's subtree with an explicit depth
    /// counter: children first, then grandchildren, stopping hard at
    /// [`COVER_SEARCH_MAX_DEPTH`]. The shallowest depth holding any visible
    /// item wins.
    fn cover_item_from_descendants(
        &self,
        folder: &FolderRecord,
    ) -> Result<Option<ItemRecord>, StoreError> {
        let mut frontier = self.child_folder_ids(folder.library_id, &[folder.folder_id])?;
        let mut depth: u32 = 2;

        while !frontier.is_empty() && depth <= COVER_SEARCH_MAX_DEPTH {
            debug!(
                "cover fallback: folder {} depth {depth}, {} candidate folders",
                folder.folder_id,
                frontier.len()
            );
            if let Some(item) = self.random_item_in_folders(folder.library_id, &frontier)? {
                return Ok(Some(item));
            }
            depth += 1;
            if depth > COVER_SEARCH_MAX_DEPTH {
                break;
            }
            frontier = self.child_folder_ids(folder.library_id, &frontier)?;
        }
        Ok(None)
    }

    fn query_folders(
        &self,
        library_id: i64,
        position: Expr,
        sort: FolderSort,
        search: &str,
    ) -> Result<Vec<FolderRecord>, StoreError> {
        let mut clauses = vec![Expr::LibraryIs(library_id), position];
        clauses.extend(search_predicates(search, &["name"]));
        let predicate = Expr::All(clauses);

        let mut params = Vec::new();
        let where_sql = predicate.to_sql("f", &mut params);
        let sql = format!(
            "SELECT {FOLDER_COLUMNS} FROM folders f WHERE {where_sql} {}",
            folder_order_clause(sort)
        );
        debug!("folder query: {sql}");

        let mut stmt = self.conn.prepare(&sql)?;
        let folders = stmt
            .query_map(params_from_iter(params), FolderRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(folders)
    }

    /// One random visible item filed in any of the given folders.
    fn random_item_in_folders(
        &self,
        library_id: i64,
        folder_ids: &[i64],
    ) -> Result<Option<ItemRecord>, StoreError> {
        if folder_ids.is_empty() {
            return Ok(None);
        }
        let predicate = Expr::All(vec![
            base_item_predicate(library_id, ""),
            Expr::InFolders(folder_ids.to_vec()),
        ]);
        let order = item_order_clause(SortSelection { key: ItemSortKey::Random, ascending: true });
        let items = self.query_items(&predicate, &order, Some(1))?;
        Ok(items.into_iter().next())
    }

    fn child_folder_ids(
        &self,
        library_id: i64,
        parent_ids: &[i64],
    ) -> Result<Vec<i64>, StoreError> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders: Vec<&str> = parent_ids.iter().map(|_| "?").collect();
        let sql = format!(
            "SELECT folder_id FROM folders \
             WHERE library_id = ? AND parent_id IN ({}) \
             ORDER BY folder_id",
            placeholders.join(", ")
        );
        let mut params = vec![Value::Integer(library_id)];
        params.extend(parent_ids.iter().map(|id| Value::Integer(*id)));

        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(params), |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }
}
