//! Item listing queries: the base scoped predicate and its variants.

use rusqlite::params_from_iter;
use tracing::debug;

use crate::db::{Database, ItemRecord, StoreError, ITEM_COLUMNS};

use super::expr::{search_predicates, Expr};
use super::sort::{item_order_clause, ItemSortKey, SortSelection};

/// Fields a free-text token may match for items. The tags column holds the
/// JSON-encoded array, so a token containment check covers every element.
const ITEM_SEARCH_COLUMNS: &[&'static str] = &["name", "annotation", "tags"];

/// Library scoping and soft-delete exclusion are applied here and nowhere
/// else; no query built on this predicate can drop either.
pub(crate) fn base_item_predicate(library_id: i64, search: &str) -> Expr {
    let mut clauses = vec![Expr::LibraryIs(library_id), Expr::NotDeleted];
    clauses.extend(search_predicates(search, ITEM_SEARCH_COLUMNS));
    Expr::All(clauses)
}

impl Database {
    /// All visible items in the library matching the free text.
    pub fn all_items(
        &self,
        library_id: i64,
        sort: SortSelection,
        search: &str,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        let predicate = base_item_predicate(library_id, search);
        self.query_items(&predicate, &item_order_clause(sort), None)
    }

    /// Visible items with no folder membership at all.
    pub fn uncategorized_items(
        &self,
        library_id: i64,
        sort: SortSelection,
        search: &str,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        let predicate = Expr::All(vec![
            base_item_predicate(library_id, search),
            Expr::Uncategorized,
        ]);
        self.query_items(&predicate, &item_order_clause(sort), None)
    }

    /// Visible items in random order, ignoring any configured sort. Used to
    /// pick a representative cover.
    pub fn random_items(
        &self,
        library_id: i64,
        search: &str,
        limit: usize,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        let predicate = base_item_predicate(library_id, search);
        let order = item_order_clause(SortSelection { key: ItemSortKey::Random, ascending: true });
        self.query_items(&predicate, &order, Some(limit))
    }

    /// Execute an item query: render the predicate tree, bind its parameters,
    /// and map rows strictly (a row failure fails the call).
    pub(crate) fn query_items(
        &self,
        predicate: &Expr,
        order: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        let mut params = Vec::new();
        let where_sql = predicate.to_sql("i", &mut params);
        let mut sql = format!("SELECT {ITEM_COLUMNS} FROM items i WHERE {where_sql} {order}");
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        debug!("item query: {sql}");

        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(params), ItemRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::*;

    fn by_name() -> SortSelection {
        SortSelection { key: ItemSortKey::Name, ascending: true }
    }

    fn names(items: &[ItemRecord]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_blank_search_matches_everything() {
        let fixture = test_db();
        let lib = seed_library(&fixture.db, "test");
        seed_item(&fixture.db, lib, 1, "alpha", &[], false);
        seed_item(&fixture.db, lib, 2, "beta", &[], false);

        let all = fixture.db.all_items(lib, by_name(), "").expect("query");
        let blank = fixture.db.all_items(lib, by_name(), " \t\n ").expect("query");
        assert_eq!(names(&all), vec!["alpha", "beta"]);
        assert_eq!(names(&blank), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_soft_deleted_items_are_invisible() {
        let fixture = test_db();
        let lib = seed_library(&fixture.db, "test");
        seed_item(&fixture.db, lib, 1, "Photo1", &["cat", "blue"], false);
        seed_item(&fixture.db, lib, 2, "Photo2", &["cat"], true);
        seed_item(&fixture.db, lib, 3, "cats are great", &[], false);

        let items = fixture.db.all_items(lib, by_name(), "cat").expect("query");
        assert_eq!(names(&items), vec!["cats are great", "Photo1"]);
    }

    #[test]
    fn test_library_scoping() {
        let fixture = test_db();
        let lib_a = seed_library(&fixture.db, "a");
        let lib_b = seed_library(&fixture.db, "b");
        seed_item(&fixture.db, lib_a, 1, "only in a", &[], false);
        seed_item(&fixture.db, lib_b, 1, "only in b", &[], false);

        let items = fixture.db.all_items(lib_a, by_name(), "").expect("query");
        assert_eq!(names(&items), vec!["only in a"]);
    }

    #[test]
    fn test_every_token_must_match_somewhere() {
        let fixture = test_db();
        let lib = seed_library(&fixture.db, "test");
        seed_item(&fixture.db, lib, 1, "sunset", &["beach"], false);
        seed_item(&fixture.db, lib, 2, "sunset", &[], false);
        set_annotation(&fixture.db, lib, 2, "taken at the beach");
        seed_item(&fixture.db, lib, 3, "sunrise", &["beach"], false);

        // "sunset" matches by name, "beach" by tag on item 1 and by
        // annotation on item 2; item 3 fails the first token.
        let items = fixture.db.all_items(lib, by_name(), "sunset beach").expect("query");
        let ids: Vec<i64> = items.iter().map(|i| i.item_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_wildcards_match_literally() {
        let fixture = test_db();
        let lib = seed_library(&fixture.db, "test");
        seed_item(&fixture.db, lib, 1, "sale 50% off", &[], false);
        seed_item(&fixture.db, lib, 2, "sale 500 off", &[], false);
        seed_item(&fixture.db, lib, 3, "snapshot_1", &[], false);
        seed_item(&fixture.db, lib, 4, "snapshotX1", &[], false);
        seed_item(&fixture.db, lib, 5, "back\\slash", &[], false);

        let percent = fixture.db.all_items(lib, by_name(), "50%").expect("query");
        assert_eq!(names(&percent), vec!["sale 50% off"]);

        let underscore = fixture.db.all_items(lib, by_name(), "snapshot_1").expect("query");
        assert_eq!(names(&underscore), vec!["snapshot_1"]);

        let backslash = fixture.db.all_items(lib, by_name(), "back\\slash").expect("query");
        assert_eq!(names(&backslash), vec!["back\\slash"]);
    }

    #[test]
    fn test_uncategorized_excludes_any_membership() {
        let fixture = test_db();
        let lib = seed_library(&fixture.db, "test");
        seed_folder(&fixture.db, lib, 10, "holiday", None);
        seed_item(&fixture.db, lib, 1, "filed", &[], false);
        seed_item(&fixture.db, lib, 2, "loose", &[], false);
        link(&fixture.db, lib, 10, 1);

        let uncategorized = fixture.db.uncategorized_items(lib, by_name(), "").expect("query");
        assert_eq!(names(&uncategorized), vec!["loose"]);

        // Disjoint from any folder listing by construction.
        let folder = get_folder(&fixture.db, lib, 10);
        let filed = fixture.db.folder_items(&folder, by_name(), "").expect("query");
        for item in &filed {
            assert!(uncategorized.iter().all(|u| u.item_id != item.item_id));
        }
    }

    #[test]
    fn test_random_items_respects_limit() {
        let fixture = test_db();
        let lib = seed_library(&fixture.db, "test");
        for id in 1..=5 {
            seed_item(&fixture.db, lib, id, &format!("item{id}"), &[], false);
        }

        let one = fixture.db.random_items(lib, "", 1).expect("query");
        assert_eq!(one.len(), 1);
        let all = fixture.db.random_items(lib, "", 50).expect("query");
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_size_sort_with_tie_break() {
        let fixture = test_db();
        let lib = seed_library(&fixture.db, "test");
        seed_item(&fixture.db, lib, 1, "a", &[], false);
        seed_item(&fixture.db, lib, 2, "b", &[], false);
        seed_item(&fixture.db, lib, 3, "c", &[], false);
        set_size(&fixture.db, lib, 1, 100);
        set_size(&fixture.db, lib, 2, 300);
        set_size(&fixture.db, lib, 3, 100);

        let sort = SortSelection { key: ItemSortKey::FileSize, ascending: false };
        let items = fixture.db.all_items(lib, sort, "").expect("query");
        let ids: Vec<i64> = items.iter().map(|i| i.item_id).collect();
        // Equal sizes fall back to item_id ascending.
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
