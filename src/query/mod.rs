//! Query construction: predicates, sort resolution, and the read services.

pub mod expr;
pub mod folders;
pub mod items;
pub mod sort;
pub mod tags;

pub use expr::{escape_like, search_predicates, Expr};
pub use folders::COVER_SEARCH_MAX_DEPTH;
pub use sort::{
    resolve_item_sort, FolderSort, FolderSortKey, FolderSortOverride, ItemSortKey, SortSelection,
};
pub use tags::TagScope;
