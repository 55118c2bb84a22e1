//! Perch: the query layer of a personal media-library browser.
//!
//! Read-only, library-scoped queries over an embedded SQLite store: item and
//! folder listings with safely-escaped free-text search, per-folder sort
//! overrides, a depth-bounded cover lookup, and tag-frequency suggestions.

pub mod config;
pub mod db;
pub mod logging;
pub mod query;

pub use db::{Database, FolderRecord, ItemRecord, LibraryRecord, StoreError, TagCount};
