//! Domain types shared by the catalog (source) and library (destination) sides.
//!
//! Every identifier is a newtype so a book id can never be passed where a
//! shelf id is expected. Set-valued relations use `BTreeSet` so iteration
//! order is deterministic for logging and tests.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp captured once at the start of a run and threaded through every
/// component that stamps rows.
pub type RunTimestamp = NaiveDateTime;

/// Text layout the library database uses for its datetime columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Render a [`RunTimestamp`] the way the library database stores it.
pub fn format_timestamp(ts: &RunTimestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A book identifier. Both databases share the same numeric space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookId(pub i64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for BookId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Primary key of a row in the library's `shelf` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShelfId(pub i64);

impl fmt::Display for ShelfId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for ShelfId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A tag name from the catalog. Shelves are matched to tags by exact,
/// case-sensitive name equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagName(pub String);

impl TagName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TagName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TagName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Relation rows
// ---------------------------------------------------------------------------

/// One book↔tag association in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLink {
    pub book_id: BookId,
    pub tag_name: TagName,
}

impl SourceLink {
    pub fn new(book_id: impl Into<BookId>, tag_name: impl Into<TagName>) -> Self {
        Self {
            book_id: book_id.into(),
            tag_name: tag_name.into(),
        }
    }
}

/// Key of one book↔shelf membership in the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShelfLink {
    pub book_id: BookId,
    pub shelf_id: ShelfId,
}

impl ShelfLink {
    pub fn new(book_id: impl Into<BookId>, shelf_id: impl Into<ShelfId>) -> Self {
        Self {
            book_id: book_id.into(),
            shelf_id: shelf_id.into(),
        }
    }
}

/// A membership row about to be inserted.
///
/// Ordering and equality consider the key first, so a set of `NewLink`
/// built from one timestamp behaves like a set of keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NewLink {
    pub book_id: BookId,
    pub shelf_id: ShelfId,
    pub date_added: RunTimestamp,
}

impl NewLink {
    pub fn key(&self) -> ShelfLink {
        ShelfLink {
            book_id: self.book_id,
            shelf_id: self.shelf_id,
        }
    }
}

/// A shelf as read back from the library.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Shelf {
    pub id: ShelfId,
    pub name: String,
}

/// A shelf row about to be inserted. Field names follow the library's
/// `shelf` table columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShelf {
    pub name: String,
    pub is_public: bool,
    pub user_id: i64,
    pub uuid: String,
    pub created: RunTimestamp,
    pub last_modified: RunTimestamp,
    pub kobo_sync: bool,
}

/// Display metadata for a catalog book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInfo {
    pub id: BookId,
    pub title: String,
    /// The catalog's `author_sort` column.
    pub author: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
