//! Read-only access to the catalog database (`metadata.db`).
//!
//! Tables used:
//!
//! ```text
//! books(id, title, author_sort, ...)
//! tags(id, name)
//! books_tags_link(book, tag)
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use shelfsync_core::{BookId, BookInfo, SourceLink, TagName};

use crate::error::{db_err, SyncError};

/// Everything a run needs from the catalog, loaded once at the start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    /// Book↔tag associations.
    pub links: BTreeSet<SourceLink>,
    /// Every tag name, including tags attached to no book.
    pub tags: BTreeSet<TagName>,
}

/// Open the catalog read-only. A missing file is an error, never created.
pub fn open(path: &Path) -> Result<Connection, SyncError> {
    if !path.exists() {
        return Err(SyncError::MissingDatabase {
            path: path.to_path_buf(),
        });
    }
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| db_err(format!("opening catalog {}", path.display()), e))
}

/// Book↔tag associations joined to tag names.
pub fn read_links(conn: &Connection) -> Result<BTreeSet<SourceLink>, SyncError> {
    let mut stmt = conn
        .prepare(
            "SELECT books_tags_link.book, tags.name
             FROM books_tags_link
             JOIN tags ON books_tags_link.tag = tags.id",
        )
        .map_err(|e| db_err("preparing catalog link query", e))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SourceLink {
                book_id: BookId(row.get(0)?),
                tag_name: TagName(row.get(1)?),
            })
        })
        .map_err(|e| db_err("reading catalog links", e))?;
    rows.collect::<Result<BTreeSet<_>, _>>()
        .map_err(|e| db_err("decoding catalog links", e))
}

/// Every tag name in the catalog.
pub fn read_tag_names(conn: &Connection) -> Result<BTreeSet<TagName>, SyncError> {
    let mut stmt = conn
        .prepare("SELECT name FROM tags")
        .map_err(|e| db_err("preparing catalog tag query", e))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0).map(TagName))
        .map_err(|e| db_err("reading catalog tags", e))?;
    rows.collect::<Result<BTreeSet<_>, _>>()
        .map_err(|e| db_err("decoding catalog tags", e))
}

/// Title and author of every catalog book, keyed by id. Used only for reports.
pub fn read_books(conn: &Connection) -> Result<HashMap<BookId, BookInfo>, SyncError> {
    let mut stmt = conn
        .prepare("SELECT id, title, author_sort FROM books")
        .map_err(|e| db_err("preparing catalog book query", e))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(BookInfo {
                id: BookId(row.get(0)?),
                title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                author: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })
        .map_err(|e| db_err("reading catalog books", e))?;

    let mut books = HashMap::new();
    for book in rows {
        let book = book.map_err(|e| db_err("decoding catalog books", e))?;
        books.insert(book.id, book);
    }
    Ok(books)
}

/// Load the catalog snapshot for one run.
pub fn read_snapshot(conn: &Connection) -> Result<CatalogSnapshot, SyncError> {
    let snapshot = CatalogSnapshot {
        links: read_links(conn)?,
        tags: read_tag_names(conn)?,
    };
    tracing::info!(
        "catalog snapshot: {} tag link(s), {} tag(s)",
        snapshot.links.len(),
        snapshot.tags.len()
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT, author_sort TEXT);
             CREATE TABLE tags (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             CREATE TABLE books_tags_link (id INTEGER PRIMARY KEY, book INTEGER, tag INTEGER);
             INSERT INTO books VALUES (1, 'Dune', 'Herbert, Frank'), (2, 'Solaris', NULL);
             INSERT INTO tags VALUES (1, 'sci-fi'), (2, 'unused');
             INSERT INTO books_tags_link (book, tag) VALUES (1, 1), (2, 1);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn links_are_joined_to_tag_names() {
        let links = read_links(&catalog()).unwrap();
        let expected: BTreeSet<_> = [SourceLink::new(1, "sci-fi"), SourceLink::new(2, "sci-fi")]
            .into_iter()
            .collect();
        assert_eq!(links, expected);
    }

    #[test]
    fn tag_names_include_unused_tags() {
        let tags = read_tag_names(&catalog()).unwrap();
        assert!(tags.contains(&TagName::from("unused")));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn null_author_reads_as_empty() {
        let books = read_books(&catalog()).unwrap();
        assert_eq!(books[&BookId(1)].author, "Herbert, Frank");
        assert_eq!(books[&BookId(2)].author, "");
    }

    #[test]
    fn open_missing_file_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("metadata.db");
        let err = open(&path).unwrap_err();
        assert!(matches!(err, SyncError::MissingDatabase { .. }));
        assert!(!path.exists(), "open must not create the catalog");
    }
}
