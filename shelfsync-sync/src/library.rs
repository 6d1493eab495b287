//! Read/write access to the library database (`app.db`).
//!
//! Tables used (existing schema, written column-for-column):
//!
//! ```text
//! shelf(id, uuid, name, is_public, user_id, kobo_sync, created, last_modified)
//! book_shelf_link(id, book_id, "order", shelf, date_added)
//! ```
//!
//! Writers take `&Connection` so they can run on a plain connection or inside
//! a `rusqlite::Transaction`; the pipeline owns transaction boundaries.

use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::{params, Connection, OpenFlags};

use shelfsync_core::{
    provision::validate_batch,
    types::format_timestamp,
    BookId, NewLink, NewShelf, Shelf, ShelfId, ShelfLink,
};

use crate::error::{db_err, SyncError};

/// Open the library read-write. A missing file is an error, never created.
pub fn open(path: &Path) -> Result<Connection, SyncError> {
    if !path.exists() {
        return Err(SyncError::MissingDatabase {
            path: path.to_path_buf(),
        });
    }
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
        .map_err(|e| db_err(format!("opening library {}", path.display()), e))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// `(id, name)` of every named shelf. Rows with a NULL name match no tag and
/// are skipped.
pub fn read_shelves(conn: &Connection) -> Result<Vec<Shelf>, SyncError> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM shelf")
        .map_err(|e| db_err("preparing shelf query", e))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((ShelfId(row.get(0)?), row.get::<_, Option<String>>(1)?))
        })
        .map_err(|e| db_err("reading shelves", e))?;

    let mut shelves = Vec::new();
    for row in rows {
        match row.map_err(|e| db_err("decoding shelves", e))? {
            (id, Some(name)) => shelves.push(Shelf { id, name }),
            (id, None) => tracing::warn!("skipping shelf {id} with no name"),
        }
    }
    Ok(shelves)
}

/// Every `(book_id, shelf)` membership key.
pub fn read_links(conn: &Connection) -> Result<BTreeSet<ShelfLink>, SyncError> {
    let mut stmt = conn
        .prepare("SELECT book_id, shelf FROM book_shelf_link")
        .map_err(|e| db_err("preparing shelf link query", e))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ShelfLink {
                book_id: BookId(row.get(0)?),
                shelf_id: ShelfId(row.get(1)?),
            })
        })
        .map_err(|e| db_err("reading shelf links", e))?;
    rows.collect::<Result<BTreeSet<_>, _>>()
        .map_err(|e| db_err("decoding shelf links", e))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Append new shelves. The batch is validated before anything is written.
pub fn insert_shelves(conn: &Connection, shelves: &[NewShelf]) -> Result<usize, SyncError> {
    validate_batch(shelves)?;
    if shelves.is_empty() {
        return Ok(0);
    }

    let mut stmt = conn
        .prepare(
            "INSERT INTO shelf (name, is_public, user_id, uuid, created, last_modified, kobo_sync)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(|e| db_err("preparing shelf insert", e))?;
    for shelf in shelves {
        stmt.execute(params![
            shelf.name,
            shelf.is_public,
            shelf.user_id,
            shelf.uuid,
            format_timestamp(&shelf.created),
            format_timestamp(&shelf.last_modified),
            shelf.kobo_sync,
        ])
        .map_err(|e| db_err(format!("inserting shelf {:?}", shelf.name), e))?;
        tracing::debug!("inserted shelf {:?}", shelf.name);
    }
    Ok(shelves.len())
}

/// Append new membership rows.
pub fn insert_links(conn: &Connection, links: &BTreeSet<NewLink>) -> Result<usize, SyncError> {
    if links.is_empty() {
        return Ok(0);
    }

    let mut stmt = conn
        .prepare("INSERT INTO book_shelf_link (book_id, shelf, date_added) VALUES (?1, ?2, ?3)")
        .map_err(|e| db_err("preparing shelf link insert", e))?;
    for link in links {
        stmt.execute(params![
            link.book_id.0,
            link.shelf_id.0,
            format_timestamp(&link.date_added),
        ])
        .map_err(|e| {
            db_err(
                format!("inserting link book {} shelf {}", link.book_id, link.shelf_id),
                e,
            )
        })?;
    }
    Ok(links.len())
}

/// Delete membership rows by exact `(book_id, shelf)` match.
///
/// Returns the number of rows removed, which can exceed `links.len()` if the
/// library holds duplicate rows for one key.
pub fn delete_links(conn: &Connection, links: &BTreeSet<ShelfLink>) -> Result<usize, SyncError> {
    if links.is_empty() {
        return Ok(0);
    }

    let mut stmt = conn
        .prepare("DELETE FROM book_shelf_link WHERE book_id = ?1 AND shelf = ?2")
        .map_err(|e| db_err("preparing shelf link delete", e))?;
    let mut removed = 0;
    for link in links {
        removed += stmt
            .execute(params![link.book_id.0, link.shelf_id.0])
            .map_err(|e| {
                db_err(
                    format!("deleting link book {} shelf {}", link.book_id, link.shelf_id),
                    e,
                )
            })?;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use shelfsync_core::{ProvisionError, Provisioner, TagName};

    use super::*;

    fn library() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE shelf (
                 id INTEGER PRIMARY KEY, uuid VARCHAR, name VARCHAR, is_public INTEGER,
                 user_id INTEGER, kobo_sync BOOLEAN, created DATETIME, last_modified DATETIME);
             CREATE TABLE book_shelf_link (
                 id INTEGER PRIMARY KEY, book_id INTEGER, \"order\" INTEGER,
                 shelf INTEGER, date_added DATETIME);",
        )
        .unwrap();
        conn
    }

    fn now() -> shelfsync_core::RunTimestamp {
        NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_micro_opt(23, 59, 59, 500_000)
            .unwrap()
    }

    fn new_shelves(names: &[&str]) -> Vec<NewShelf> {
        let tags: BTreeSet<TagName> = names.iter().map(|n| TagName::from(*n)).collect();
        Provisioner::default()
            .provision(&Default::default(), &tags, now())
            .unwrap()
    }

    #[test]
    fn inserted_shelves_match_library_columns() {
        let conn = library();
        insert_shelves(&conn, &new_shelves(&["sci-fi"])).unwrap();

        let (name, is_public, user_id, created, kobo_sync): (String, i64, i64, String, i64) = conn
            .query_row(
                "SELECT name, is_public, user_id, created, kobo_sync FROM shelf",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
            )
            .unwrap();
        assert_eq!(name, "sci-fi");
        assert_eq!(is_public, 0);
        assert_eq!(user_id, 1);
        assert_eq!(created, "2024-02-29 23:59:59.500000");
        assert_eq!(kobo_sync, 0);

        let shelves = read_shelves(&conn).unwrap();
        assert_eq!(shelves.len(), 1);
        assert_eq!(shelves[0].name, "sci-fi");
    }

    #[test]
    fn unnamed_shelf_is_skipped() {
        let conn = library();
        conn.execute_batch(
            "INSERT INTO shelf (id, name) VALUES (5, NULL);
             INSERT INTO shelf (id, name) VALUES (6, 'horror');",
        )
        .unwrap();

        let shelves = read_shelves(&conn).unwrap();
        assert_eq!(
            shelves,
            vec![Shelf {
                id: ShelfId(6),
                name: "horror".to_string(),
            }]
        );
    }

    #[test]
    fn duplicate_batch_writes_nothing() {
        let conn = library();
        let mut batch = new_shelves(&["dup"]);
        batch.push(batch[0].clone());

        let err = insert_shelves(&conn, &batch).unwrap_err();
        assert!(matches!(
            err,
            SyncError::DuplicateName(ProvisionError::DuplicateName { .. })
        ));
        assert!(read_shelves(&conn).unwrap().is_empty());
    }

    #[test]
    fn links_insert_and_delete_by_key() {
        let conn = library();
        let links: BTreeSet<NewLink> = [(1, 10), (2, 10), (3, 11)]
            .into_iter()
            .map(|(b, s)| NewLink {
                book_id: BookId(b),
                shelf_id: ShelfId(s),
                date_added: now(),
            })
            .collect();
        assert_eq!(insert_links(&conn, &links).unwrap(), 3);

        let gone: BTreeSet<_> = [ShelfLink::new(2, 10), ShelfLink::new(9, 9)]
            .into_iter()
            .collect();
        assert_eq!(delete_links(&conn, &gone).unwrap(), 1);

        let left = read_links(&conn).unwrap();
        let expected: BTreeSet<_> = [ShelfLink::new(1, 10), ShelfLink::new(3, 11)]
            .into_iter()
            .collect();
        assert_eq!(left, expected);
    }

    #[test]
    fn date_added_is_stored_as_text_timestamp() {
        let conn = library();
        let links: BTreeSet<NewLink> = [NewLink {
            book_id: BookId(1),
            shelf_id: ShelfId(1),
            date_added: now(),
        }]
        .into_iter()
        .collect();
        insert_links(&conn, &links).unwrap();
        let stored: String = conn
            .query_row("SELECT date_added FROM book_shelf_link", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, "2024-02-29 23:59:59.500000");
    }
}
