//! Display rows for the run report.
//!
//! Nothing here feeds back into reconciliation; the rows are built from a
//! finished [`RunOutcome`](crate::pipeline::RunOutcome).

use std::collections::HashMap;

use shelfsync_core::{BookId, BookInfo, NewShelf, Shelf, ShelfId, ShelfLink};

/// One created shelf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfRow {
    pub name: String,
}

/// One added or removed link, resolved to names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRow {
    pub shelf: String,
    pub book: String,
    pub author: String,
}

/// Keep at most `width` characters.
pub fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

pub fn shelf_rows(created: &[NewShelf]) -> Vec<ShelfRow> {
    created
        .iter()
        .map(|shelf| ShelfRow {
            name: shelf.name.clone(),
        })
        .collect()
}

/// Resolve links against shelves and books, truncate each column to `width`
/// characters and sort by shelf name.
///
/// Links whose book or shelf cannot be resolved are left out of the display.
pub fn link_rows<I>(
    links: I,
    shelves: &[Shelf],
    books: &HashMap<BookId, BookInfo>,
    width: usize,
) -> Vec<LinkRow>
where
    I: IntoIterator<Item = ShelfLink>,
{
    let shelf_names: HashMap<ShelfId, &str> = shelves
        .iter()
        .map(|shelf| (shelf.id, shelf.name.as_str()))
        .collect();

    let mut rows: Vec<LinkRow> = links
        .into_iter()
        .filter_map(|link| {
            let book = books.get(&link.book_id)?;
            let shelf = shelf_names.get(&link.shelf_id)?;
            Some(LinkRow {
                shelf: truncate(shelf, width),
                book: truncate(&book.title, width),
                author: truncate(&book.author, width),
            })
        })
        .collect();
    rows.sort_by(|a, b| a.shelf.cmp(&b.shelf));
    rows
}
