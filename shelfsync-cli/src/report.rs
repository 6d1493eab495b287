//! Markdown run report printed with `--log`.
//!
//! Each section is printed as soon as its phase finishes, so a failure in
//! reconciliation still leaves the shelf section on screen.

use std::collections::HashMap;

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use shelfsync_core::{BookId, BookInfo, NewShelf, Reconciliation, Shelf};
use shelfsync_sync::{
    report::{link_rows, shelf_rows, LinkRow},
    RunObserver,
};

#[derive(Tabled)]
struct ShelfTableRow {
    #[tabled(rename = "name")]
    name: String,
}

#[derive(Tabled)]
struct LinkTableRow {
    #[tabled(rename = "Shelf")]
    shelf: String,
    #[tabled(rename = "Book")]
    book: String,
    #[tabled(rename = "Author")]
    author: String,
}

impl From<LinkRow> for LinkTableRow {
    fn from(row: LinkRow) -> Self {
        Self {
            shelf: row.shelf,
            book: row.book,
            author: row.author,
        }
    }
}

/// Prints report sections to stdout as the pipeline progresses.
pub struct Reporter {
    books: HashMap<BookId, BookInfo>,
    width: usize,
    dry_run: bool,
}

impl Reporter {
    pub fn new(books: HashMap<BookId, BookInfo>, width: usize, dry_run: bool) -> Self {
        Self {
            books,
            width,
            dry_run,
        }
    }

    fn prefix(&self) -> String {
        if self.dry_run {
            format!("{} ", "[dry-run]".yellow())
        } else {
            String::new()
        }
    }

    fn render_shelves(&self, created: &[NewShelf]) -> String {
        let prefix = self.prefix();
        if created.is_empty() {
            return format!("{prefix}# No shelves to create\n");
        }
        let rows: Vec<ShelfTableRow> = shelf_rows(created)
            .into_iter()
            .map(|row| ShelfTableRow { name: row.name })
            .collect();
        format!("{prefix}# Shelves added:\n\n{}\n", markdown(rows))
    }

    /// The added and deleted sections, printed one after the other.
    fn render_links(&self, reconciliation: &Reconciliation, shelves: &[Shelf]) -> [String; 2] {
        let added = link_rows(
            reconciliation.to_add.iter().map(|link| link.key()),
            shelves,
            &self.books,
            self.width,
        );
        let removed = link_rows(
            reconciliation.to_remove.iter().copied(),
            shelves,
            &self.books,
            self.width,
        );
        [
            self.link_section(added, "Links added:", "No links to add"),
            self.link_section(removed, "Links deleted:", "No links to delete"),
        ]
    }

    fn link_section(&self, rows: Vec<LinkRow>, heading: &str, empty: &str) -> String {
        let prefix = self.prefix();
        if rows.is_empty() {
            format!("{prefix}# {empty}\n")
        } else {
            format!("{prefix}# {heading}\n\n{}\n", link_table(rows))
        }
    }
}

impl RunObserver for Reporter {
    fn shelves_provisioned(&mut self, created: &[NewShelf]) {
        println!("{}", self.render_shelves(created));
    }

    fn links_reconciled(&mut self, reconciliation: &Reconciliation, shelves: &[Shelf]) {
        for section in self.render_links(reconciliation, shelves) {
            println!("{section}");
        }
    }
}

fn link_table(rows: Vec<LinkRow>) -> String {
    markdown(rows.into_iter().map(LinkTableRow::from).collect::<Vec<_>>())
}

fn markdown<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDateTime;
    use shelfsync_core::{NewLink, ShelfId, ShelfLink};

    use super::*;

    fn books() -> HashMap<BookId, BookInfo> {
        let mut books = HashMap::new();
        books.insert(
            BookId(1),
            BookInfo {
                id: BookId(1),
                title: "Dune".into(),
                author: "Herbert, Frank".into(),
            },
        );
        books
    }

    fn shelves() -> Vec<Shelf> {
        vec![Shelf {
            id: ShelfId(10),
            name: "sci-fi".into(),
        }]
    }

    #[test]
    fn empty_outcome_uses_no_op_headings() {
        let reporter = Reporter::new(books(), 50, false);
        assert_eq!(reporter.render_shelves(&[]), "# No shelves to create\n");
        let [added, removed] = reporter.render_links(&Reconciliation::default(), &shelves());
        assert_eq!(added, "# No links to add\n");
        assert_eq!(removed, "# No links to delete\n");
    }

    #[test]
    fn added_links_render_as_markdown_table() {
        let reporter = Reporter::new(books(), 50, false);
        let reconciliation = Reconciliation {
            to_add: [NewLink {
                book_id: BookId(1),
                shelf_id: ShelfId(10),
                date_added: NaiveDateTime::default(),
            }]
            .into_iter()
            .collect(),
            to_remove: BTreeSet::new(),
            gaps: Vec::new(),
        };
        let [added, removed] = reporter.render_links(&reconciliation, &shelves());
        assert!(added.starts_with("# Links added:\n\n| Shelf"), "got: {added}");
        assert!(added.contains("| sci-fi"), "got: {added}");
        assert!(added.contains("Herbert, Frank"), "got: {added}");
        assert!(added.ends_with("|\n"), "one newline after the table: {added:?}");
        assert_eq!(removed, "# No links to delete\n");
    }

    #[test]
    fn removed_links_render_under_deleted_heading() {
        let reporter = Reporter::new(books(), 50, false);
        let reconciliation = Reconciliation {
            to_remove: [ShelfLink::new(1, 10)].into_iter().collect(),
            ..Reconciliation::default()
        };
        let [added, removed] = reporter.render_links(&reconciliation, &shelves());
        assert_eq!(added, "# No links to add\n");
        assert!(removed.starts_with("# Links deleted:\n\n"), "got: {removed}");
        assert!(removed.contains("Dune"));
    }

    #[test]
    fn dry_run_prefixes_headings() {
        let reporter = Reporter::new(books(), 50, true);
        assert!(reporter.render_shelves(&[]).contains("[dry-run]"));
    }
}
