//! Link reconciliation: diff catalog tag membership against library shelf
//! membership.
//!
//! The catalog relation `(book, tag name)` is translated into library space
//! `(book, shelf id)` through the shelf name mapping. The result is compared
//! with the library's current links:
//!
//! ```text
//! to_add    = translated \ library
//! to_remove = library \ translated      (restricted by RemovalPolicy)
//! ```
//!
//! ## Known limitation of `RemovalPolicy::Sweep`
//!
//! `Sweep` diffs against the whole translated image, so links on a shelf
//! that has no catalog tag at all (a hand-made shelf) are proposed for
//! removal too. `RemovalPolicy::TaggedShelvesOnly` confines removals to
//! shelves whose name matches a catalog tag.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::types::{NewLink, RunTimestamp, Shelf, ShelfId, ShelfLink, SourceLink, TagName};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A catalog tag with no shelf of the same name. Its links are skipped for
/// this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingGap {
    pub tag_name: TagName,
    /// Number of catalog associations dropped because of the gap.
    pub links: usize,
}

/// Which library links are eligible for removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// Any library link absent from the translated image is removed.
    #[default]
    Sweep,
    /// Only links on shelves named after a tag in `catalog_tags` are
    /// removed. `catalog_tags` should hold every tag the catalog knows,
    /// including tags with no books.
    TaggedShelvesOnly { catalog_tags: BTreeSet<TagName> },
}

/// Output of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub to_add: BTreeSet<NewLink>,
    pub to_remove: BTreeSet<ShelfLink>,
    pub gaps: Vec<MappingGap>,
}

impl Reconciliation {
    /// True when the library already matches the catalog.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Shelf ids keyed by shelf name. A name shared by several shelves maps to
/// all of them, in ascending id order.
pub type NameMap = HashMap<TagName, Vec<ShelfId>>;

/// Map shelf names to shelf ids.
///
/// Shelf names are expected to be unique. If they are not, a tag fans out to
/// every shelf carrying its name, so none of them loses its links.
pub fn name_to_id(shelves: &[Shelf]) -> NameMap {
    let mut map: NameMap = HashMap::with_capacity(shelves.len());
    for shelf in shelves {
        map.entry(TagName::from(shelf.name.as_str()))
            .or_default()
            .push(shelf.id);
    }
    for (name, ids) in map.iter_mut() {
        ids.sort_unstable();
        ids.dedup();
        if ids.len() > 1 {
            tracing::warn!(
                "shelf name {:?} is used by {} shelves; linking tag to all of them",
                name.as_str(),
                ids.len()
            );
        }
    }
    map
}

/// Translate catalog links into library space.
///
/// Tags missing from `name_to_id` are reported as [`MappingGap`]s and logged;
/// they never abort the run.
pub fn translate(
    source_links: &BTreeSet<SourceLink>,
    name_to_id: &NameMap,
) -> (BTreeSet<ShelfLink>, Vec<MappingGap>) {
    let mut translated = BTreeSet::new();
    let mut missing: BTreeMap<&TagName, usize> = BTreeMap::new();

    for link in source_links {
        match name_to_id.get(&link.tag_name) {
            Some(shelf_ids) => {
                translated.extend(shelf_ids.iter().map(|shelf_id| ShelfLink {
                    book_id: link.book_id,
                    shelf_id: *shelf_id,
                }));
            }
            None => *missing.entry(&link.tag_name).or_default() += 1,
        }
    }

    let gaps: Vec<MappingGap> = missing
        .into_iter()
        .map(|(tag_name, links)| MappingGap {
            tag_name: tag_name.clone(),
            links,
        })
        .collect();
    for gap in &gaps {
        tracing::warn!(
            "tag {:?} has no shelf; skipping {} link(s) this run",
            gap.tag_name.as_str(),
            gap.links
        );
    }

    (translated, gaps)
}

// ---------------------------------------------------------------------------
// Reconcile
// ---------------------------------------------------------------------------

/// Compute the insert and delete sets with [`RemovalPolicy::Sweep`].
pub fn reconcile(
    source_links: &BTreeSet<SourceLink>,
    dest_links: &BTreeSet<ShelfLink>,
    name_to_id: &NameMap,
    now: RunTimestamp,
) -> Reconciliation {
    reconcile_with(source_links, dest_links, name_to_id, now, &RemovalPolicy::Sweep)
}

/// Compute the insert and delete sets under an explicit removal policy.
pub fn reconcile_with(
    source_links: &BTreeSet<SourceLink>,
    dest_links: &BTreeSet<ShelfLink>,
    name_to_id: &NameMap,
    now: RunTimestamp,
    policy: &RemovalPolicy,
) -> Reconciliation {
    let (translated, gaps) = translate(source_links, name_to_id);

    let removable: Option<HashSet<ShelfId>> = match policy {
        RemovalPolicy::Sweep => None,
        RemovalPolicy::TaggedShelvesOnly { catalog_tags } => Some(
            catalog_tags
                .iter()
                .filter_map(|tag| name_to_id.get(tag))
                .flatten()
                .copied()
                .collect(),
        ),
    };

    let to_remove: BTreeSet<ShelfLink> = dest_links
        .difference(&translated)
        .filter(|link| {
            removable
                .as_ref()
                .map_or(true, |ids| ids.contains(&link.shelf_id))
        })
        .copied()
        .collect();

    let to_add: BTreeSet<NewLink> = translated
        .difference(dest_links)
        .map(|link| NewLink {
            book_id: link.book_id,
            shelf_id: link.shelf_id,
            date_added: now,
        })
        .collect();

    tracing::debug!(
        "reconciled {} catalog link(s) against {} library link(s): +{} -{}",
        source_links.len(),
        dest_links.len(),
        to_add.len(),
        to_remove.len()
    );

    Reconciliation {
        to_add,
        to_remove,
        gaps,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
