//! Shelf provisioning: one library shelf per catalog tag name.
//!
//! Provisioning only ever adds shelves. Existing shelves are matched by exact
//! name and never renamed or removed, so a second run over unchanged input
//! yields an empty batch.

use std::collections::{BTreeSet, HashSet};

use uuid::Uuid;

use crate::error::ProvisionError;
use crate::types::{NewShelf, RunTimestamp, SourceLink, TagName};

/// Account that owns shelves created by the sync when nothing else is configured.
pub const DEFAULT_OWNER_ID: i64 = 1;

/// Distinct tag names that have at least one book association.
pub fn tag_names<'a, I>(source_links: I) -> BTreeSet<TagName>
where
    I: IntoIterator<Item = &'a SourceLink>,
{
    source_links
        .into_iter()
        .map(|link| link.tag_name.clone())
        .collect()
}

/// Reject a batch in which two rows share a name.
pub fn validate_batch(batch: &[NewShelf]) -> Result<(), ProvisionError> {
    let mut seen = HashSet::with_capacity(batch.len());
    for shelf in batch {
        if !seen.insert(shelf.name.as_str()) {
            return Err(ProvisionError::DuplicateName {
                name: shelf.name.clone(),
            });
        }
    }
    Ok(())
}

/// Synthesizes the shelf rows the library is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioner {
    pub owner_id: i64,
}

impl Default for Provisioner {
    fn default() -> Self {
        Self {
            owner_id: DEFAULT_OWNER_ID,
        }
    }
}

impl Provisioner {
    pub fn new(owner_id: i64) -> Self {
        Self { owner_id }
    }

    /// Build a private, non-synced shelf for every tag name absent from
    /// `existing`, in lexicographic tag order.
    pub fn provision(
        &self,
        existing: &HashSet<String>,
        tag_names: &BTreeSet<TagName>,
        now: RunTimestamp,
    ) -> Result<Vec<NewShelf>, ProvisionError> {
        let batch: Vec<NewShelf> = tag_names
            .iter()
            .filter(|tag| !existing.contains(tag.as_str()))
            .map(|tag| self.new_shelf(tag, now))
            .collect();

        validate_batch(&batch)?;
        for shelf in &batch {
            tracing::debug!("provisioning shelf {:?} ({})", shelf.name, shelf.uuid);
        }
        Ok(batch)
    }

    fn new_shelf(&self, tag: &TagName, now: RunTimestamp) -> NewShelf {
        NewShelf {
            name: tag.0.clone(),
            is_public: false,
            user_id: self.owner_id,
            uuid: Uuid::new_v4().to_string(),
            created: now,
            last_modified: now,
            kobo_sync: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn now() -> RunTimestamp {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn tags(names: &[&str]) -> BTreeSet<TagName> {
        names.iter().map(|n| TagName::from(*n)).collect()
    }

    fn existing(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn creates_one_shelf_per_missing_tag_in_order() {
        let batch = Provisioner::default()
            .provision(&existing(&["horror"]), &tags(&["sci-fi", "horror", "classics"]), now())
            .unwrap();
        let names: Vec<_> = batch.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["classics", "sci-fi"]);
    }

    #[test]
    fn new_shelves_are_private_owned_and_stamped() {
        let batch = Provisioner::new(4)
            .provision(&HashSet::new(), &tags(&["sci-fi"]), now())
            .unwrap();
        let shelf = &batch[0];
        assert!(!shelf.is_public);
        assert!(!shelf.kobo_sync);
        assert_eq!(shelf.user_id, 4);
        assert_eq!(shelf.created, now());
        assert_eq!(shelf.last_modified, now());
        assert!(Uuid::parse_str(&shelf.uuid).is_ok(), "uuid must parse");
    }

    #[test]
    fn uuids_are_unique_within_batch() {
        let batch = Provisioner::default()
            .provision(&HashSet::new(), &tags(&["a", "b", "c"]), now())
            .unwrap();
        let uuids: HashSet<_> = batch.iter().map(|s| s.uuid.as_str()).collect();
        assert_eq!(uuids.len(), 3);
    }

    #[test]
    fn name_match_is_case_sensitive() {
        let batch = Provisioner::default()
            .provision(&existing(&["Sci-Fi"]), &tags(&["sci-fi"]), now())
            .unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn second_run_is_a_noop() {
        let provisioner = Provisioner::default();
        let wanted = tags(&["fantasy", "sci-fi"]);
        let mut seen = existing(&["fantasy"]);

        let first = provisioner.provision(&seen, &wanted, now()).unwrap();
        seen.extend(first.into_iter().map(|s| s.name));
        let second = provisioner.provision(&seen, &wanted, now()).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn validate_batch_rejects_duplicate_names() {
        let shelf = Provisioner::default().new_shelf(&TagName::from("dup"), now());
        let err = validate_batch(&[shelf.clone(), shelf]).unwrap_err();
        assert_eq!(
            err,
            ProvisionError::DuplicateName {
                name: "dup".to_string()
            }
        );
    }

    #[test]
    fn tag_names_deduplicates() {
        let links = vec![
            SourceLink::new(1, "sci-fi"),
            SourceLink::new(2, "sci-fi"),
            SourceLink::new(2, "horror"),
        ];
        assert_eq!(tag_names(&links), tags(&["horror", "sci-fi"]));
    }
}
