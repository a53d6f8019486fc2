use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::services::api::RemoteProfile;

/// Profiles shown per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Local projection of one slicing profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub key: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_default: bool,
    /// Locator for remote update/delete calls
    pub resource: String,
}

impl ProfileRecord {
    pub fn from_remote(key: String, remote: RemoteProfile) -> Self {
        Self {
            key,
            name: remote.display_name,
            description: remote.description,
            is_default: remote.default.unwrap_or_default(),
            resource: remote.resource,
        }
    }
}

/// Comparator used to order the profile list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortKey {
    /// Case-insensitive by key
    #[default]
    Id,
    /// Case-insensitive by display name; a missing name sorts as ""
    Name,
}

impl SortKey {
    pub fn compare(self, a: &ProfileRecord, b: &ProfileRecord) -> Ordering {
        match self {
            SortKey::Id => a.key.to_lowercase().cmp(&b.key.to_lowercase()),
            SortKey::Name => {
                let a = a.name.as_deref().unwrap_or_default().to_lowercase();
                let b = b.name.as_deref().unwrap_or_default().to_lowercase();
                a.cmp(&b)
            }
        }
    }
}

/// Keyed, deduplicated collection of profile records.
///
/// Contents are replaced wholesale by [`upsert_all`](Self::upsert_all); the
/// only local edits are the optimistic default toggle and removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileRecordStore {
    records: IndexMap<String, ProfileRecord>,
}

impl ProfileRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the store hold exactly `records`.
    ///
    /// Existing keys are updated in place, new keys inserted and keys missing
    /// from `records` removed. A key repeated in the input keeps its last
    /// occurrence.
    pub fn upsert_all(&mut self, records: impl IntoIterator<Item = ProfileRecord>) {
        let mut next: IndexMap<String, ProfileRecord> = IndexMap::new();

        for record in records {
            match self.records.shift_remove(&record.key) {
                Some(mut existing) => {
                    existing.name = record.name;
                    existing.description = record.description;
                    existing.is_default = record.is_default;
                    existing.resource = record.resource;
                    next.insert(existing.key.clone(), existing);
                }
                None => {
                    next.insert(record.key.clone(), record);
                }
            }
        }

        let dropped = self.records.len();
        self.records = next;

        tracing::debug!(
            "Profile store now holds {} records ({} dropped)",
            self.records.len(),
            dropped
        );
    }

    pub fn remove_by_key(&mut self, key: &str) -> Option<ProfileRecord> {
        self.records.shift_remove(key)
    }

    /// Mark `key` as the only default profile. Returns `false` if `key` is unknown.
    pub fn mark_default(&mut self, key: &str) -> bool {
        if !self.records.contains_key(key) {
            return false;
        }
        for record in self.records.values_mut() {
            record.is_default = record.key == key;
        }
        true
    }

    pub fn get(&self, key: &str) -> Option<&ProfileRecord> {
        self.records.get(key)
    }

    pub fn find(&self, predicate: impl Fn(&ProfileRecord) -> bool) -> Option<&ProfileRecord> {
        self.records.values().find(|record| predicate(record))
    }

    pub fn default_profile(&self) -> Option<&ProfileRecord> {
        self.find(|record| record.is_default)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted by `sort`, paged by `page_size` (0 is treated as 1).
    pub fn ordered_view(&self, sort: SortKey, page_size: usize) -> OrderedView<'_> {
        let mut records: Vec<&ProfileRecord> = self.records.values().collect();
        records.sort_by(|a, b| sort.compare(a, b));

        OrderedView {
            records,
            page_size: page_size.max(1),
        }
    }
}

/// Sorted snapshot of the store, readable whole or page by page.
#[derive(Debug, Clone)]
pub struct OrderedView<'a> {
    records: Vec<&'a ProfileRecord>,
    page_size: usize,
}

impl<'a> OrderedView<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a ProfileRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn pages(&self) -> impl Iterator<Item = &[&'a ProfileRecord]> {
        self.records.chunks(self.page_size)
    }

    /// Zero-based page; empty past the end.
    pub fn page(&self, index: usize) -> &[&'a ProfileRecord] {
        self.pages().nth(index).unwrap_or_default()
    }

    pub fn page_count(&self) -> usize {
        self.records.len().div_ceil(self.page_size)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
