use indexmap::IndexMap;
use strum_macros::Display;

/// A local change applied before the server confirmed it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ChangeKind {
    SetDefault,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ChangeStatus {
    /// Request sent, no answer yet
    Pending,
    /// Server acknowledged; waiting for the refresh that reflects it
    Confirmed,
    /// Server refused or was unreachable; the store diverges until the next refresh
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimisticChange {
    pub kind: ChangeKind,
    pub status: ChangeStatus,
    /// Refresh generation issued before the change was made
    pub(crate) issued_after: u64,
}

/// Optimistic changes per profile key.
///
/// A change is settled by the first refresh issued after it was made; until
/// then a failed change marks the store as diverged from the server.
#[derive(Debug, Clone, Default)]
pub struct OptimisticChanges {
    changes: IndexMap<String, OptimisticChange>,
}

impl OptimisticChanges {
    pub(crate) fn begin(&mut self, key: &str, kind: ChangeKind, generation: u64) {
        self.changes.insert(
            key.to_string(),
            OptimisticChange {
                kind,
                status: ChangeStatus::Pending,
                issued_after: generation,
            },
        );
    }

    pub(crate) fn resolve(&mut self, key: &str, status: ChangeStatus) {
        if let Some(change) = self.changes.get_mut(key) {
            change.status = status;
        }
    }

    /// Drop every non-pending change that a refresh issued at `generation` reflects.
    pub(crate) fn settle(&mut self, generation: u64) -> usize {
        let before = self.changes.len();
        self.changes.retain(|_, change| {
            change.status == ChangeStatus::Pending || change.issued_after >= generation
        });
        before - self.changes.len()
    }

    pub fn get(&self, key: &str) -> Option<&OptimisticChange> {
        self.changes.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptimisticChange)> {
        self.changes.iter().map(|(key, change)| (key.as_str(), change))
    }

    /// True while a failed optimistic change has not been corrected by a refresh.
    pub fn is_diverged(&self) -> bool {
        self.changes
            .values()
            .any(|change| change.status == ChangeStatus::Failed)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
