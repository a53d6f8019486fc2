use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::optimistic::{ChangeKind, ChangeStatus, OptimisticChanges};
use super::store::{ProfileRecord, ProfileRecordStore, SortKey};
use crate::error::{CuraEngineError, Result};
use crate::services::api::{CuraEngineClient, ImportedProfile, ProfilePatch, ProfileUpload};
use crate::services::config::{CuraEngineConfig, RefreshOrdering};
use crate::services::profile_import::{ImportMetadata, ImportStaging, ImportStagingRecord};

/// Told when the profile list changed through another view.
#[async_trait]
pub trait ProfileListListener: Send + Sync {
    async fn profiles_changed(&self);
}

/// Listener for a view without siblings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

#[async_trait]
impl ProfileListListener for NoopListener {
    async fn profiles_changed(&self) {}
}

/// What happened to a refresh once its response arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { generation: u64, profiles: usize },
    /// A refresh issued later had already been applied
    Superseded { generation: u64 },
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied { .. })
    }
}

/// Result of a local-first mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Applied,
    /// The key is unknown locally (or has no resource); nothing was sent
    NotFoundLocal,
}

#[derive(Debug, Default)]
struct SyncState {
    store: ProfileRecordStore,
    changes: OptimisticChanges,
    /// Generation of the refresh whose response the store currently reflects
    applied: u64,
}

/// Keeps a [`ProfileRecordStore`] in sync with the server's profile list.
///
/// Default toggles and deletes are applied locally before the server is
/// asked; a successful change is followed by a refresh, a failed one leaves
/// the store diverged until the next refresh.
#[derive(Clone)]
pub struct ProfileSyncService {
    client: CuraEngineClient,
    listener: Arc<dyn ProfileListListener>,
    state: Arc<RwLock<SyncState>>,
    staging: Arc<RwLock<ImportStaging>>,
    issued: Arc<AtomicU64>,
    ordering: RefreshOrdering,
    page_size: usize,
}

impl ProfileSyncService {
    pub fn new(
        client: CuraEngineClient,
        config: &CuraEngineConfig,
        listener: Arc<dyn ProfileListListener>,
    ) -> Self {
        Self {
            client,
            listener,
            state: Arc::new(RwLock::new(SyncState::default())),
            staging: Arc::new(RwLock::new(ImportStaging::new())),
            issued: Arc::new(AtomicU64::new(0)),
            ordering: config.refresh_ordering,
            page_size: config.page_size,
        }
    }

    pub fn client(&self) -> &CuraEngineClient {
        &self.client
    }

    pub fn refresh_ordering(&self) -> RefreshOrdering {
        self.ordering
    }

    /// Fetch the profile list and replace the store's contents with it.
    ///
    /// Overlapping refreshes are applied as configured by
    /// [`RefreshOrdering`]. On failure the store is left untouched.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        let profiles = match self.client.list_profiles().await {
            Ok(profiles) => profiles,
            Err(e) => {
                tracing::error!("Failed to refresh slicing profiles: {}", e);
                return Err(e);
            }
        };

        let mut state = self.state.write().await;
        if self.ordering == RefreshOrdering::Issue && generation <= state.applied {
            tracing::debug!(
                "Dropping profile refresh #{} (#{} already applied)",
                generation,
                state.applied
            );
            return Ok(RefreshOutcome::Superseded { generation });
        }

        let count = profiles.len();
        state.store.upsert_all(
            profiles
                .into_iter()
                .map(|(key, remote)| ProfileRecord::from_remote(key, remote)),
        );
        state.applied = generation;

        let settled = state.changes.settle(generation);
        if settled > 0 {
            tracing::debug!("Refresh #{} settled {} optimistic changes", generation, settled);
        }

        Ok(RefreshOutcome::Applied {
            generation,
            profiles: count,
        })
    }

    /// Make `key` the default profile.
    pub async fn set_default(&self, key: &str) -> Result<Mutation> {
        let Some(resource) = self.begin_change(key, ChangeKind::SetDefault).await else {
            return Ok(Mutation::NotFoundLocal);
        };

        if let Err(e) = self
            .client
            .update_profile(&resource, ProfilePatch::make_default())
            .await
        {
            self.fail_change(key, ChangeKind::SetDefault, &e).await;
            return Err(e);
        }

        self.confirm_change(key).await;
        self.refresh_after_change(key).await;
        Ok(Mutation::Applied)
    }

    /// Delete `key` on the server and tell sibling views about it.
    pub async fn delete(&self, key: &str) -> Result<Mutation> {
        let Some(resource) = self.begin_change(key, ChangeKind::Delete).await else {
            return Ok(Mutation::NotFoundLocal);
        };

        if let Err(e) = self.client.delete_profile(&resource).await {
            self.fail_change(key, ChangeKind::Delete, &e).await;
            return Err(e);
        }

        self.confirm_change(key).await;
        tokio::join!(
            self.refresh_after_change(key),
            self.listener.profiles_changed()
        );
        Ok(Mutation::Applied)
    }

    /// Prepare the import dialog.
    ///
    /// Without an explicit choice the new profile becomes the default only if
    /// there is no default profile yet.
    pub async fn open_import(&self, make_default: Option<bool>) {
        let make_default = match make_default {
            Some(make_default) => make_default,
            None => self.state.read().await.store.default_profile().is_none(),
        };
        self.staging.write().await.open(make_default);
    }

    pub async fn stage_import(&self, file_name: &str) -> ImportStagingRecord {
        self.staging.write().await.on_file_selected(file_name).clone()
    }

    pub async fn staged_import(&self) -> Option<ImportStagingRecord> {
        self.staging.read().await.staged().cloned()
    }

    pub async fn cancel_import(&self) {
        self.staging.write().await.on_cancel_or_complete();
    }

    /// Upload a profile file, filling fields the user left empty from the
    /// staged suggestions.
    ///
    /// Staging is kept when the server rejects the file so the user can
    /// retry with different values.
    pub async fn import(
        &self,
        upload: ProfileUpload,
        metadata: &ImportMetadata,
    ) -> Result<ImportedProfile> {
        let form = self.staging.read().await.form(metadata);

        let imported = match self.client.import_profile(upload, &form).await {
            Ok(imported) => imported,
            Err(e) => {
                tracing::error!("Profile import failed: {}", e);
                return Err(e);
            }
        };

        tracing::info!("Imported slicing profile {}", imported.name);
        self.staging.write().await.on_cancel_or_complete();

        tokio::join!(
            self.refresh_after_change(&imported.name),
            self.listener.profiles_changed()
        );
        Ok(imported)
    }

    /// Copy of the current store.
    pub async fn snapshot(&self) -> ProfileRecordStore {
        self.state.read().await.store.clone()
    }

    /// Sorted records, all pages.
    pub async fn records(&self, sort: SortKey) -> Vec<ProfileRecord> {
        let state = self.state.read().await;
        state
            .store
            .ordered_view(sort, self.page_size)
            .iter()
            .cloned()
            .collect()
    }

    /// One zero-based page of sorted records.
    pub async fn page(&self, sort: SortKey, index: usize) -> Vec<ProfileRecord> {
        let state = self.state.read().await;
        state
            .store
            .ordered_view(sort, self.page_size)
            .page(index)
            .iter()
            .map(|record| (*record).clone())
            .collect()
    }

    pub async fn page_count(&self) -> usize {
        let state = self.state.read().await;
        state.store.len().div_ceil(self.page_size.max(1))
    }

    pub async fn changes(&self) -> OptimisticChanges {
        self.state.read().await.changes.clone()
    }

    /// True while a failed change has not been corrected by a refresh.
    pub async fn is_diverged(&self) -> bool {
        self.state.read().await.changes.is_diverged()
    }

    /// Apply `kind` locally and record it as pending. Returns the resource
    /// to call, or `None` when there is nothing to send.
    async fn begin_change(&self, key: &str, kind: ChangeKind) -> Option<String> {
        let mut state = self.state.write().await;

        let resource = match state.store.get(key) {
            Some(record) if !record.resource.is_empty() => record.resource.clone(),
            Some(_) => {
                tracing::debug!("Profile {} has no resource, skipping {}", key, kind);
                return None;
            }
            None => {
                tracing::debug!("Profile {} is not known locally, skipping {}", key, kind);
                return None;
            }
        };

        match kind {
            ChangeKind::SetDefault => {
                state.store.mark_default(key);
            }
            ChangeKind::Delete => {
                state.store.remove_by_key(key);
            }
        }
        state
            .changes
            .begin(key, kind, self.issued.load(Ordering::SeqCst));

        Some(resource)
    }

    /// Refresh once the server accepted a change to `key`. The change stands
    /// either way; a failed refresh only leaves the list stale.
    async fn refresh_after_change(&self, key: &str) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(
                "Change to profile {} was accepted but the list could not be refreshed: {}",
                key,
                e
            );
        }
    }

    async fn confirm_change(&self, key: &str) {
        self.state
            .write()
            .await
            .changes
            .resolve(key, ChangeStatus::Confirmed);
    }

    async fn fail_change(&self, key: &str, kind: ChangeKind, error: &CuraEngineError) {
        self.state
            .write()
            .await
            .changes
            .resolve(key, ChangeStatus::Failed);
        tracing::warn!(
            "Could not {} profile {}, local list diverges from the server until the next refresh: {}",
            kind,
            key,
            error
        );
    }
}

/// A sibling view's change triggers a refresh of this one.
#[async_trait]
impl ProfileListListener for ProfileSyncService {
    async fn profiles_changed(&self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!("Sibling-triggered profile refresh failed: {}", e);
        }
    }
}
