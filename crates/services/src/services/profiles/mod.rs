pub mod optimistic;
pub mod service;
pub mod store;


pub use optimistic::{ChangeKind, ChangeStatus, OptimisticChange, OptimisticChanges};
pub use service::{Mutation, NoopListener, ProfileListListener, ProfileSyncService, RefreshOutcome};
pub use store::{DEFAULT_PAGE_SIZE, OrderedView, ProfileRecord, ProfileRecordStore, SortKey};
