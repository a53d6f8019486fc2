//! Slicing engine executable path: server-side probe, persistence and the
//! state of the configuration dialog that ties both together.

pub mod dialog;
pub mod probe;
pub mod settings;

pub use dialog::{EngineConfigDialog, PathView};
pub use probe::{PathCheckResult, PathIndicator, PathProbe, PathStatus};
pub use settings::{MemorySettingsStore, RemoteSettingsStore, SettingsStore};
