use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use super::profiles::DEFAULT_PAGE_SIZE;

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_slicer() -> String {
    "cura_engine".to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Configuration for talking to the slicing server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuraEngineConfig {
    /// Server root; API calls go to `{base_url}/api/...`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Slicer identifier used in API and plugin paths
    #[serde(default = "default_slicer")]
    pub slicer: String,
    /// Number of profiles rendered per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Which of several overlapping refreshes ends up in the store
    #[serde(default)]
    pub refresh_ordering: RefreshOrdering,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for CuraEngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            slicer: default_slicer(),
            page_size: default_page_size(),
            refresh_ordering: RefreshOrdering::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Policy for applying overlapping profile list refreshes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RefreshOrdering {
    /// Every completed refresh is applied; the last one to complete wins.
    #[default]
    Completion,
    /// A refresh completing after a later-issued one has been applied is dropped.
    Issue,
}
