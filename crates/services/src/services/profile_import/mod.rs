//! Profile import staging.
//!
//! Selecting a file derives a suggested profile key, display name and
//! description from its name. The suggestions fill whatever the user leaves
//! empty when the import is submitted.

use chrono::{DateTime, Local};
use cura_engine_utils::{names, time};

use crate::services::api::ImportForm;

/// Suggestions derived from a selected profile file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStagingRecord {
    pub file_name: String,
    pub derived_key: String,
    pub derived_display_name: String,
    pub derived_description: String,
    pub make_default: bool,
    pub allow_overwrite: bool,
}

impl ImportStagingRecord {
    /// Metadata that submits the suggestions unchanged.
    pub fn metadata(&self) -> ImportMetadata {
        ImportMetadata {
            make_default: self.make_default,
            allow_overwrite: self.allow_overwrite,
            ..ImportMetadata::default()
        }
    }
}

/// What the user entered in the import dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMetadata {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub make_default: bool,
    pub allow_overwrite: bool,
}

impl Default for ImportMetadata {
    fn default() -> Self {
        Self {
            name: None,
            display_name: None,
            description: None,
            make_default: false,
            allow_overwrite: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportStaging {
    staged: Option<ImportStagingRecord>,
    make_default: bool,
}

impl ImportStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset the "make default" flag for the next staged file.
    pub fn open(&mut self, make_default: bool) {
        self.make_default = make_default;
    }

    pub fn on_file_selected(&mut self, file_name: &str) -> &ImportStagingRecord {
        self.on_file_selected_at(file_name, Local::now())
    }

    pub fn on_file_selected_at(
        &mut self,
        file_name: &str,
        at: DateTime<Local>,
    ) -> &ImportStagingRecord {
        let base = names::strip_extension(file_name);
        let record = ImportStagingRecord {
            file_name: file_name.to_string(),
            derived_key: names::sanitize_profile_name(base),
            derived_display_name: base.to_string(),
            derived_description: format!(
                "Imported from {file_name} on {}",
                time::format_display(&at)
            ),
            make_default: self.make_default,
            allow_overwrite: true,
        };

        tracing::debug!(
            "Staged profile import {} as {}",
            record.file_name,
            record.derived_key
        );
        self.staged.insert(record)
    }

    pub fn staged(&self) -> Option<&ImportStagingRecord> {
        self.staged.as_ref()
    }

    /// Build the submitted form; user-supplied fields win over suggestions.
    pub fn form(&self, metadata: &ImportMetadata) -> ImportForm {
        let pick = |user: &Option<String>, suggested: fn(&ImportStagingRecord) -> &String| {
            user.clone()
                .or_else(|| self.staged.as_ref().map(|staged| suggested(staged).clone()))
        };

        ImportForm {
            allow_overwrite: metadata.allow_overwrite,
            name: pick(&metadata.name, |s| &s.derived_key),
            display_name: pick(&metadata.display_name, |s| &s.derived_display_name),
            description: pick(&metadata.description, |s| &s.derived_description),
            make_default: metadata.make_default,
        }
    }

    pub fn on_cancel_or_complete(&mut self) {
        self.staged = None;
        self.make_default = false;
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_none()
    }
}
