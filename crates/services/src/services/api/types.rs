use serde::{Deserialize, Serialize};

/// One entry of the slicer profile listing, keyed by profile key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProfile {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Missing and `null` both mean "not the default"
    #[serde(default)]
    pub default: Option<bool>,
    /// Locator used for updates and deletes of this profile; empty when the
    /// server does not expose one
    #[serde(default)]
    pub resource: String,
}

/// Body of a profile update request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfilePatch {
    pub default: bool,
}

impl ProfilePatch {
    pub fn make_default() -> Self {
        Self { default: true }
    }
}

/// Request body for the server's path check utility
#[derive(Debug, Clone, Serialize)]
pub struct PathTestRequest {
    pub command: &'static str,
    pub path: String,
    pub check_type: &'static str,
    pub check_access: &'static str,
}

impl PathTestRequest {
    /// Check that `path` is a regular file the server may execute.
    pub fn executable_file(path: impl Into<String>) -> Self {
        Self {
            command: "path",
            path: path.into(),
            check_type: "file",
            check_access: "x",
        }
    }
}

/// Response of the path check utility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct PathTestResponse {
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub typeok: bool,
    #[serde(default)]
    pub access: bool,
}

/// Body of an editor save request
#[derive(Debug, Clone, Serialize)]
pub struct ProfileEditorSave<'a> {
    pub profile_id: &'a str,
    pub profile_data: &'a serde_json::Map<String, serde_json::Value>,
}

/// Form fields sent alongside an imported profile file.
///
/// Optional fields are only sent when set; the server derives its own
/// defaults for anything missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportForm {
    pub allow_overwrite: bool,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub make_default: bool,
}

impl ImportForm {
    /// Multipart text fields in submission order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("allowOverwrite", self.allow_overwrite.to_string())];

        if let Some(name) = &self.name {
            fields.push(("name", name.clone()));
        }
        if let Some(display_name) = &self.display_name {
            fields.push(("displayName", display_name.clone()));
        }
        if let Some(description) = &self.description {
            fields.push(("description", description.clone()));
        }
        if self.make_default {
            fields.push(("default", "true".to_string()));
        }

        fields
    }
}

/// A profile file to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpload {
    pub file_name: String,
    pub contents: Vec<u8>,
}

/// Server response for a successful import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedProfile {
    pub resource: String,
    pub name: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}
