use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CuraEngineError>;

/// Coarse classification of [`CuraEngineError`] used by the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Validation,
    Settings,
}

#[derive(Debug, Error)]
pub enum CuraEngineError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Server returned {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Editor for profile '{profile_id}' has not finished loading")]
    EditorNotReady { profile_id: String },
    #[error("Settings store failed: {0}")]
    Settings(#[from] anyhow::Error),
}

impl CuraEngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::Http { .. } | Self::InvalidUrl { .. } => ErrorKind::Network,
            Self::Validation(_) | Self::EditorNotReady { .. } => ErrorKind::Validation,
            Self::Settings(_) => ErrorKind::Settings,
        }
    }

    /// Stable error code for display and logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "NETWORK_ERROR",
            Self::Http { .. } => "HTTP_ERROR",
            Self::InvalidUrl { .. } => "INVALID_URL",
            Self::Validation(ValidationError::Fields(_)) => "VALIDATION_ERROR",
            Self::Validation(ValidationError::Rejected { .. }) => "REJECTED",
            Self::EditorNotReady { .. } => "EDITOR_NOT_READY",
            Self::Settings(_) => "SETTINGS_ERROR",
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// One or more form values failed to coerce to their setting's type.
    #[error("Invalid values for settings: {0}")]
    Fields(FieldErrors),
    /// The server refused the request, e.g. a profile name collision.
    #[error("Rejected by server ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ValidationError {
    /// Setting keys flagged by a form validation failure; empty for remote rejections.
    pub fn flagged_keys(&self) -> Vec<&str> {
        match self {
            Self::Fields(fields) => fields.keys().collect(),
            Self::Rejected { .. } => Vec::new(),
        }
    }
}

/// Why a single raw form value was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("'{raw}' is not a whole number")]
    NotAnInteger { raw: String },
    #[error("'{raw}' is not a number")]
    NotANumber { raw: String },
    #[error("'{raw}' is not a finite number")]
    NotFinite { raw: String },
    #[error("'{raw}' is not one of the allowed options")]
    UnknownOption { raw: String },
    #[error("no such setting")]
    UnknownSetting,
}

/// Every failing setting of a form submission, keyed by setting key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, FieldError>);

impl FieldErrors {
    pub fn insert(&mut self, key: impl Into<String>, error: FieldError) {
        self.0.insert(key.into(), error);
    }

    pub fn get(&self, key: &str) -> Option<&FieldError> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, error) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{key} ({error})")?;
            first = false;
        }
        Ok(())
    }
}
