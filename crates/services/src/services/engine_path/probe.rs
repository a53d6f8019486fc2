use serde::Serialize;
use strum_macros::Display;

use crate::error::Result;
use crate::services::api::{CuraEngineClient, PathTestResponse};

/// Outcome of checking an engine path on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PathCheckResult {
    pub exists: bool,
    pub type_ok: bool,
    pub executable: bool,
}

impl From<PathTestResponse> for PathCheckResult {
    fn from(response: PathTestResponse) -> Self {
        Self {
            exists: response.exists,
            type_ok: response.typeok,
            executable: response.access,
        }
    }
}

impl PathCheckResult {
    /// The first failing check wins: existence, then file type, then access.
    pub fn status(&self) -> PathStatus {
        if !self.exists {
            PathStatus::NotFound
        } else if !self.type_ok {
            PathStatus::WrongType
        } else if !self.executable {
            PathStatus::NotExecutable
        } else {
            PathStatus::Valid
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PathStatus {
    Valid,
    NotFound,
    WrongType,
    NotExecutable,
}

impl PathStatus {
    pub fn message(self) -> &'static str {
        match self {
            PathStatus::Valid => "The path is valid",
            PathStatus::NotFound => "The path doesn't exist",
            PathStatus::WrongType => "The path is not a file",
            PathStatus::NotExecutable => "The path is not an executable",
        }
    }

    pub fn indicator(self) -> PathIndicator {
        match self {
            PathStatus::Valid => PathIndicator::Ok,
            PathStatus::NotFound | PathStatus::WrongType | PathStatus::NotExecutable => {
                PathIndicator::Broken
            }
        }
    }
}

/// Tri-state shown next to the path input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PathIndicator {
    Broken,
    Ok,
    /// Nothing checked since the dialog was opened or reset
    #[default]
    Neither,
}

impl From<Option<PathStatus>> for PathIndicator {
    fn from(status: Option<PathStatus>) -> Self {
        status.map_or(PathIndicator::Neither, PathStatus::indicator)
    }
}

/// Asks the server whether a path is an executable file.
#[derive(Clone)]
pub struct PathProbe {
    client: CuraEngineClient,
}

impl PathProbe {
    pub fn new(client: CuraEngineClient) -> Self {
        Self { client }
    }

    pub async fn check(&self, path: &str) -> Result<PathCheckResult> {
        let response = match self.client.test_path(path).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to check engine path {}: {}", path, e);
                return Err(e);
            }
        };

        let result = PathCheckResult::from(response);
        tracing::debug!("Engine path {} checked: {}", path, result.status());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Test every check flag combination against its status and indicator
    #[test]
    fn test_every_flag_combination_maps_to_its_status() {
        // (exists, type_ok, executable) -> status
        let table = [
            ((false, false, false), PathStatus::NotFound),
            ((false, false, true), PathStatus::NotFound),
            ((false, true, false), PathStatus::NotFound),
            ((false, true, true), PathStatus::NotFound),
            ((true, false, false), PathStatus::WrongType),
            ((true, false, true), PathStatus::WrongType),
            ((true, true, false), PathStatus::NotExecutable),
            ((true, true, true), PathStatus::Valid),
        ];

        for ((exists, type_ok, executable), expected) in table {
            let result = PathCheckResult {
                exists,
                type_ok,
                executable,
            };
            assert_eq!(result.status(), expected, "{result:?}");

            let indicator = result.status().indicator();
            let expected_indicator = if expected == PathStatus::Valid {
                PathIndicator::Ok
            } else {
                PathIndicator::Broken
            };
            assert_eq!(indicator, expected_indicator, "{result:?}");
        }
    }

    /// Test a missing path taking precedence over other flags
    #[test]
    fn test_missing_path_wins_over_other_flags() {
        let result = PathCheckResult::from(PathTestResponse {
            result: false,
            exists: false,
            typeok: true,
            access: true,
        });
        assert_eq!(result.status(), PathStatus::NotFound);
        assert_eq!(result.status().message(), "The path doesn't exist");
    }

    /// Test the indicator before any path check
    #[test]
    fn test_unchecked_path_is_neither() {
        assert_eq!(PathIndicator::from(None), PathIndicator::Neither);
        assert_eq!(PathIndicator::from(Some(PathStatus::Valid)), PathIndicator::Ok);
        assert_eq!(PathStatus::NotExecutable.to_string(), "not_executable");
    }
}
