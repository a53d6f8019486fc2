use std::sync::Arc;

use serde::Serialize;

use super::probe::{PathIndicator, PathProbe, PathStatus};
use super::settings::SettingsStore;
use crate::error::Result;

/// What the dialog shows next to the path input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathView {
    pub broken: bool,
    pub ok: bool,
    pub text: String,
    pub help_visible: bool,
}

/// State of the engine path configuration dialog.
pub struct EngineConfigDialog {
    probe: PathProbe,
    settings: Arc<dyn SettingsStore>,
    path: String,
    status: Option<PathStatus>,
}

impl EngineConfigDialog {
    pub fn new(probe: PathProbe, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            probe,
            settings,
            path: String::new(),
            status: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn status(&self) -> Option<PathStatus> {
        self.status
    }

    /// Load the persisted path into the input.
    pub async fn show(&mut self) -> Result<()> {
        self.path = self.settings.load_engine_path().await?.unwrap_or_default();
        self.reset();
        Ok(())
    }

    /// Check the current input on the server. A failed request leaves the
    /// indicator unchanged.
    pub async fn test(&mut self) -> Result<PathStatus> {
        let status = self.probe.check(&self.path).await?.status();
        self.status = Some(status);
        Ok(status)
    }

    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Persist the current input, then clear the indicator.
    pub async fn save(&mut self) -> Result<()> {
        self.settings.save_engine_path(&self.path).await?;
        self.reset();
        Ok(())
    }

    pub fn view(&self) -> PathView {
        let indicator = PathIndicator::from(self.status);
        let broken = indicator == PathIndicator::Broken;
        let ok = indicator == PathIndicator::Ok;

        PathView {
            broken,
            ok,
            text: self.status.map(PathStatus::message).unwrap_or_default().to_string(),
            help_visible: broken || ok,
        }
    }

    fn reset(&mut self) {
        self.status = None;
    }
}
