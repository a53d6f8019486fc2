use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::RwLock;

use crate::services::api::CuraEngineClient;

const ENGINE_PATH_KEY: &str = "cura_engine_path";

/// Persistence for the engine executable path.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load_engine_path(&self) -> Result<Option<String>>;
    async fn save_engine_path(&self, path: &str) -> Result<()>;
}

/// Keeps the path in the server's plugin settings.
#[derive(Clone)]
pub struct RemoteSettingsStore {
    client: CuraEngineClient,
}

impl RemoteSettingsStore {
    pub fn new(client: CuraEngineClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SettingsStore for RemoteSettingsStore {
    async fn load_engine_path(&self) -> Result<Option<String>> {
        let settings = self
            .client
            .load_settings()
            .await
            .context("Failed to load server settings")?;

        let path = settings
            .pointer(&format!("/plugins/{}/{ENGINE_PATH_KEY}", self.client.slicer()))
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(path)
    }

    async fn save_engine_path(&self, path: &str) -> Result<()> {
        let patch = json!({
            "plugins": {
                (self.client.slicer()): { (ENGINE_PATH_KEY): path }
            }
        });
        self.client
            .save_settings(&patch)
            .await
            .context("Failed to save engine path")?;

        tracing::info!("Saved engine path {}", path);
        Ok(())
    }
}

/// In-process store for embedding without a server and for tests.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    engine_path: RwLock<Option<String>>,
}

impl MemorySettingsStore {
    pub fn new(engine_path: Option<String>) -> Self {
        Self {
            engine_path: RwLock::new(engine_path),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load_engine_path(&self) -> Result<Option<String>> {
        Ok(self.engine_path.read().await.clone())
    }

    async fn save_engine_path(&self, path: &str) -> Result<()> {
        *self.engine_path.write().await = Some(path.to_string());
        Ok(())
    }
}
