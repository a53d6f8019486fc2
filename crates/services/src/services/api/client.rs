use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use reqwest::{RequestBuilder, Response, StatusCode, multipart};
use url::Url;

use super::types::{
    ImportForm, ImportedProfile, PathTestRequest, PathTestResponse, ProfileEditorSave,
    ProfilePatch, ProfileUpload, RemoteProfile,
};
use crate::error::{CuraEngineError, Result, ValidationError};
use crate::services::config::CuraEngineConfig;
use crate::services::profile_editor::{EditorSchema, ProfileValues};

/// Login state of the embedding application.
pub trait Session: Send + Sync {
    /// API key sent as `X-Api-Key`, if the user is logged in.
    fn api_key(&self) -> Option<String>;
}

/// A session whose API key never changes.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    api_key: Option<String>,
}

impl StaticSession {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl Session for StaticSession {
    fn api_key(&self) -> Option<String> {
        self.api_key.clone()
    }
}

#[derive(Clone)]
pub struct CuraEngineClient {
    base_url: Url,
    slicer: String,
    session: Arc<dyn Session>,
    client: reqwest::Client,
}

impl CuraEngineClient {
    pub fn new(config: &CuraEngineConfig, session: Arc<dyn Session>) -> Result<Self> {
        let mut raw = config.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).map_err(|source| CuraEngineError::InvalidUrl {
            url: config.base_url.clone(),
            source,
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            slicer: config.slicer.clone(),
            session,
            client,
        })
    }

    pub fn slicer(&self) -> &str {
        &self.slicer
    }

    /// Fetch every profile of the slicer, in server order.
    pub async fn list_profiles(&self) -> Result<IndexMap<String, RemoteProfile>> {
        let url = self.api_url(&format!("slicing/{}/profiles", self.slicer))?;
        let response = self.send(self.client.get(url), &[]).await?;
        Ok(response.json().await?)
    }

    /// Apply `patch` to the profile behind `resource`.
    pub async fn update_profile(&self, resource: &str, patch: ProfilePatch) -> Result<()> {
        let url = self.resolve(resource)?;
        tracing::info!("Updating slicing profile at {} with {:?}", url, patch);
        self.send(self.client.patch(url).json(&patch), &[]).await?;
        Ok(())
    }

    pub async fn delete_profile(&self, resource: &str) -> Result<()> {
        let url = self.resolve(resource)?;
        tracing::info!("Deleting slicing profile at {}", url);
        self.send(self.client.delete(url), &[]).await?;
        Ok(())
    }

    /// Ask the server whether `path` is an executable file.
    pub async fn test_path(&self, path: &str) -> Result<PathTestResponse> {
        let url = self.api_url("util/test")?;
        let body = PathTestRequest::executable_file(path);
        let response = self.send(self.client.post(url).json(&body), &[]).await?;
        Ok(response.json().await?)
    }

    /// Current values of one profile, as stored by the server.
    pub async fn profile_values(&self, profile_id: &str) -> Result<ProfileValues> {
        let url = self.plugin_url("getProfileDict")?;
        let request = self.client.get(url).query(&[("profile_id", profile_id)]);
        let response = self.send(request, &[]).await?;
        Ok(response.json().await?)
    }

    /// Category/setting structure the profile editor is rendered from.
    pub async fn editor_schema(&self) -> Result<EditorSchema> {
        let url = self.plugin_url("getProfileEditorStruct")?;
        let response = self.send(self.client.get(url), &[]).await?;
        Ok(response.json().await?)
    }

    pub async fn save_profile_values(&self, profile_id: &str, values: &ProfileValues) -> Result<()> {
        let url = self.plugin_url("profileEditorSave")?;
        let body = ProfileEditorSave {
            profile_id,
            profile_data: values,
        };
        self.send(self.client.post(url).json(&body), &[StatusCode::BAD_REQUEST])
            .await?;
        Ok(())
    }

    /// Upload a profile file. Name collisions and unreadable files are
    /// reported as [`ValidationError::Rejected`].
    pub async fn import_profile(
        &self,
        upload: ProfileUpload,
        form: &ImportForm,
    ) -> Result<ImportedProfile> {
        let url = self.plugin_url("import")?;

        let part = multipart::Part::bytes(upload.contents).file_name(upload.file_name.clone());
        let mut multipart = multipart::Form::new().part("file", part);
        for (name, value) in form.fields() {
            multipart = multipart.text(name, value);
        }

        tracing::info!(
            "Importing profile file {} (overwrite allowed: {})",
            upload.file_name,
            form.allow_overwrite
        );

        let response = self
            .send(
                self.client.post(url).multipart(multipart),
                &[StatusCode::BAD_REQUEST, StatusCode::CONFLICT],
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Full settings document of the server.
    pub async fn load_settings(&self) -> Result<serde_json::Value> {
        let url = self.api_url("settings")?;
        let response = self.send(self.client.get(url), &[]).await?;
        Ok(response.json().await?)
    }

    /// Merge `patch` into the server's settings.
    pub async fn save_settings(&self, patch: &serde_json::Value) -> Result<()> {
        let url = self.api_url("settings")?;
        self.send(self.client.post(url).json(patch), &[]).await?;
        Ok(())
    }

    fn api_url(&self, path: &str) -> Result<Url> {
        self.join(&format!("api/{path}"))
    }

    fn plugin_url(&self, endpoint: &str) -> Result<Url> {
        self.join(&format!("plugin/{}/{endpoint}", self.slicer))
    }

    /// Resource locators may be absolute or relative to the server root.
    fn resolve(&self, resource: &str) -> Result<Url> {
        self.join(resource)
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|source| CuraEngineError::InvalidUrl {
                url: path.to_string(),
                source,
            })
    }

    /// Send `request`, turning statuses in `rejectable` into validation
    /// failures and any other non-success status into an HTTP error.
    async fn send(&self, request: RequestBuilder, rejectable: &[StatusCode]) -> Result<Response> {
        let mut request = request;
        if let Some(key) = self.session.api_key() {
            request = request.header("X-Api-Key", key);
        }

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("Failed to reach slicing server: {}", e);
                return Err(e.into());
            }
        };

        let status = response.status();
        tracing::debug!("{} -> {}", response.url(), status);
        if status.is_success() {
            return Ok(response);
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if rejectable.contains(&status) {
            tracing::warn!("Request rejected by server ({}): {}", status, text);
            return Err(ValidationError::Rejected {
                status: status.as_u16(),
                message: text,
            }
            .into());
        }

        tracing::error!("Slicing server error response {}: {}", status, text);
        Err(CuraEngineError::Http {
            status: status.as_u16(),
            body: text,
        })
    }
}
