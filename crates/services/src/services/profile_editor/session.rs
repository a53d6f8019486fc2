use super::form::{FormSpec, RawFormValues, SchemaFormModel};
use super::schema::{EditorSchema, ProfileValues};
use crate::error::{CuraEngineError, Result};
use crate::services::api::CuraEngineClient;

/// State of one open profile editor.
///
/// Schema and current values arrive from independent requests and fill
/// independent slots; the form becomes available once both are present.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    profile_id: String,
    model: Option<SchemaFormModel>,
    values: Option<ProfileValues>,
}

impl EditSession {
    pub fn new(profile_id: impl Into<String>) -> Self {
        Self {
            profile_id: profile_id.into(),
            model: None,
            values: None,
        }
    }

    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }

    pub fn apply_schema(&mut self, schema: EditorSchema) {
        self.model = Some(SchemaFormModel::new(schema));
    }

    pub fn apply_values(&mut self, values: ProfileValues) {
        self.values = Some(values);
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some() && self.values.is_some()
    }

    pub fn model(&self) -> Option<&SchemaFormModel> {
        self.model.as_ref()
    }

    pub fn values(&self) -> Option<&ProfileValues> {
        self.values.as_ref()
    }

    /// The rendered form, once both slots are filled.
    pub fn form(&self) -> Option<FormSpec> {
        match (&self.model, &self.values) {
            (Some(model), Some(values)) => Some(model.build(values)),
            _ => None,
        }
    }
}

/// Opens and saves profile edit sessions against the server.
#[derive(Clone)]
pub struct ProfileEditor {
    client: CuraEngineClient,
}

impl ProfileEditor {
    pub fn new(client: CuraEngineClient) -> Self {
        Self { client }
    }

    /// Fetch schema and current values concurrently and open a session.
    pub async fn open(&self, profile_id: &str) -> Result<EditSession> {
        let mut session = EditSession::new(profile_id);

        let (values, schema) = tokio::join!(
            self.client.profile_values(profile_id),
            self.client.editor_schema()
        );

        match schema {
            Ok(schema) => session.apply_schema(schema),
            Err(e) => {
                tracing::error!("Failed to load profile editor structure: {}", e);
                return Err(e);
            }
        }
        match values {
            Ok(values) => session.apply_values(values),
            Err(e) => {
                tracing::error!("Failed to load values of profile {}: {}", profile_id, e);
                return Err(e);
            }
        }

        tracing::debug!(
            "Opened editor for profile {} ({} settings)",
            profile_id,
            session.model().map_or(0, |m| m.schema().len())
        );
        Ok(session)
    }

    /// Validate `raw` and send it to the server.
    ///
    /// Nothing is sent when validation fails. On success the session's
    /// values are replaced by what was saved.
    pub async fn save(&self, session: &mut EditSession, raw: &RawFormValues) -> Result<ProfileValues> {
        let model = session
            .model
            .as_ref()
            .ok_or_else(|| CuraEngineError::EditorNotReady {
                profile_id: session.profile_id.clone(),
            })?;

        let values = model.collect(raw)?;

        if let Err(e) = self
            .client
            .save_profile_values(&session.profile_id, &values)
            .await
        {
            tracing::error!("Failed to save profile {}: {}", session.profile_id, e);
            return Err(e);
        }

        tracing::info!("Saved profile {} ({} values)", session.profile_id, values.len());
        session.values = Some(values.clone());
        Ok(values)
    }
}
