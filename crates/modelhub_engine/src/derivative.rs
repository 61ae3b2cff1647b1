//! Translation-job submission and manifest observation.

use async_trait::async_trait;
use serde::Deserialize;

use modelhub_core::{Diagnostic, TranslationStatus};

use crate::poll::StatusSource;
use crate::{AuthClient, BackendError, INTERNAL_SCOPE};

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    status: String,
    #[serde(default)]
    progress: Option<String>,
    #[serde(default)]
    derivatives: Vec<ManifestDerivative>,
}

#[derive(Debug, Deserialize)]
struct ManifestDerivative {
    #[serde(default)]
    messages: Vec<ManifestMessage>,
    #[serde(default)]
    children: Vec<ManifestChild>,
}

#[derive(Debug, Deserialize)]
struct ManifestChild {
    #[serde(default)]
    messages: Vec<ManifestMessage>,
}

#[derive(Debug, Deserialize)]
struct ManifestMessage {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

/// Adapter for the translation backend's job and manifest surface.
#[derive(Clone)]
pub struct DerivativeClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthClient,
}

impl DerivativeClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, auth: AuthClient) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            auth,
        }
    }

    /// Queues a translation job for the encoded object identifier.
    ///
    /// `root_filename` is set only for compressed-archive uploads; it marks
    /// the input as compressed and names the entry-point file inside it.
    /// The call returns as soon as the job is accepted; completion is
    /// observed later through [`DerivativeClient::manifest`].
    pub async fn submit_job(
        &self,
        urn: &str,
        root_filename: Option<&str>,
    ) -> Result<(), BackendError> {
        let mut input = serde_json::json!({ "urn": urn });
        if let Some(root) = root_filename {
            input["compressedUrn"] = serde_json::json!(true);
            input["rootFilename"] = serde_json::json!(root);
        }
        let job = serde_json::json!({
            "input": input,
            "output": {
                "formats": [{ "type": "svf", "views": ["2d", "3d"] }],
            },
        });

        let token = self.auth.token(INTERNAL_SCOPE).await?.access_token;
        let response = self
            .http
            .post(format!(
                "{}/modelderivative/v2/designdata/job",
                self.base_url
            ))
            .bearer_auth(token)
            .json(&job)
            .send()
            .await
            .map_err(BackendError::transport)?;
        if !response.status().is_success() {
            return Err(BackendError::from_response(response).await);
        }
        Ok(())
    }

    /// Fetches the manifest for `urn` and maps it onto the observed
    /// translation lifecycle. A 404 means no job record exists.
    pub async fn manifest(&self, urn: &str) -> Result<TranslationStatus, BackendError> {
        let token = self.auth.token(INTERNAL_SCOPE).await?.access_token;
        let response = self
            .http
            .get(format!(
                "{}/modelderivative/v2/designdata/{urn}/manifest",
                self.base_url
            ))
            .bearer_auth(token)
            .send()
            .await
            .map_err(BackendError::transport)?;
        if response.status().as_u16() == 404 {
            return Ok(TranslationStatus::Absent);
        }
        if !response.status().is_success() {
            return Err(BackendError::from_response(response).await);
        }
        let manifest: Manifest = response.json().await.map_err(BackendError::transport)?;
        Ok(map_manifest(manifest))
    }
}

fn map_manifest(manifest: Manifest) -> TranslationStatus {
    match manifest.status.as_str() {
        "pending" => TranslationStatus::Pending,
        "inprogress" => TranslationStatus::InProgress {
            progress: manifest.progress.unwrap_or_else(|| "inprogress".to_string()),
        },
        "failed" => TranslationStatus::Failed {
            messages: flatten_messages(&manifest.derivatives),
        },
        // "success", "timeout" and anything the backend adds later are
        // terminal; the viewer decides what to do with the result.
        _ => TranslationStatus::Complete,
    }
}

/// Flattens the manifest's nested diagnostics in document order: each
/// derivative's own messages, then its children's, derivative by derivative.
fn flatten_messages(derivatives: &[ManifestDerivative]) -> Vec<Diagnostic> {
    let mut flattened = Vec::new();
    for derivative in derivatives {
        flattened.extend(derivative.messages.iter().map(to_diagnostic));
        for child in &derivative.children {
            flattened.extend(child.messages.iter().map(to_diagnostic));
        }
    }
    flattened
}

fn to_diagnostic(message: &ManifestMessage) -> Diagnostic {
    Diagnostic {
        code: message.code.clone(),
        message: message.message.clone(),
    }
}

#[async_trait]
impl StatusSource for DerivativeClient {
    async fn status(&self, urn: &str) -> Result<TranslationStatus, BackendError> {
        self.manifest(urn).await
    }
}
