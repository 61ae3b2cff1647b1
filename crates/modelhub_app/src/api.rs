//! Thin route handlers for the `/api` surface.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use modelhub_core::TranslationStatus;
use modelhub_engine::{AccessToken, UrnEntry, PUBLIC_SCOPE};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ModelsQuery {
    /// Encoded bucket token; absent means the default bucket.
    bucket: Option<String>,
}

/// `GET /api/models?bucket=<token>`
pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ModelsQuery>,
) -> Result<Json<Vec<UrnEntry>>, ApiError> {
    let bucket = query
        .bucket
        .filter(|token| !token.is_empty())
        .map(|token| modelhub_core::decode(&token))
        .transpose()?;
    Ok(Json(state.workflow.list_models(bucket.as_deref()).await?))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    messages: Option<Vec<DiagnosticView>>,
}

#[derive(Debug, Serialize)]
pub struct DiagnosticView {
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    message: String,
}

impl From<TranslationStatus> for StatusResponse {
    fn from(status: TranslationStatus) -> Self {
        match status {
            TranslationStatus::Absent => Self {
                status: "n/a",
                progress: None,
                messages: None,
            },
            TranslationStatus::Pending => Self {
                status: "pending",
                progress: None,
                messages: None,
            },
            TranslationStatus::InProgress { progress } => Self {
                status: "inprogress",
                progress: Some(progress),
                messages: None,
            },
            TranslationStatus::Failed { messages } => Self {
                status: "failed",
                progress: None,
                messages: Some(
                    messages
                        .into_iter()
                        .map(|diagnostic| DiagnosticView {
                            code: diagnostic.code,
                            message: diagnostic.message,
                        })
                        .collect(),
                ),
            },
            TranslationStatus::Complete => Self {
                status: "success",
                progress: None,
                messages: None,
            },
        }
    }
}

/// `GET /api/models/:urn/status`
pub async fn model_status(
    State(state): State<AppState>,
    Path(urn): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    // Reject malformed tokens before they reach the backend.
    modelhub_core::decode(&urn)?;
    let status = state.derivative.manifest(&urn).await?;
    Ok(Json(status.into()))
}

/// `POST /api/models` (multipart form)
pub async fn upload_model(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UrnEntry>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut bucket_urn: Option<String> = None;
    let mut zip_entrypoint: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name().map(str::to_string).as_deref() {
            Some("model-file") => {
                let file_name = field.file_name().unwrap_or("model").to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("bucket-urn") => {
                bucket_urn = non_empty(field.text().await.map_err(bad_multipart)?);
            }
            Some("model-zip-entrypoint") => {
                zip_entrypoint = non_empty(field.text().await.map_err(bad_multipart)?);
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| {
        ApiError::ClientInput("missing required field model-file".to_string())
    })?;
    let bucket = bucket_urn
        .map(|token| modelhub_core::decode(&token))
        .transpose()?;

    let entry = state
        .workflow
        .upload_and_translate(&file_name, bytes, bucket.as_deref(), zip_entrypoint.as_deref())
        .await?;
    Ok(Json(entry))
}

/// `GET /api/buckets`
pub async fn list_buckets(
    State(state): State<AppState>,
) -> Result<Json<Vec<UrnEntry>>, ApiError> {
    Ok(Json(state.workflow.list_buckets().await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketRequest {
    bucket_name: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    success: bool,
    message: String,
}

/// `POST /api/buckets`
pub async fn create_bucket(
    State(state): State<AppState>,
    Json(request): Json<BucketRequest>,
) -> Result<Json<UrnEntry>, ApiError> {
    let key = modelhub_core::normalize_bucket_key(&request.bucket_name)?;
    Ok(Json(state.workflow.create_bucket(&key).await?))
}

/// `DELETE /api/buckets`
pub async fn delete_bucket(
    State(state): State<AppState>,
    Json(request): Json<BucketRequest>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let key = modelhub_core::normalize_bucket_key(&request.bucket_name)?;
    state.workflow.delete_bucket(&key).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: format!("bucket {key} deleted"),
    }))
}

/// `GET /api/auth/token` — viewer-scoped token for the browser.
pub async fn auth_token(State(state): State<AppState>) -> Result<Json<AccessToken>, ApiError> {
    Ok(Json(state.auth.token(PUBLIC_SCOPE).await?))
}

fn bad_multipart(err: MultipartError) -> ApiError {
    ApiError::ClientInput(format!("malformed multipart body: {err}"))
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
