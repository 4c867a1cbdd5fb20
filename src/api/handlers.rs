use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::credentials::{CredentialUpload, ValidatedIdentity};
use crate::errors::AppError;
use crate::inventory::models::WasteReport;
use crate::AppState;

/// Multipart field carrying the key file.
pub const CREDENTIAL_FIELD: &str = "credential_file";

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AuthenticateResponse {
    pub success: bool,
    pub message: &'static str,
    pub project_id: String,
    pub client_email: String,
}

impl From<ValidatedIdentity> for AuthenticateResponse {
    fn from(identity: ValidatedIdentity) -> Self {
        Self {
            success: true,
            message: "Successfully authenticated with GCP",
            project_id: identity.project_id,
            client_email: identity.client_email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UnusedResourcesParams {
    pub project_id: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────

/// POST /api/authenticate/gcp — validate and test-authenticate a key file
pub async fn authenticate_gcp(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AuthenticateResponse>, AppError> {
    let upload = match multipart {
        Ok(multipart) => read_credential_part(multipart).await?,
        Err(rejection) => {
            tracing::debug!("request has no multipart body: {}", rejection);
            None
        }
    };

    let identity = state.validator.validate(upload).await?;
    Ok(Json(identity.into()))
}

/// GET /api/gcp/unused-resources — idle resources and their cost
pub async fn get_unused_resources(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UnusedResourcesParams>,
) -> Result<Json<WasteReport>, AppError> {
    let report = state.reporter.report(params.project_id.as_deref()).await?;
    Ok(Json(report))
}

/// GET /api/health
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn fallback_404() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// Pulls the first `credential_file` part that carries a filename.
/// Parts without a filename are plain form fields and do not count.
async fn read_credential_part(
    mut multipart: Multipart,
) -> Result<Option<CredentialUpload>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(e.body_text()))?
    {
        if field.name() != Some(CREDENTIAL_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidUpload(e.body_text()))?;
        return Ok(Some(CredentialUpload {
            file_name,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}
