use axum::{
    extract::{FromRequest, Request, State},
    http::{StatusCode, header},
    response::Json,
};
use serde::{Deserialize, Serialize};
use sweep_model::{ContentTypeInfo, ScanProgress, ScanSnapshot};
use tracing::info;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// Content types scanned when a request names none.
pub const DEFAULT_SCAN_TYPES: &[&str] = &["post", "page"];

fn default_scan_types() -> Vec<String> {
    DEFAULT_SCAN_TYPES.iter().map(|t| t.to_string()).collect()
}

#[derive(Debug, Deserialize)]
pub struct StartScanRequest {
    #[serde(default = "default_scan_types")]
    pub content_types: Vec<String>,
}

impl Default for StartScanRequest {
    fn default() -> Self {
        Self {
            content_types: default_scan_types(),
        }
    }
}

/// Start request body. A request without a body scans the default types;
/// a body that does not decode is a 400 in the usual error shape.
#[derive(Debug)]
pub struct ScanRequestBody(pub StartScanRequest);

impl<S> FromRequest<S> for ScanRequestBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        if !req.headers().contains_key(header::CONTENT_TYPE) {
            return Ok(Self(StartScanRequest::default()));
        }
        let Json(request) = Json::<StartScanRequest>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        Ok(Self(request))
    }
}

#[derive(Debug, Serialize)]
pub struct StartScanResponse {
    #[serde(flatten)]
    pub progress: ScanProgress,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_types: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ContentTypesResponse {
    pub content_types: Vec<ContentTypeInfo>,
}

/// Starts a fresh scan and answers with the progress after its first batch.
pub async fn start_scan_handler(
    State(state): State<AppState>,
    ScanRequestBody(request): ScanRequestBody,
) -> AppResult<Json<StartScanResponse>> {
    let outcome = state.coordinator().start(&request.content_types).await?;
    info!(
        scan_id = %outcome.progress.scan_id,
        total = outcome.progress.total,
        "maintenance scan started over HTTP"
    );
    Ok(Json(StartScanResponse {
        progress: outcome.progress,
        ignored_types: outcome.ignored_types,
    }))
}

/// Runs the next batch of the processing scan.
pub async fn continue_scan_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ScanProgress>> {
    Ok(Json(state.coordinator().continue_current().await?))
}

pub async fn scan_status_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ScanSnapshot>> {
    Ok(Json(state.coordinator().status().await?))
}

pub async fn reset_scan_handler(
    State(state): State<AppState>,
) -> AppResult<StatusCode> {
    state.coordinator().reset().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Public content types, the default selection offered to operators.
pub async fn content_types_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ContentTypesResponse>> {
    let content_types = state.coordinator().public_content_types().await?;
    Ok(Json(ContentTypesResponse { content_types }))
}
