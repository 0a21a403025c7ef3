// src/web/api.rs
// Route handlers

use axum::{
    Extension, Form, Json,
    extract::{FromRequest, Multipart, Request, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::{ApiError, ApiResult};
use super::middleware::RequestId;
use super::page::render_index;
use super::state::AppState;
use crate::classify::ClassificationResult;
use crate::error::TriageError;
use crate::pipeline::Upload;

/// Multipart field carrying the upload
pub const FILE_FIELD: &str = "file";

/// Form field carrying pasted text
pub const TEXT_FIELD: &str = "text";

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(state.settings.max_upload_mb, state.settings.max_chars))
}

pub async fn favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

pub async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true }))
}

#[derive(Debug, Deserialize)]
pub struct TextForm {
    #[serde(default)]
    pub text: String,
}

/// Accepts `text` as either a urlencoded or a multipart form field
pub async fn classify_text(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    request: Request,
) -> ApiResult<Json<ClassificationResult>> {
    let text = read_text_field(request, &state).await?;
    let result = state
        .orchestrator
        .classify_text(request_id.as_str(), &text)
        .await?;
    Ok(Json(result))
}

/// A missing field reads as empty text
async fn read_text_field(request: Request, state: &AppState) -> ApiResult<String> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        });

    if !is_multipart {
        let Form(form) = Form::<TextForm>::from_request(request, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        return Ok(form.text);
    }

    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() == Some(TEXT_FIELD) {
            return field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()));
        }
    }
    Ok(String::new())
}

pub async fn classify_file(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> ApiResult<Json<ClassificationResult>> {
    let validator = state.orchestrator.validator();
    let limit_mb = validator.max_upload_mb();
    let ceiling = validator.max_upload_bytes() as usize;

    let mut upload = None;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit_mb))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();

        // Type is checked before the body is read
        validator.check_type(&filename, &content_type)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, limit_mb))?
        {
            if bytes.len() + chunk.len() > ceiling {
                return Err(TriageError::PayloadTooLarge { limit_mb }.into());
            }
            bytes.extend_from_slice(&chunk);
        }

        upload = Some(Upload::new(filename, content_type, bytes));
        break;
    }

    let upload = upload.ok_or_else(|| ApiError::bad_request("missing file field"))?;
    let result = state
        .orchestrator
        .classify_file(request_id.as_str(), upload)
        .await?;
    Ok(Json(result))
}

/// Body-limit rejections read as a too-large upload; anything else is a bad request
fn multipart_error(err: MultipartError, limit_mb: u64) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        TriageError::PayloadTooLarge { limit_mb }.into()
    } else {
        ApiError::bad_request(err.body_text())
    }
}
