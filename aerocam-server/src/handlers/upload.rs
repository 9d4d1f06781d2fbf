//! Camera upload endpoint.
//!
//! Multipart fields: `token`, optional `filename`, and `file`. Every field is
//! read before any check runs so the checks happen in a fixed order no matter
//! how the client orders its fields. A url-encoded body is read for its
//! `token` and `filename` only.

use std::sync::Arc;

use aerocam_core::{UploadBuffer, UploadSubmission, UploadedFile};
use axum::{
    Form, Json,
    extract::{
        FromRequest, Request, State,
        multipart::{Field, Multipart, MultipartError},
    },
    http::{HeaderMap, StatusCode, header},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::AppState;
use crate::infra::errors::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub filename: String,
}

/// Text fields of a url-encoded upload form. Such a form can never carry
/// the file, but its token still decides between 401 and 400.
#[derive(Debug, Default, Deserialize)]
struct FormFields {
    token: Option<String>,
    filename: Option<String>,
}

pub async fn upload_photo(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<Json<UploadResponse>> {
    let submission = if is_multipart(request.headers()) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|rejection| AppError::bad_request(format!("Malformed upload: {rejection}")))?;
        read_submission(multipart, state.inbox.policy().max_bytes).await?
    } else {
        read_form(request, &state).await?
    };

    let inbox = Arc::clone(&state.inbox);
    let stored = tokio::task::spawn_blocking(move || inbox.accept(submission)).await??;

    info!("Upload accepted: {}", stored.filename);
    Ok(Json(UploadResponse {
        status: "success",
        filename: stored.filename,
    }))
}

pub async fn method_not_allowed() -> AppError {
    AppError::method_not_allowed("Use POST")
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
}

/// Anything that is not multipart: read a url-encoded token if there is
/// one, otherwise treat the body as an empty form.
async fn read_form(request: Request, state: &AppState) -> AppResult<UploadSubmission> {
    match Form::<FormFields>::from_request(request, state).await {
        Ok(Form(fields)) => Ok(UploadSubmission {
            token: fields.token,
            filename: fields.filename,
            file: None,
        }),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(AppError::payload_too_large("File too large"))
        }
        Err(rejection) => {
            debug!("Upload without a readable form body: {}", rejection);
            Ok(UploadSubmission::default())
        }
    }
}

async fn read_submission(mut multipart: Multipart, limit: u64) -> AppResult<UploadSubmission> {
    let mut submission = UploadSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("token") => {
                submission.token = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("filename") => {
                submission.filename = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("file") => {
                submission.file = read_file(field, limit).await?;
            }
            other => {
                debug!("Ignoring multipart field {:?}", other);
            }
        }
    }

    Ok(submission)
}

/// An empty part with no client filename is a form with no file chosen.
async fn read_file(mut field: Field<'_>, limit: u64) -> AppResult<Option<UploadedFile>> {
    let declared_type = field.content_type().map(str::to_owned);
    let client_name = field.file_name().map(str::to_owned);

    let mut buffer = UploadBuffer::new(limit);
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        buffer.push(&chunk);
    }

    if buffer.size() == 0 && client_name.as_deref().is_none_or(str::is_empty) {
        return Ok(None);
    }

    if buffer.is_over_limit() {
        debug!(
            "Upload {:?} exceeds {} bytes ({} received)",
            client_name,
            limit,
            buffer.size()
        );
    }

    Ok(Some(buffer.finish(declared_type)))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large("File too large")
    } else {
        AppError::bad_request(format!("Malformed upload: {}", err.body_text()))
    }
}
