//! `POST /upload-document`
//!
//! Key check (middleware) → content type check → text extraction → summary.
//! Each step either hands its output to the next or ends the request.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    middleware,
    routing::post,
    Json, Router,
};
use tracing::info;

use crate::documents::{self, DocumentKind};
use crate::middleware::require_api_key;
use crate::models::{AppState, SummaryResponse, UploadedDocument};
use crate::types::{AppError, AppResult};

const FILE_FIELD: &str = "file";

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/upload-document", post(upload_document))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[tracing::instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
async fn upload_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<SummaryResponse>> {
    let mut multipart = multipart.map_err(|e| {
        AppError::InvalidRequest(format!("not a multipart upload: {}", e.body_text()))
    })?;
    let document = read_upload(&mut multipart).await?;
    info!(
        "Received {} upload {:?} as {} ({} bytes)",
        document.kind,
        document.filename.as_deref().unwrap_or("<unnamed>"),
        document.content_type,
        document.bytes.len()
    );

    let text = documents::extract_text(document.kind, document.bytes).await?;
    let summary = state.summarizer.summarize(&text).await?;

    Ok(Json(SummaryResponse { summary }))
}

/// Pull the first file field out of the form.
///
/// The declared content type is checked before the body of the field is read.
async fn read_upload(multipart: &mut Multipart) -> AppResult<UploadedDocument> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.file_name().is_none() && field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().unwrap_or_default().to_string();
        let kind = DocumentKind::from_mime(&content_type)
            .ok_or_else(|| AppError::UnsupportedType(content_type.clone()))?;

        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok(UploadedDocument {
            filename,
            kind,
            content_type,
            bytes,
        });
    }

    Err(AppError::InvalidRequest("No file uploaded".to_string()))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidRequest(format!("malformed multipart body: {}", err.body_text()))
    }
}
