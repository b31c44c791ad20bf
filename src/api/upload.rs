use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tower_cookies::Cookies;

use s3_console::console::{self, UploadFile};
use s3_console::error::ConsoleError;

use crate::api::{current_session, fail, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub bucket: String,
    pub uploaded: Vec<String>,
}

fn bad_body(err: impl std::fmt::Display) -> ConsoleError {
    ConsoleError::UploadFailed(format!("invalid multipart body: {}", err))
}

/// POST /api/objects/upload/:bucket - 上传文件到桶根目录
pub async fn upload(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Path(bucket): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let session = current_session(&state, &cookies)?;

    let mut files = Vec::new();
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| fail(&state, &cookies, bad_body(e)))?
    {
        if !matches!(field.name(), Some("file") | Some("files")) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| fail(&state, &cookies, bad_body(e)))?
        {
            data.extend_from_slice(&chunk);
        }
        files.push(UploadFile { name, data: Bytes::from(data) });
    }

    let uploaded = console::upload(session.store.as_ref(), &bucket, &files)
        .await
        .map_err(|err| fail(&state, &cookies, err))?;
    Ok(Json(ApiResponse::success_with_message(
        format!("Uploaded {} file(s) successfully.", uploaded.len()),
        UploadResponse { bucket, uploaded },
    )))
}
