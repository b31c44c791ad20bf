use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use s3_console::console::{self, BulkAction, BulkReport, FolderView};
use s3_console::error::ConsoleError;
use s3_console::storage::ObjectEntry;
use s3_console::utils::join_prefix;

use crate::api::{current_session, fail, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListObjectsRequest {
    pub bucket_name: String,
    #[serde(default)]
    pub prefix: String,
}

#[derive(Debug, Serialize)]
pub struct ListObjectsResponse {
    pub bucket: String,
    /// Flat listing under the prefix / 前缀下的全部对象
    pub keys: Vec<ObjectEntry>,
    pub view: FolderView,
    /// Destinations offered for move / copy / 可选的目标存储桶
    pub buckets: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MkdirRequest {
    pub bucket_name: String,
    pub folder_name: String,
    #[serde(default)]
    pub prefix: String,
}

#[derive(Debug, Serialize)]
pub struct MkdirResponse {
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct OperationRequest {
    pub bucket_name: String,
    #[serde(default)]
    pub selected_objects: Vec<String>,
    #[serde(default)]
    pub destination_bucket: Option<String>,
    pub action: String,
}

/// POST /api/objects/list - 列出对象
pub async fn list_objects(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<ListObjectsRequest>,
) -> ApiResult<ListObjectsResponse> {
    let session = current_session(&state, &cookies)?;
    let store = session.store.as_ref();
    let prefix = req.prefix.trim_start_matches('/');

    let keys = console::list_objects(store, &req.bucket_name, prefix)
        .await
        .map_err(|err| fail(&state, &cookies, err))?;
    let buckets = console::list_buckets(store)
        .await
        .map_err(|err| fail(&state, &cookies, err))?
        .into_iter()
        .filter(|b| b != &req.bucket_name)
        .collect();

    Ok(Json(ApiResponse::success(ListObjectsResponse {
        view: FolderView::derive(prefix, &keys),
        bucket: req.bucket_name,
        keys,
        buckets,
    })))
}

/// POST /api/objects/mkdir - 创建目录
pub async fn mkdir(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<MkdirRequest>,
) -> ApiResult<MkdirResponse> {
    let session = current_session(&state, &cookies)?;
    let folder_name = req.folder_name.trim_start_matches('/');
    if folder_name.is_empty() {
        return Err(fail(
            &state,
            &cookies,
            ConsoleError::InvalidRequest("folder name is required".to_string()),
        ));
    }
    let name = join_prefix(&req.prefix, folder_name);

    let key = console::create_folder(session.store.as_ref(), &req.bucket_name, &name)
        .await
        .map_err(|err| fail(&state, &cookies, err))?;
    Ok(Json(ApiResponse::success_with_message(
        format!("Folder '{}' created successfully.", key),
        MkdirResponse { key },
    )))
}

/// POST /api/objects/operation - 批量删除/移动/复制
pub async fn operation(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<OperationRequest>,
) -> ApiResult<BulkReport> {
    let session = current_session(&state, &cookies)?;
    let action = BulkAction::parse(&req.action, req.destination_bucket.as_deref())
        .map_err(|err| fail(&state, &cookies, err))?;

    let report = console::apply(session.store.as_ref(), &req.bucket_name, &req.selected_objects, &action)
        .await
        .map_err(|err| fail(&state, &cookies, err))?;
    Ok(Json(ApiResponse::success_with_message(report.message(), report)))
}
