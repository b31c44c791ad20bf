use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tower_cookies::Cookies;

use s3_console::console::{self, BucketChange};

use crate::api::{current_session, fail, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBucketRequest {
    pub bucket_name: String,
}

/// GET /api/buckets - 列出存储桶
pub async fn list_buckets(State(state): State<Arc<AppState>>, cookies: Cookies) -> ApiResult<Vec<String>> {
    let session = current_session(&state, &cookies)?;
    let buckets = console::list_buckets(session.store.as_ref())
        .await
        .map_err(|err| fail(&state, &cookies, err))?;
    Ok(Json(ApiResponse::success(buckets)))
}

/// POST /api/buckets/create - 创建存储桶
pub async fn create_bucket(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<CreateBucketRequest>,
) -> ApiResult<BucketChange> {
    let session = current_session(&state, &cookies)?;
    let change = console::create_bucket(session.store.as_ref(), &req.bucket_name)
        .await
        .map_err(|err| fail(&state, &cookies, err))?;
    Ok(Json(ApiResponse::success_with_message(change.message(), change)))
}

/// POST /api/buckets/:bucket/delete - 删除空存储桶
pub async fn delete_bucket(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Path(bucket): Path<String>,
) -> ApiResult<BucketChange> {
    let session = current_session(&state, &cookies)?;
    let change = console::delete_bucket(session.store.as_ref(), &bucket)
        .await
        .map_err(|err| fail(&state, &cookies, err))?;
    Ok(Json(ApiResponse::success_with_message(change.message(), change)))
}
