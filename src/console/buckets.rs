//! Bucket operations / 存储桶操作

use serde::Serialize;

use crate::error::{ConsoleError, ConsoleResult};
use crate::storage::ObjectStore;

/// Outcome of the existence probe before creating a bucket / 创建前的存在性探测结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketProbe {
    /// Exists and belongs to the caller / 已存在且属于当前账户
    Owned,
    /// Not found anywhere / 不存在
    Free,
    /// Exists under another account / 属于其他账户
    Foreign,
}

/// Successful bucket change / 存储桶变更结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "bucket", rename_all = "snake_case")]
pub enum BucketChange {
    Created(String),
    Deleted(String),
}

impl BucketChange {
    pub fn message(&self) -> String {
        match self {
            Self::Created(name) => format!("Bucket '{}' created successfully.", name),
            Self::Deleted(name) => format!("Bucket '{}' deleted successfully.", name),
        }
    }
}

fn validate_bucket_name(name: &str) -> ConsoleResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ConsoleError::InvalidRequest("bucket name is required".to_string()));
    }
    Ok(name)
}

/// List all buckets visible to the session / 列出所有存储桶
pub async fn list_buckets(store: &dyn ObjectStore) -> ConsoleResult<Vec<String>> {
    Ok(store.list_buckets().await?)
}

/// Probe whether a bucket name is owned, free or taken / 探测桶名状态
pub async fn probe_bucket(store: &dyn ObjectStore, name: &str) -> ConsoleResult<BucketProbe> {
    match store.head_bucket(name).await {
        Ok(()) => Ok(BucketProbe::Owned),
        Err(err) if err.is_auth_failure() => Err(err.into()),
        Err(err) if err.is_not_found() => Ok(BucketProbe::Free),
        Err(err) if err.is_forbidden() => Ok(BucketProbe::Foreign),
        Err(err) => Err(err.into()),
    }
}

/// Create a bucket after probing the global namespace / 探测后创建存储桶
pub async fn create_bucket(store: &dyn ObjectStore, name: &str) -> ConsoleResult<BucketChange> {
    let name = validate_bucket_name(name)?;

    match probe_bucket(store, name).await? {
        BucketProbe::Owned => Err(ConsoleError::AlreadyOwned(name.to_string())),
        BucketProbe::Foreign => Err(ConsoleError::ForbiddenGlobalName(name.to_string())),
        BucketProbe::Free => {
            store.create_bucket(name).await.map_err(|err| {
                ConsoleError::from_store_or(err, |err| match err.code.as_str() {
                    "BucketAlreadyOwnedByYou" => ConsoleError::AlreadyOwned(name.to_string()),
                    "BucketAlreadyExists" => ConsoleError::GloballyTaken(name.to_string()),
                    _ => ConsoleError::Unknown(err.to_string()),
                })
            })?;
            tracing::info!("Bucket created: {}", name);
            Ok(BucketChange::Created(name.to_string()))
        }
    }
}

/// Delete an empty bucket; no cascading delete / 删除空存储桶
pub async fn delete_bucket(store: &dyn ObjectStore, name: &str) -> ConsoleResult<BucketChange> {
    let name = validate_bucket_name(name)?;

    store.delete_bucket(name).await.map_err(|err| {
        ConsoleError::from_store_or(err, |err| match err.code.as_str() {
            "BucketNotEmpty" => ConsoleError::NotEmpty(name.to_string()),
            _ => ConsoleError::Unknown(err.to_string()),
        })
    })?;
    tracing::info!("Bucket deleted: {}", name);
    Ok(BucketChange::Deleted(name.to_string()))
}
