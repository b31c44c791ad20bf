//! Bulk delete / move / copy / 批量删除、移动、复制

use serde::Serialize;

use crate::error::{ConsoleError, ConsoleResult};
use crate::storage::{ObjectStore, StoreError};
use crate::utils::dedup_keys;

/// Action applied to every selected key / 批量操作类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    Delete,
    Move(String),
    Copy(String),
}

impl BulkAction {
    /// Parse the request's action name and optional destination bucket / 解析操作
    pub fn parse(action: &str, destination: Option<&str>) -> ConsoleResult<Self> {
        let destination = destination.map(str::trim).filter(|d| !d.is_empty());
        let need_destination = || {
            destination
                .map(str::to_string)
                .ok_or_else(|| ConsoleError::InvalidRequest(format!("{} requires a destination bucket", action)))
        };

        match action.trim().to_ascii_lowercase().as_str() {
            "delete" => Ok(Self::Delete),
            "move" => Ok(Self::Move(need_destination()?)),
            "copy" => Ok(Self::Copy(need_destination()?)),
            other => Err(ConsoleError::InvalidRequest(format!("unknown action: {}", other))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Move(_) => "move",
            Self::Copy(_) => "copy",
        }
    }

    pub fn destination(&self) -> Option<&str> {
        match self {
            Self::Delete => None,
            Self::Move(dest) | Self::Copy(dest) => Some(dest),
        }
    }
}

/// Result for one key / 单个对象的处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyOutcome {
    pub key: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated per-key report / 批量操作报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<KeyOutcome>,
}

impl BulkReport {
    fn new(action: &BulkAction, outcomes: Vec<KeyOutcome>) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        Self {
            action: action.name().to_string(),
            destination: action.destination().map(str::to_string),
            succeeded,
            failed: outcomes.len() - succeeded,
            outcomes,
        }
    }

    pub fn message(&self) -> String {
        if self.failed == 0 {
            format!("{} {} object(s) successfully.", capitalize(&self.action), self.succeeded)
        } else {
            format!(
                "{} finished: {} succeeded, {} failed.",
                capitalize(&self.action),
                self.succeeded,
                self.failed
            )
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

async fn apply_one(store: &dyn ObjectStore, bucket: &str, key: &str, action: &BulkAction) -> Result<(), StoreError> {
    match action {
        BulkAction::Delete => store.delete_object(bucket, key).await,
        BulkAction::Copy(dest) => store.copy_object(bucket, key, dest, key).await,
        BulkAction::Move(dest) => {
            // source is only removed after the copy landed
            store.copy_object(bucket, key, dest, key).await?;
            store.delete_object(bucket, key).await
        }
    }
}

/// Apply `action` to each key independently, continuing past failures.
/// Credential errors abort the batch since every later key would fail too.
/// 逐个对象执行操作，单个失败不影响其余对象；凭证错误会中止整个批次
pub async fn apply(
    store: &dyn ObjectStore,
    bucket: &str,
    keys: &[String],
    action: &BulkAction,
) -> ConsoleResult<BulkReport> {
    let keys = dedup_keys(keys);
    if keys.is_empty() {
        return Err(ConsoleError::InvalidRequest("no objects selected".to_string()));
    }
    if action.destination() == Some(bucket) {
        return Err(ConsoleError::InvalidRequest(
            "destination bucket must differ from the source bucket".to_string(),
        ));
    }

    let mut outcomes = Vec::with_capacity(keys.len());
    for key in keys {
        if key.is_empty() {
            // an empty key addresses the bucket itself
            let err = ConsoleError::InvalidRequest("object key is empty".to_string());
            outcomes.push(KeyOutcome { key, success: false, error: Some(err.to_string()) });
            continue;
        }
        match apply_one(store, bucket, &key, action).await {
            Ok(()) => outcomes.push(KeyOutcome { key, success: true, error: None }),
            Err(err) if err.is_auth_failure() => return Err(err.into()),
            Err(err) => {
                tracing::warn!("Bulk {} failed for {}/{}: {}", action.name(), bucket, key, err);
                outcomes.push(KeyOutcome { key, success: false, error: Some(err.to_string()) });
            }
        }
    }

    let report = BulkReport::new(action, outcomes);
    tracing::info!(
        "Bulk {} on {}: {} succeeded, {} failed",
        report.action,
        bucket,
        report.succeeded,
        report.failed
    );
    Ok(report)
}
