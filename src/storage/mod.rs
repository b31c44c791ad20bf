use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Object listing entry / 对象列表条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Full object key / 完整对象键
    pub key: String,
    pub size: u64,
    pub last_modified: Option<String>,
}

/// Credentials supplied by the operator on connect / 操作员连接时提供的凭证
#[derive(Debug, Clone)]
pub struct StoreCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

/// Error body returned by S3-compatible services / S3错误响应体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

/// Structured storage-service failure / 存储服务错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct StoreError {
    /// HTTP status when the failure came from the wire
    pub status: Option<u16>,
    /// Machine-readable code, e.g. `BucketNotEmpty`
    pub code: String,
    pub message: String,
}

impl StoreError {
    pub fn new(status: Option<u16>, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Build from an HTTP status and (possibly empty) XML body / 从HTTP状态码和XML响应体构建
    ///
    /// HEAD responses carry no body, so the code falls back to the status:
    /// 404 -> `NotFound`, 403 -> `Forbidden`.
    pub fn from_response(status: u16, body: &str) -> Self {
        if let Ok(parsed) = quick_xml::de::from_str::<ErrorBody>(body) {
            if !parsed.code.is_empty() {
                return Self::new(Some(status), &parsed.code, parsed.message);
            }
        }
        let code = match status {
            404 => "NotFound".to_string(),
            403 => "Forbidden".to_string(),
            other => other.to_string(),
        };
        Self::new(Some(status), &code, body.trim())
    }

    /// Client-side failure that never reached the service / 未到达服务端的客户端错误
    pub fn client(message: impl Into<String>) -> Self {
        Self::new(None, "ClientError", message)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.code.as_str(), "NotFound" | "NoSuchBucket" | "NoSuchKey")
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self.code.as_str(), "Forbidden" | "AccessDenied")
    }

    /// The credentials themselves were rejected / 凭证被拒绝
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self.code.as_str(),
            "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "ExpiredToken" | "InvalidToken"
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-service client interface (one method per service call) / 存储服务客户端接口
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Backend name / 后端名称
    fn name(&self) -> &str;

    /// All buckets visible to the credentials / 列出所有存储桶
    async fn list_buckets(&self) -> StoreResult<Vec<String>>;

    /// Existence probe / 存储桶存在性探测
    async fn head_bucket(&self, bucket: &str) -> StoreResult<()>;

    async fn create_bucket(&self, bucket: &str) -> StoreResult<()>;

    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()>;

    /// Every key starting with `prefix`, across all pages / 列出前缀下所有对象
    async fn list_objects(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectEntry>>;

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes>;

    /// Write (or overwrite) an object / 写入对象
    async fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> StoreResult<()>;

    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> StoreResult<()>;

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()>;
}

pub mod manager;

pub use manager::{StoreFactory, StoreRegistry, StoreBox};
