//! Console error taxonomy / 控制台错误分类
//!
//! Storage failures are classified here into the small set of outcomes the
//! console reports to the operator.

use thiserror::Error;

use crate::storage::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("not connected to the storage service")]
    NotConnected,

    #[error("authentication failed: {0}")]
    AuthFailure(String),

    #[error("a bucket with the name '{0}' already exists in your account")]
    AlreadyOwned(String),

    #[error("a bucket with the name '{0}' already exists, bucket names must be globally unique")]
    GloballyTaken(String),

    #[error("a bucket with the name '{0}' already exists globally and is owned by another account")]
    ForbiddenGlobalName(String),

    #[error("cannot delete bucket '{0}' because it is not empty")]
    NotEmpty(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("an error occurred: {0}")]
    Unknown(String),
}

impl ConsoleError {
    /// API status code for this error / 对应的API状态码
    pub fn code(&self) -> i32 {
        match self {
            Self::NotConnected | Self::AuthFailure(_) => 401,
            Self::AlreadyOwned(_)
            | Self::GloballyTaken(_)
            | Self::ForbiddenGlobalName(_)
            | Self::NotEmpty(_) => 409,
            Self::InvalidRequest(_) => 400,
            Self::UploadFailed(_) | Self::Unknown(_) => 500,
        }
    }

    /// Whether the operator has to connect again / 是否需要重新连接
    pub fn ends_session(&self) -> bool {
        matches!(self, Self::NotConnected | Self::AuthFailure(_))
    }

    /// Classify a storage failure: credential errors always become
    /// `AuthFailure`, everything else goes through `other`.
    /// 存储错误分类：凭证错误统一为 AuthFailure
    pub fn from_store_or(err: StoreError, other: impl FnOnce(StoreError) -> ConsoleError) -> Self {
        if err.is_auth_failure() {
            ConsoleError::AuthFailure(err.to_string())
        } else {
            other(err)
        }
    }
}

/// Classify a storage failure that has no operation-specific meaning.
/// 通用存储错误分类
impl From<StoreError> for ConsoleError {
    fn from(err: StoreError) -> Self {
        ConsoleError::from_store_or(err, |e| ConsoleError::Unknown(e.to_string()))
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
