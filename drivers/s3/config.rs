//! S3后端配置

use serde::{Deserialize, Serialize};

/// S3配置（凭证由操作员在连接时提供，不写入配置文件）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// S3端点地址，留空时使用AWS
    /// AWS: https://s3.{region}.amazonaws.com
    /// MinIO: http://localhost:9000
    #[serde(default)]
    pub endpoint: String,
    /// 区域
    #[serde(default = "default_region")]
    pub region: String,
    /// 强制使用路径风格（而非虚拟主机风格）
    /// MinIO等需要设置为true
    #[serde(default)]
    pub force_path_style: bool,
}

pub fn default_region() -> String {
    "us-east-1".to_string()
}

impl S3Config {
    /// 是否使用自定义端点（MinIO、R2等兼容服务）
    pub fn is_custom_endpoint(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }

    /// 日志中显示的端点名称
    pub fn endpoint_label(&self) -> &str {
        if self.is_custom_endpoint() { &self.endpoint } else { "aws" }
    }
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: default_region(),
            force_path_style: false,
        }
    }
}
