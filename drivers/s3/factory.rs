//! S3后端工厂

use anyhow::Result;
use std::sync::Arc;

use crate::storage::{StoreBox, StoreCredentials, StoreFactory};
use super::config::S3Config;
use super::driver::S3Store;

/// S3后端工厂（持有端点配置，连接时绑定凭证）
pub struct S3StoreFactory {
    config: S3Config,
}

impl S3StoreFactory {
    pub fn new(config: S3Config) -> Self {
        Self { config }
    }
}

impl StoreFactory for S3StoreFactory {
    fn backend(&self) -> &'static str {
        "s3"
    }

    fn connect(&self, credentials: &StoreCredentials) -> Result<StoreBox> {
        let store = S3Store::new(self.config.clone(), credentials)?;
        tracing::debug!(
            "S3 client created: endpoint={}, region={}",
            self.config.endpoint_label(),
            credentials.region
        );
        Ok(Arc::new(store))
    }
}
