use std::collections::HashMap;
use std::sync::Arc;
use anyhow::{anyhow, Result};
use parking_lot::RwLock;

use super::{ObjectStore, StoreCredentials};

pub type StoreBox = Arc<dyn ObjectStore>;

/// Store factory trait: builds a client bound to operator credentials / 存储客户端工厂
pub trait StoreFactory: Send + Sync {
    /// Backend type name, matched against `storage.backend` / 后端类型名称
    fn backend(&self) -> &'static str;

    /// Construct a client. Credentials are not checked against the service here.
    /// 创建客户端（不在此处验证凭证）
    fn connect(&self, credentials: &StoreCredentials) -> Result<StoreBox>;
}

/// Registry of available backends / 后端注册表
#[derive(Clone, Default)]
pub struct StoreRegistry {
    factories: Arc<RwLock<HashMap<String, Arc<dyn StoreFactory>>>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register store factory / 注册存储工厂
    pub fn register_factory(&self, factory: Arc<dyn StoreFactory>) {
        let backend = factory.backend().to_string();
        self.factories.write().insert(backend.clone(), factory);
        tracing::info!("Store factory registered: {}", backend);
    }

    /// Look up the factory for a backend / 获取指定后端的工厂
    pub fn factory(&self, backend: &str) -> Result<Arc<dyn StoreFactory>> {
        self.factories
            .read()
            .get(backend)
            .cloned()
            .ok_or_else(|| anyhow!("Storage backend not found: {}", backend))
    }

    /// Registered backend names, sorted / 已注册的后端
    pub fn backends(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort();
        names
    }
}
