// Storage backends / 存储后端
pub mod memory;
pub mod s3;

use std::sync::Arc;

use crate::config::StorageConfig;
use crate::storage::StoreRegistry;

/// Register all backends to StoreRegistry / 注册所有存储后端
pub fn register_all(registry: &StoreRegistry, storage: &StorageConfig) {
    // Register S3 backend / 注册S3对象存储后端
    registry.register_factory(Arc::new(s3::S3StoreFactory::new(storage.s3.clone())));
    // Register in-memory backend (offline mode) / 注册内存后端
    registry.register_factory(Arc::new(memory::MemoryStoreFactory::new(memory::MemoryWorld::new())));
}
