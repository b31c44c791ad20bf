pub mod config;
pub mod console;
pub mod error;
pub mod session;
pub mod storage;
pub mod utils;

// Driver modules (point to project root drivers via path attribute) / 驱动模块
#[path = "../drivers/mod.rs"]
pub mod drivers;

/// Register all storage backends / 注册所有存储后端
pub fn register_storage_backends(registry: &storage::StoreRegistry, storage: &config::StorageConfig) {
    drivers::register_all(registry, storage)
}
