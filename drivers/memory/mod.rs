//! 内存存储后端（离线模式与测试）

pub mod driver;

pub use driver::{MemoryStore, MemoryStoreFactory, MemoryWorld};
