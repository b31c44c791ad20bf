//! S3对象存储后端
//!
//! 基于 rust-s3，每个会话持有一个绑定操作员凭证的客户端

pub mod config;
pub mod driver;
pub mod factory;

pub use config::S3Config;
pub use driver::S3Store;
pub use factory::S3StoreFactory;
