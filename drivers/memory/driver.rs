//! 内存对象存储
//!
//! 模拟S3的全局桶命名空间：桶名全局唯一，每个桶属于一个账户。
//! 用于离线演示和测试，错误码与S3保持一致。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::RwLock;

use crate::storage::{
    ObjectEntry, ObjectStore, StoreBox, StoreCredentials, StoreError, StoreFactory, StoreResult,
};

#[derive(Debug, Clone)]
struct MemoryObject {
    data: Bytes,
    last_modified: String,
}

#[derive(Debug, Default)]
struct MemoryBucket {
    owner: String,
    objects: BTreeMap<String, MemoryObject>,
}

#[derive(Debug, Default)]
struct WorldState {
    /// access key -> secret key；为空时接受任意凭证
    accounts: HashMap<String, String>,
    buckets: BTreeMap<String, MemoryBucket>,
}

/// 所有账户共享的存储空间
#[derive(Debug, Clone, Default)]
pub struct MemoryWorld {
    state: Arc<RwLock<WorldState>>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册账户，注册后只接受已知凭证
    pub fn add_account(&self, access_key: &str, secret_key: &str) {
        self.state
            .write()
            .accounts
            .insert(access_key.to_string(), secret_key.to_string());
    }

    /// 以指定账户身份访问
    pub fn client(&self, access_key: &str, secret_key: &str) -> MemoryStore {
        MemoryStore {
            world: self.clone(),
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}

/// 绑定一个账户的内存存储客户端
#[derive(Debug, Clone)]
pub struct MemoryStore {
    world: MemoryWorld,
    access_key: String,
    secret_key: String,
}

fn no_such_bucket(bucket: &str) -> StoreError {
    StoreError::new(Some(404), "NoSuchBucket", format!("The specified bucket does not exist: {}", bucket))
}

fn access_denied(bucket: &str) -> StoreError {
    StoreError::new(Some(403), "AccessDenied", format!("Access Denied: {}", bucket))
}

impl MemoryStore {
    fn authenticate(&self, state: &WorldState) -> StoreResult<()> {
        if state.accounts.is_empty() {
            return Ok(());
        }
        match state.accounts.get(&self.access_key) {
            None => Err(StoreError::new(
                Some(403),
                "InvalidAccessKeyId",
                "The AWS Access Key Id you provided does not exist in our records.",
            )),
            Some(secret) if secret != &self.secret_key => Err(StoreError::new(
                Some(403),
                "SignatureDoesNotMatch",
                "The request signature we calculated does not match the signature you provided.",
            )),
            Some(_) => Ok(()),
        }
    }

    /// 只读访问自己拥有的桶
    fn with_bucket<T>(&self, bucket: &str, f: impl FnOnce(&MemoryBucket) -> StoreResult<T>) -> StoreResult<T> {
        let state = self.world.state.read();
        self.authenticate(&state)?;
        match state.buckets.get(bucket) {
            None => Err(no_such_bucket(bucket)),
            Some(b) if b.owner != self.access_key => Err(access_denied(bucket)),
            Some(b) => f(b),
        }
    }

    /// 读写访问自己拥有的桶
    fn with_bucket_mut<T>(
        &self,
        bucket: &str,
        f: impl FnOnce(&mut MemoryBucket) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut state = self.world.state.write();
        self.authenticate(&state)?;
        match state.buckets.get_mut(bucket) {
            None => Err(no_such_bucket(bucket)),
            Some(b) if b.owner != self.access_key => Err(access_denied(bucket)),
            Some(b) => f(b),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn name(&self) -> &str {
        "Memory"
    }

    async fn list_buckets(&self) -> StoreResult<Vec<String>> {
        let state = self.world.state.read();
        self.authenticate(&state)?;
        Ok(state
            .buckets
            .iter()
            .filter(|(_, b)| b.owner == self.access_key)
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn head_bucket(&self, bucket: &str) -> StoreResult<()> {
        let state = self.world.state.read();
        self.authenticate(&state)?;
        // HEAD没有响应体，只有状态码
        match state.buckets.get(bucket) {
            None => Err(StoreError::from_response(404, "")),
            Some(b) if b.owner != self.access_key => Err(StoreError::from_response(403, "")),
            Some(_) => Ok(()),
        }
    }

    async fn create_bucket(&self, bucket: &str) -> StoreResult<()> {
        let mut state = self.world.state.write();
        self.authenticate(&state)?;
        if let Some(existing) = state.buckets.get(bucket) {
            return Err(if existing.owner == self.access_key {
                StoreError::new(
                    Some(409),
                    "BucketAlreadyOwnedByYou",
                    "Your previous request to create the named bucket succeeded and you already own it.",
                )
            } else {
                StoreError::new(
                    Some(409),
                    "BucketAlreadyExists",
                    "The requested bucket name is not available.",
                )
            });
        }
        state.buckets.insert(
            bucket.to_string(),
            MemoryBucket {
                owner: self.access_key.clone(),
                objects: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()> {
        let mut state = self.world.state.write();
        self.authenticate(&state)?;
        match state.buckets.get(bucket) {
            None => return Err(no_such_bucket(bucket)),
            Some(b) if b.owner != self.access_key => return Err(access_denied(bucket)),
            Some(b) if !b.objects.is_empty() => {
                return Err(StoreError::new(
                    Some(409),
                    "BucketNotEmpty",
                    "The bucket you tried to delete is not empty",
                ))
            }
            Some(_) => {}
        }
        state.buckets.remove(bucket);
        Ok(())
    }

    async fn list_objects(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectEntry>> {
        self.with_bucket(bucket, |b| {
            Ok(b.objects
                .range(prefix.to_string()..)
                .take_while(|(key, _)| key.starts_with(prefix))
                .map(|(key, obj)| ObjectEntry {
                    key: key.clone(),
                    size: obj.data.len() as u64,
                    last_modified: Some(obj.last_modified.clone()),
                })
                .collect())
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        self.with_bucket(bucket, |b| {
            b.objects
                .get(key)
                .map(|obj| obj.data.clone())
                .ok_or_else(|| StoreError::new(Some(404), "NoSuchKey", format!("The specified key does not exist: {}", key)))
        })
    }

    async fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> StoreResult<()> {
        let object = MemoryObject {
            data: Bytes::copy_from_slice(data),
            last_modified: Utc::now().to_rfc3339(),
        };
        self.with_bucket_mut(bucket, |b| {
            b.objects.insert(key.to_string(), object);
            Ok(())
        })
    }

    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> StoreResult<()> {
        let data = self.get_object(src_bucket, src_key).await?;
        self.put_object(dest_bucket, dest_key, &data).await
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        // 与S3一致：删除不存在的键也返回成功
        self.with_bucket_mut(bucket, |b| {
            b.objects.remove(key);
            Ok(())
        })
    }
}

/// 内存后端工厂，所有会话共享同一个 MemoryWorld
pub struct MemoryStoreFactory {
    world: MemoryWorld,
}

impl MemoryStoreFactory {
    pub fn new(world: MemoryWorld) -> Self {
        Self { world }
    }
}

impl StoreFactory for MemoryStoreFactory {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn connect(&self, credentials: &StoreCredentials) -> Result<StoreBox> {
        if credentials.access_key.trim().is_empty() || credentials.secret_key.is_empty() {
            return Err(anyhow!("Access Key 和 Secret Key 不能为空"));
        }
        Ok(Arc::new(self.world.client(credentials.access_key.trim(), &credentials.secret_key)))
    }
}
