//! S3后端核心实现
//!
//! 每个调用对应一次S3 API请求，错误保留服务端返回的错误码

use std::borrow::Cow;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use s3::bucket::Bucket;
use s3::bucket_ops::BucketConfiguration;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::Region;

use crate::storage::{ObjectEntry, ObjectStore, StoreCredentials, StoreError, StoreResult};
use super::config::S3Config;

/// S3客户端（绑定一组操作员凭证）
pub struct S3Store {
    config: S3Config,
    region: Region,
    credentials: Credentials,
}

impl S3Store {
    /// 创建新的S3客户端，不会访问网络
    pub fn new(config: S3Config, credentials: &StoreCredentials) -> Result<Self> {
        if credentials.access_key.trim().is_empty() || credentials.secret_key.is_empty() {
            return Err(anyhow!("Access Key 和 Secret Key 不能为空"));
        }

        let creds = Credentials::new(
            Some(credentials.access_key.trim()),
            Some(&credentials.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| anyhow!("创建S3凭证失败: {}", e))?;

        let region_name = if credentials.region.is_empty() {
            config.region.clone()
        } else {
            credentials.region.clone()
        };

        // AWS需要使用内置区域，us-east-1 创建桶时不能带 LocationConstraint
        let region = if !config.is_custom_endpoint() {
            region_name
                .parse::<Region>()
                .map_err(|e| anyhow!("无效的S3区域 {}: {}", region_name, e))?
        } else {
            Region::Custom {
                region: region_name,
                endpoint: config.endpoint.trim_end_matches('/').to_string(),
            }
        };

        Ok(Self { config, region, credentials: creds })
    }

    /// 获取指定存储桶的客户端句柄
    fn bucket(&self, name: &str) -> StoreResult<Box<Bucket>> {
        let bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())
            .map_err(map_s3_error)?;

        Ok(if self.config.force_path_style {
            bucket.with_path_style()
        } else {
            bucket
        })
    }
}

/// 将rust-s3错误转换为带错误码的存储错误
fn map_s3_error(err: S3Error) -> StoreError {
    match err {
        S3Error::HttpFailWithBody(status, body) => StoreError::from_response(status, &body),
        other => StoreError::client(other.to_string()),
    }
}

/// 转换为请求路径：rust-s3会去掉开头的一个 /，以 / 开头的键需要多补一个
/// 空键会被当作桶本身的请求，直接拒绝
fn request_key(key: &str) -> StoreResult<Cow<'_, str>> {
    if key.is_empty() {
        return Err(StoreError::new(None, "InvalidArgument", "对象键不能为空"));
    }
    Ok(if key.starts_with('/') {
        Cow::Owned(format!("/{}", key))
    } else {
        Cow::Borrowed(key)
    })
}

/// 非2xx响应视为失败
fn check_status(status: u16, body: &[u8]) -> StoreResult<()> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(StoreError::from_response(status, &String::from_utf8_lossy(body)))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn name(&self) -> &str {
        "S3"
    }

    async fn list_buckets(&self) -> StoreResult<Vec<String>> {
        let response = Bucket::list_buckets(self.region.clone(), self.credentials.clone())
            .await
            .map_err(map_s3_error)?;

        Ok(response.bucket_names().collect())
    }

    async fn head_bucket(&self, bucket: &str) -> StoreResult<()> {
        // 读取一个键即可判断：200存在，404不存在，403属于其他账户
        let (_, status) = self
            .bucket(bucket)?
            .list_page(String::new(), None, None, None, Some(1))
            .await
            .map_err(map_s3_error)?;

        check_status(status, &[])
    }

    async fn create_bucket(&self, bucket: &str) -> StoreResult<()> {
        let config = BucketConfiguration::default();
        let response = if self.config.force_path_style {
            Bucket::create_with_path_style(bucket, self.region.clone(), self.credentials.clone(), config).await
        } else {
            Bucket::create(bucket, self.region.clone(), self.credentials.clone(), config).await
        }
        .map_err(map_s3_error)?;

        tracing::debug!("S3 CreateBucket: bucket={}, code={}", bucket, response.response_code);
        check_status(response.response_code, response.response_text.as_bytes())
    }

    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()> {
        let status = self.bucket(bucket)?.delete().await.map_err(map_s3_error)?;
        check_status(status, &[])
    }

    async fn list_objects(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectEntry>> {
        // 不使用分隔符：返回前缀下的扁平键列表，rust-s3自动翻页
        let results = self
            .bucket(bucket)?
            .list(prefix.to_string(), None)
            .await
            .map_err(map_s3_error)?;

        let entries = results
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|obj| ObjectEntry {
                key: obj.key,
                size: obj.size as u64,
                last_modified: Some(obj.last_modified),
            })
            .collect();

        Ok(entries)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        let path = request_key(key)?;
        let response = self.bucket(bucket)?.get_object(path.as_ref()).await.map_err(map_s3_error)?;
        check_status(response.status_code(), response.bytes())?;
        Ok(response.bytes().clone())
    }

    async fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> StoreResult<()> {
        let path = request_key(key)?;
        let response = self.bucket(bucket)?.put_object(path.as_ref(), data).await.map_err(map_s3_error)?;
        check_status(response.status_code(), response.bytes())
    }

    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> StoreResult<()> {
        let src_path = request_key(src_key)?;
        let dest_path = request_key(dest_key)?;

        if src_bucket == dest_bucket {
            // 同桶使用服务端CopyObject，源键需要URL编码（中文等非ASCII字符）
            let encoded_src = urlencoding::encode(src_key);
            tracing::debug!("S3 CopyObject: bucket={}, src_key={}, dst_key={}", src_bucket, src_key, dest_key);
            let status = self
                .bucket(src_bucket)?
                .copy_object_internal(&encoded_src, dest_path.as_ref())
                .await
                .map_err(map_s3_error)?;
            return check_status(status, &[]);
        }

        // 跨桶：流式读取源对象写入目标桶，保留源对象的Content-Type
        tracing::debug!(
            "S3跨桶复制: {}/{} -> {}/{}",
            src_bucket, src_key, dest_bucket, dest_key
        );
        let source = self.bucket(src_bucket)?;
        let (head, status) = source.head_object(src_path.as_ref()).await.map_err(map_s3_error)?;
        check_status(status, &[])?;
        let content_type = head
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut stream = source.get_object_stream(src_path.as_ref()).await.map_err(map_s3_error)?;
        check_status(stream.status_code, &[])?;

        let response = self
            .bucket(dest_bucket)?
            .put_object_stream_with_content_type(&mut stream, dest_path.as_ref(), content_type)
            .await
            .map_err(map_s3_error)?;
        check_status(response.status_code(), &[])
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        let path = request_key(key)?;
        let response = self.bucket(bucket)?.delete_object(path.as_ref()).await.map_err(map_s3_error)?;
        check_status(response.status_code(), response.bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(access_key: &str, secret_key: &str) -> StoreCredentials {
        StoreCredentials {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
            region: "us-east-1".to_string(),
        }
    }

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(S3Store::new(S3Config::default(), &creds("", "secret")).is_err());
        assert!(S3Store::new(S3Config::default(), &creds("AKIA", "")).is_err());
    }

    #[test]
    fn test_custom_endpoint() {
        let config = S3Config {
            endpoint: "http://localhost:9000/".to_string(),
            region: "us-east-1".to_string(),
            force_path_style: true,
        };
        let store = S3Store::new(config, &creds("minio", "minio123")).unwrap();
        assert!(matches!(store.region, Region::Custom { ref endpoint, .. } if endpoint == "http://localhost:9000"));
        assert_eq!(store.name(), "S3");
    }

    #[test]
    fn test_request_key_escapes_leading_slash() {
        assert_eq!(request_key("a.txt").unwrap(), "a.txt");
        assert_eq!(request_key("/a.txt").unwrap(), "//a.txt");
        assert_eq!(request_key("/").unwrap(), "//");
        assert_eq!(request_key("").unwrap_err().code, "InvalidArgument");
    }

    #[tokio::test]
    async fn test_empty_key_never_sent() {
        let store = S3Store::new(S3Config::default(), &creds("AKIA", "secret")).unwrap();
        let err = store.delete_object("bucket", "").await.unwrap_err();
        assert_eq!(err.code, "InvalidArgument");
        assert_eq!(err.status, None);

        // 跨桶复制在发起流式请求前同样校验两端的键
        let err = store.copy_object("src", "", "dst", "k").await.unwrap_err();
        assert_eq!(err.code, "InvalidArgument");
        let err = store.copy_object("src", "k", "dst", "").await.unwrap_err();
        assert_eq!(err.code, "InvalidArgument");
    }

    #[test]
    fn test_http_failure_keeps_code() {
        let err = map_s3_error(S3Error::HttpFailWithBody(
            409,
            "<Error><Code>BucketAlreadyExists</Code><Message>taken</Message></Error>".to_string(),
        ));
        assert_eq!(err.code, "BucketAlreadyExists");
        assert_eq!(err.status, Some(409));
    }
}
