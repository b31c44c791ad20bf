//! Upload handler / 上传处理

use bytes::Bytes;

use crate::error::{ConsoleError, ConsoleResult};
use crate::storage::ObjectStore;

/// One uploaded file / 上传的文件
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name, used as the key at bucket root / 原始文件名
    pub name: String,
    pub data: Bytes,
}

/// Write each file under its original name, stopping at the first failure.
/// 按原文件名写入桶根目录，首个失败即中止
pub async fn upload(store: &dyn ObjectStore, bucket: &str, files: &[UploadFile]) -> ConsoleResult<Vec<String>> {
    if files.is_empty() {
        return Err(ConsoleError::UploadFailed("no files provided".to_string()));
    }

    let mut uploaded = Vec::with_capacity(files.len());
    for file in files {
        let name = file.name.as_str();
        if name.trim().is_empty() {
            return Err(ConsoleError::UploadFailed("file has no name".to_string()));
        }

        store
            .put_object(bucket, name, &file.data)
            .await
            .map_err(|err| ConsoleError::from_store_or(err, |err| ConsoleError::UploadFailed(err.to_string())))?;

        tracing::debug!("Uploaded {}/{} ({} bytes)", bucket, name, file.data.len());
        uploaded.push(name.to_string());
    }

    tracing::info!("Uploaded {} file(s) to {}", uploaded.len(), bucket);
    Ok(uploaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::memory::MemoryWorld;

    fn file(name: &str, data: &'static [u8]) -> UploadFile {
        UploadFile { name: name.to_string(), data: Bytes::from_static(data) }
    }

    #[tokio::test]
    async fn test_upload_lands_at_root() {
        let store = MemoryWorld::new().client("alice", "a");
        store.create_bucket("b").await.unwrap();

        let names = upload(&store, "b", &[file("f.txt", b"hello")]).await.unwrap();
        assert_eq!(names, vec!["f.txt"]);

        let keys: Vec<String> = store.list_objects("b", "").await.unwrap().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["f.txt"]);
        assert_eq!(&store.get_object("b", "f.txt").await.unwrap()[..], b"hello");
    }

    #[tokio::test]
    async fn test_upload_overwrites() {
        let store = MemoryWorld::new().client("alice", "a");
        store.create_bucket("b").await.unwrap();
        upload(&store, "b", &[file("f.txt", b"old")]).await.unwrap();
        upload(&store, "b", &[file("f.txt", b"new")]).await.unwrap();
        assert_eq!(&store.get_object("b", "f.txt").await.unwrap()[..], b"new");
    }

    #[tokio::test]
    async fn test_first_failure_aborts_batch() {
        let store = MemoryWorld::new().client("alice", "a");
        store.create_bucket("b").await.unwrap();

        let err = upload(&store, "b", &[file("a.txt", b"1"), file("", b"2"), file("c.txt", b"3")])
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::UploadFailed(_)));
        assert!(store.get_object("b", "a.txt").await.is_ok());
        assert!(store.get_object("b", "c.txt").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_bucket_fails() {
        let store = MemoryWorld::new().client("alice", "a");
        let err = upload(&store, "nope", &[file("f.txt", b"x")]).await.unwrap_err();
        assert!(matches!(err, ConsoleError::UploadFailed(ref d) if d.contains("NoSuchBucket")));
    }

    #[tokio::test]
    async fn test_name_stored_as_given() {
        let store = MemoryWorld::new().client("alice", "a");
        store.create_bucket("b").await.unwrap();

        let names = upload(&store, "b", &[file(" notes .txt ", b"x")]).await.unwrap();
        assert_eq!(names, vec![" notes .txt "]);
        assert!(store.get_object("b", " notes .txt ").await.is_ok());
        assert!(store.get_object("b", "notes .txt").await.unwrap_err().is_not_found());

        let err = upload(&store, "b", &[file("  ", b"x")]).await.unwrap_err();
        assert!(matches!(err, ConsoleError::UploadFailed(_)));
    }
}
