//! Console core: bucket operations, prefix browser, bulk operator and uploads.
//! 控制台核心：每个操作都显式接收当前会话的存储客户端
//!
//! Every function takes the session's `ObjectStore` explicitly; the HTTP
//! layer resolves the session and passes the client in.

pub mod browser;
pub mod buckets;
pub mod bulk;
pub mod upload;

pub use browser::{create_folder, list_objects, FolderEntry, FolderView};
pub use buckets::{create_bucket, delete_bucket, list_buckets, probe_bucket, BucketChange, BucketProbe};
pub use bulk::{apply, BulkAction, BulkReport, KeyOutcome};
pub use upload::{upload, UploadFile};

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;
    use crate::drivers::memory::{MemoryStoreFactory, MemoryWorld};
    use crate::session::SessionManager;

    async fn keys(store: &dyn crate::storage::ObjectStore, bucket: &str) -> BTreeSet<String> {
        list_objects(store, bucket, "")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect()
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let world = MemoryWorld::new();
        world.add_account("AKIADEMO", "secret");
        let sessions = SessionManager::new(Arc::new(MemoryStoreFactory::new(world)), "us-east-1", 60);

        let session = sessions.connect("AKIADEMO", "secret", "").unwrap();
        let store = sessions.current(Some(&session.id)).unwrap().store.clone();

        assert_eq!(
            create_bucket(store.as_ref(), "demo-1").await.unwrap(),
            BucketChange::Created("demo-1".to_string())
        );
        assert_eq!(create_folder(store.as_ref(), "demo-1", "docs").await.unwrap(), "docs/");

        let files = [UploadFile { name: "a.txt".to_string(), data: Bytes::from_static(b"hi") }];
        upload(store.as_ref(), "demo-1", &files).await.unwrap();

        let expected: BTreeSet<String> = ["docs/", "a.txt"].iter().map(|k| k.to_string()).collect();
        assert_eq!(keys(store.as_ref(), "demo-1").await, expected);

        let report = apply(store.as_ref(), "demo-1", &["a.txt".to_string()], &BulkAction::Delete)
            .await
            .unwrap();
        assert_eq!(report.failed, 0);

        let expected: BTreeSet<String> = ["docs/"].iter().map(|k| k.to_string()).collect();
        assert_eq!(keys(store.as_ref(), "demo-1").await, expected);

        sessions.disconnect(Some(&session.id));
        assert!(sessions.current(Some(&session.id)).is_err());
    }
}
