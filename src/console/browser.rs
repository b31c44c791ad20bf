//! Object/prefix browser / 对象与前缀浏览
//!
//! The store only knows flat keys. Folders are derived here by grouping a
//! listing on the next `/` after the current prefix.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{ConsoleError, ConsoleResult};
use crate::storage::{ObjectEntry, ObjectStore};
use crate::utils::{clean_folder_key, display_name, parent_prefix};

/// List every key under `prefix`; an empty bucket is an empty list / 列出前缀下所有对象
pub async fn list_objects(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
) -> ConsoleResult<Vec<ObjectEntry>> {
    let prefix = prefix.trim_start_matches('/');
    let entries = store.list_objects(bucket, prefix).await?;
    tracing::debug!("Listed {} objects in {}/{}", entries.len(), bucket, prefix);
    Ok(entries)
}

/// Sub-folder one level below the browsed prefix / 子目录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderEntry {
    /// Full prefix ending in `/` / 完整前缀
    pub prefix: String,
    pub name: String,
}

/// Listing grouped into folders and direct objects / 目录视图
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderView {
    pub prefix: String,
    pub parent: Option<String>,
    pub folders: Vec<FolderEntry>,
    pub objects: Vec<ObjectEntry>,
}

impl FolderView {
    /// Group a flat listing by the next path segment after `prefix` / 按下一级路径分组
    pub fn derive(prefix: &str, entries: &[ObjectEntry]) -> Self {
        let mut folders = BTreeSet::new();
        let mut objects = Vec::new();

        for entry in entries {
            let Some(rest) = entry.key.strip_prefix(prefix) else {
                continue;
            };
            if rest.is_empty() {
                // marker of the browsed folder itself
                continue;
            }
            match rest.find('/') {
                Some(pos) => {
                    folders.insert(format!("{}{}", prefix, &rest[..=pos]));
                }
                None => objects.push(entry.clone()),
            }
        }

        Self {
            prefix: prefix.to_string(),
            parent: parent_prefix(prefix),
            folders: folders
                .into_iter()
                .map(|prefix| FolderEntry {
                    name: display_name(&prefix).trim_end_matches('/').to_string(),
                    prefix,
                })
                .collect(),
            objects,
        }
    }
}

/// Write a zero-byte folder marker; `x` and `x/` give the same key / 创建目录占位对象
pub async fn create_folder(store: &dyn ObjectStore, bucket: &str, name: &str) -> ConsoleResult<String> {
    let key = clean_folder_key(name)
        .ok_or_else(|| ConsoleError::InvalidRequest("folder name is required".to_string()))?;

    store.put_object(bucket, &key, &[]).await?;
    tracing::info!("Folder created: {}/{}", bucket, key);
    Ok(key)
}
