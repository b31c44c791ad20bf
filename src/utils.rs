/// Object key and prefix utility functions / 对象键与前缀工具函数

/// Turn a folder name into a folder-marker key / 规范化目录名为目录占位键
/// 1. Strip leading / / 去掉开头的 /
/// 2. Append / if missing / 补全结尾的 /
///
/// The name is otherwise kept as typed. Returns None when nothing is left.
/// 其余字符保持原样，为空时返回None
pub fn clean_folder_key(name: &str) -> Option<String> {
    let name = name.trim_start_matches('/');
    if name.is_empty() {
        None
    } else if name.ends_with('/') {
        Some(name.to_string())
    } else {
        Some(format!("{}/", name))
    }
}

/// Join a browsing prefix and a relative name / 拼接前缀和相对名称
pub fn join_prefix(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_start_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else if prefix.ends_with('/') {
        format!("{}{}", prefix, name)
    } else {
        format!("{}/{}", prefix, name)
    }
}

/// Prefix one folder level up, None at bucket root / 上一级前缀
/// "a/b/" -> "a/", "a/" -> "", "" -> None
pub fn parent_prefix(prefix: &str) -> Option<String> {
    if prefix.is_empty() {
        return None;
    }
    let trimmed = prefix.strip_suffix('/').unwrap_or(prefix);
    match trimmed.rfind('/') {
        Some(pos) => Some(trimmed[..=pos].to_string()),
        None => Some(String::new()),
    }
}

/// Last path segment of a key, folder markers keep their slash / 键的最后一段
pub fn display_name(key: &str) -> &str {
    let trimmed = key.strip_suffix('/').unwrap_or(key);
    match trimmed.rfind('/') {
        Some(pos) => &key[pos + 1..],
        None => key,
    }
}

/// Remove duplicate keys, keeping first occurrence order / 去重并保持顺序
pub fn dedup_keys(keys: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    keys.iter()
        .filter(|k| seen.insert(k.as_str()))
        .cloned()
        .collect()
}
