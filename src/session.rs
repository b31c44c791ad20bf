//! Credential session management / 凭证会话管理
//!
//! Each connect issues a session id (carried in a cookie) bound to one
//! storage client. Operations look the client up by id instead of sharing
//! one process-wide slot, so concurrent operators do not overwrite each other.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::{ConsoleError, ConsoleResult};
use crate::storage::{StoreBox, StoreCredentials, StoreFactory};

/// Active session / 活动会话
pub struct Session {
    pub id: String,
    pub access_key: String,
    pub region: String,
    pub store: StoreBox,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|t| now >= t).unwrap_or(false)
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            access_key: mask_access_key(&self.access_key),
            region: self.region.clone(),
            backend: self.store.name().to_string(),
            connected_at: self.created_at.to_rfc3339(),
        }
    }
}

/// Public view of a session, secret-free / 会话公开信息
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub access_key: String,
    pub region: String,
    pub backend: String,
    pub connected_at: String,
}

/// Keep only the last four characters of an access key / 访问密钥脱敏
pub fn mask_access_key(access_key: &str) -> String {
    let chars: Vec<char> = access_key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

/// Session table / 会话表
pub struct SessionManager {
    factory: Arc<dyn StoreFactory>,
    default_region: String,
    ttl: Option<Duration>,
    max_sessions: usize,
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

/// Drop expired sessions, then the oldest ones until `room` more fit under `max`.
/// 清理过期会话，超出上限时淘汰最早的会话
fn purge(sessions: &mut HashMap<String, Arc<Session>>, now: DateTime<Utc>, max: usize, room: usize) {
    sessions.retain(|_, s| !s.is_expired(now));
    if max == 0 {
        return;
    }
    while sessions.len() + room > max {
        let oldest = sessions
            .values()
            .min_by_key(|s| s.created_at)
            .map(|s| s.id.clone());
        match oldest {
            Some(id) => {
                sessions.remove(&id);
                tracing::debug!("Session evicted, table full: max={}", max);
            }
            None => break,
        }
    }
}

impl SessionManager {
    /// `ttl_minutes <= 0` disables expiry / 小于等于0表示不过期
    pub fn new(factory: Arc<dyn StoreFactory>, default_region: &str, ttl_minutes: i64) -> Self {
        Self {
            factory,
            default_region: default_region.to_string(),
            ttl: (ttl_minutes > 0).then(|| Duration::minutes(ttl_minutes)),
            max_sessions: 0,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Cap the table size, 0 means no cap / 设置会话数上限
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    /// Create a client for the credentials and register a new session.
    /// Credentials are only checked by the first storage call.
    /// 创建会话（凭证在首次调用存储服务时才会被验证）
    pub fn connect(&self, access_key: &str, secret_key: &str, region: &str) -> ConsoleResult<Arc<Session>> {
        let region = if region.is_empty() { self.default_region.as_str() } else { region };
        let credentials = StoreCredentials {
            access_key: access_key.trim().to_string(),
            secret_key: secret_key.to_string(),
            region: region.to_string(),
        };

        let store = self
            .factory
            .connect(&credentials)
            .map_err(|e| ConsoleError::AuthFailure(e.to_string()))?;

        let now = Utc::now();
        let session = Arc::new(Session {
            id: uuid::Uuid::new_v4().to_string(),
            access_key: credentials.access_key,
            region: credentials.region,
            store,
            created_at: now,
            expires_at: self.ttl.map(|ttl| now + ttl),
        });

        let mut sessions = self.sessions.write();
        purge(&mut sessions, now, self.max_sessions, 1);
        sessions.insert(session.id.clone(), session.clone());

        tracing::info!(
            "Session connected: key={}, backend={}, active={}",
            mask_access_key(&session.access_key),
            self.factory.backend(),
            sessions.len()
        );
        Ok(session)
    }

    /// Drop a session; unknown or missing ids are ignored / 断开会话（幂等）
    pub fn disconnect(&self, id: Option<&str>) {
        if let Some(id) = id {
            if let Some(session) = self.sessions.write().remove(id) {
                tracing::info!("Session disconnected: key={}", mask_access_key(&session.access_key));
            }
        }
    }

    /// Current session for the id, evicting it if expired / 获取当前会话
    pub fn current(&self, id: Option<&str>) -> ConsoleResult<Arc<Session>> {
        let id = id.ok_or(ConsoleError::NotConnected)?;
        let session = self
            .sessions
            .read()
            .get(id)
            .cloned()
            .ok_or(ConsoleError::NotConnected)?;

        if session.is_expired(Utc::now()) {
            self.sessions.write().remove(id);
            tracing::debug!("Session expired: key={}", mask_access_key(&session.access_key));
            return Err(ConsoleError::NotConnected);
        }
        Ok(session)
    }

    pub fn active_count(&self) -> usize {
        let mut sessions = self.sessions.write();
        purge(&mut sessions, Utc::now(), self.max_sessions, 0);
        sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::memory::{MemoryStoreFactory, MemoryWorld};

    fn manager(ttl_minutes: i64) -> SessionManager {
        SessionManager::new(
            Arc::new(MemoryStoreFactory::new(MemoryWorld::new())),
            "us-east-1",
            ttl_minutes,
        )
    }

    #[test]
    fn test_connect_and_disconnect() {
        let sessions = manager(60);
        let session = sessions.connect("AKIAEXAMPLE", "secret", "").unwrap();
        assert_eq!(session.region, "us-east-1");
        assert!(sessions.current(Some(&session.id)).is_ok());

        sessions.disconnect(Some(&session.id));
        assert_eq!(sessions.current(Some(&session.id)).err(), Some(ConsoleError::NotConnected));

        // idempotent
        sessions.disconnect(Some(&session.id));
        sessions.disconnect(None);
        assert_eq!(sessions.active_count(), 0);
    }

    #[test]
    fn test_missing_session_is_not_connected() {
        let sessions = manager(60);
        assert_eq!(sessions.current(None).err(), Some(ConsoleError::NotConnected));
        assert_eq!(sessions.current(Some("nope")).err(), Some(ConsoleError::NotConnected));
    }

    #[test]
    fn test_empty_credentials_fail() {
        let sessions = manager(60);
        assert!(matches!(sessions.connect("", "", ""), Err(ConsoleError::AuthFailure(_))));
    }

    #[test]
    fn test_sessions_are_independent() {
        let sessions = manager(0);
        let a = sessions.connect("alice-key", "a", "").unwrap();
        let b = sessions.connect("bob-key", "b", "eu-west-1").unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(sessions.current(Some(&a.id)).unwrap().access_key, "alice-key");
        assert_eq!(sessions.current(Some(&b.id)).unwrap().region, "eu-west-1");
        assert!(a.expires_at.is_none());
    }

    #[test]
    fn test_expired_session_is_evicted() {
        let sessions = manager(60);
        let session = sessions.connect("AKIAEXAMPLE", "secret", "").unwrap();
        let expired = Arc::new(Session {
            id: session.id.clone(),
            access_key: session.access_key.clone(),
            region: session.region.clone(),
            store: session.store.clone(),
            created_at: session.created_at - Duration::minutes(120),
            expires_at: Some(Utc::now() - Duration::minutes(1)),
        });
        sessions.sessions.write().insert(session.id.clone(), expired);

        assert_eq!(sessions.current(Some(&session.id)).err(), Some(ConsoleError::NotConnected));
        assert!(sessions.sessions.read().is_empty());
    }

    #[test]
    fn test_table_capped_without_expiry() {
        let sessions = manager(0).with_max_sessions(2);
        let first = sessions.connect("key-1", "s", "").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = sessions.connect("key-2", "s", "").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let third = sessions.connect("key-3", "s", "").unwrap();

        assert_eq!(sessions.active_count(), 2);
        assert_eq!(sessions.current(Some(&first.id)).err(), Some(ConsoleError::NotConnected));
        assert!(sessions.current(Some(&second.id)).is_ok());
        assert!(sessions.current(Some(&third.id)).is_ok());
    }

    #[test]
    fn test_active_count_purges_expired() {
        let sessions = manager(60);
        let session = sessions.connect("AKIAEXAMPLE", "secret", "").unwrap();
        let expired = Arc::new(Session {
            id: session.id.clone(),
            access_key: session.access_key.clone(),
            region: session.region.clone(),
            store: session.store.clone(),
            created_at: session.created_at,
            expires_at: Some(Utc::now() - Duration::minutes(1)),
        });
        sessions.sessions.write().insert(session.id.clone(), expired);

        assert_eq!(sessions.active_count(), 0);
        assert!(sessions.sessions.read().is_empty());
    }

    #[test]
    fn test_mask_access_key() {
        assert_eq!(mask_access_key("AKIAEXAMPLE"), "*******MPLE");
        assert_eq!(mask_access_key("abc"), "***");
    }
}
