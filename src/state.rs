use std::sync::Arc;

use tower_cookies::{Cookie, Cookies};

use s3_console::config::AppConfig;
use s3_console::session::SessionManager;
use s3_console::storage::StoreFactory;

pub struct AppState {
    pub sessions: SessionManager,
    /// Configured backend name / 当前存储后端
    pub backend: String,
    pub cookie_name: String,
}

impl AppState {
    pub fn new(factory: Arc<dyn StoreFactory>, config: &AppConfig) -> Self {
        Self {
            backend: factory.backend().to_string(),
            sessions: SessionManager::new(factory, &config.storage.s3.region, config.session.ttl_minutes)
                .with_max_sessions(config.session.max_sessions),
            cookie_name: config.session.cookie_name.clone(),
        }
    }

    /// Session id carried by the request cookie / 从Cookie中读取会话ID
    pub fn session_id(&self, cookies: &Cookies) -> Option<String> {
        cookies.get(&self.cookie_name).map(|c| c.value().to_string())
    }

    pub fn set_session_cookie(&self, cookies: &Cookies, id: &str) {
        let mut cookie = Cookie::new(self.cookie_name.clone(), id.to_string());
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookies.add(cookie);
    }

    /// Drop the session and its cookie / 删除会话及Cookie
    pub fn end_session(&self, cookies: &Cookies) {
        self.sessions.disconnect(self.session_id(cookies).as_deref());

        // path must match for the browser to drop it
        let mut removal = Cookie::new(self.cookie_name.clone(), "");
        removal.set_path("/");
        cookies.remove(removal);
    }
}
