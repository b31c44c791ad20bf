use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use s3_console::console;
use s3_console::session::SessionInfo;

use crate::api::{fail, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub access_key: String,
    pub secret_key: String,
    /// Falls back to the configured region / 默认使用配置中的区域
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub session: SessionInfo,
    pub buckets: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionInfo>,
}

/// POST /api/connect - 连接存储服务
///
/// Credentials are only checked by listing buckets right away; a failure
/// there drops the new session again.
pub async fn connect(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<ConnectRequest>,
) -> ApiResult<ConnectResponse> {
    // replace whatever this browser was connected as
    state.sessions.disconnect(state.session_id(&cookies).as_deref());

    let region = req.region.as_deref().unwrap_or_default().trim();
    let session = state
        .sessions
        .connect(&req.access_key, &req.secret_key, region)
        .map_err(|err| fail(&state, &cookies, err))?;

    let buckets = match console::list_buckets(session.store.as_ref()).await {
        Ok(buckets) => buckets,
        Err(err) => {
            state.sessions.disconnect(Some(&session.id));
            return Err(fail(&state, &cookies, err));
        }
    };

    state.set_session_cookie(&cookies, &session.id);
    Ok(Json(ApiResponse::success_with_message(
        "Connected successfully.",
        ConnectResponse { session: session.info(), buckets },
    )))
}

/// POST /api/disconnect - 断开连接（幂等）
pub async fn disconnect(State(state): State<Arc<AppState>>, cookies: Cookies) -> ApiResult<()> {
    state.end_session(&cookies);
    Ok(Json(ApiResponse::success_with_message("Disconnected.", ())))
}

/// GET /api/session - 当前会话状态
pub async fn session_status(State(state): State<Arc<AppState>>, cookies: Cookies) -> ApiResult<SessionStatus> {
    let session = state.sessions.current(state.session_id(&cookies).as_deref()).ok();
    Ok(Json(ApiResponse::success(SessionStatus {
        connected: session.is_some(),
        session: session.map(|s| s.info()),
    })))
}
