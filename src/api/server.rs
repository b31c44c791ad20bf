use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub build_time: &'static str,
    pub backend: String,
    pub active_sessions: usize,
}

/// GET /api/health - 健康检查
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        build_time: env!("BUILD_TIME"),
        backend: state.backend.clone(),
        active_sessions: state.sessions.active_count(),
    }))
}
