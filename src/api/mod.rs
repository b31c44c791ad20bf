pub mod buckets;
pub mod objects;
pub mod server;
pub mod session;
pub mod upload;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tower_cookies::Cookies;

use s3_console::error::ConsoleError;
use s3_console::session::Session;

use crate::state::AppState;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            code: 200,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Console error rendered as the JSON envelope / 以统一响应格式返回的错误
#[derive(Debug)]
pub struct ApiError(pub ConsoleError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let status = u16::try_from(code)
            .ok()
            .and_then(|c| StatusCode::from_u16(c).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ApiResponse::<()>::error(code, &self.0.to_string()))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Report a failed operation; session-ending errors also drop the session.
/// 操作失败：凭证类错误会同时清除会话
pub fn fail(state: &AppState, cookies: &Cookies, err: ConsoleError) -> ApiError {
    if err.ends_session() {
        state.end_session(cookies);
        tracing::warn!("Session ended: {}", err);
    } else {
        tracing::warn!("Operation failed: {}", err);
    }
    ApiError(err)
}

/// Resolve the caller's session or fail with NotConnected / 获取当前会话
pub fn current_session(state: &AppState, cookies: &Cookies) -> Result<Arc<Session>, ApiError> {
    state
        .sessions
        .current(state.session_id(cookies).as_deref())
        .map_err(|err| fail(state, cookies, err))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use s3_console::config::AppConfig;
    use s3_console::drivers::memory::{MemoryStoreFactory, MemoryWorld};

    use crate::build_router;
    use crate::state::AppState;

    fn test_app(world: MemoryWorld) -> Router {
        let config = AppConfig::default();
        let state = Arc::new(AppState::new(Arc::new(MemoryStoreFactory::new(world)), &config));
        build_router(state, config.get_body_limit())
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, cookie, body)
    }

    fn post_json(uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn connect(app: &Router) -> String {
        let (status, cookie, body) = send(
            app,
            post_json("/api/connect", None, json!({"access_key": "AKIADEMO", "secret_key": "secret"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        cookie.unwrap()
    }

    #[tokio::test]
    async fn test_requires_session() {
        let app = test_app(MemoryWorld::new());
        let (status, _, body) = send(&app, get("/api/buckets", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 401);
    }

    #[tokio::test]
    async fn test_connect_with_bad_credentials() {
        let world = MemoryWorld::new();
        world.add_account("AKIADEMO", "right");
        let app = test_app(world);

        let (status, _, body) = send(
            &app,
            post_json("/api/connect", None, json!({"access_key": "AKIADEMO", "secret_key": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["message"].as_str().unwrap().contains("authentication failed"));
    }

    #[tokio::test]
    async fn test_end_to_end_over_http() {
        let app = test_app(MemoryWorld::new());
        let cookie = connect(&app).await;
        let cookie = Some(cookie.as_str());

        let (status, _, body) = send(&app, post_json("/api/buckets/create", cookie, json!({"bucket_name": "demo-1"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Bucket 'demo-1' created successfully.");

        let (status, _, _) = send(&app, post_json("/api/buckets/create", cookie, json!({"bucket_name": "demo-1"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _, _) = send(
            &app,
            post_json("/api/objects/mkdir", cookie, json!({"bucket_name": "demo-1", "folder_name": "docs"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let boundary = "console-boundary";
        let multipart = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\nContent-Type: text/plain\r\n\r\nhi\r\n--{b}--\r\n",
            b = boundary
        );
        let upload = Request::builder()
            .method("POST")
            .uri("/api/objects/upload/demo-1")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .header(header::COOKIE, cookie.unwrap())
            .body(Body::from(multipart))
            .unwrap();
        let (status, _, body) = send(&app, upload).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["data"]["uploaded"], json!(["a.txt"]));

        let (_, _, body) = send(&app, post_json("/api/objects/list", cookie, json!({"bucket_name": "demo-1"}))).await;
        let mut keys: Vec<&str> = body["data"]["keys"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["key"].as_str().unwrap())
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["a.txt", "docs/"]);
        assert_eq!(body["data"]["view"]["folders"][0]["prefix"], "docs/");

        let (status, _, body) = send(
            &app,
            post_json(
                "/api/objects/operation",
                cookie,
                json!({"bucket_name": "demo-1", "selected_objects": ["a.txt"], "action": "delete"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["succeeded"], 1);

        let (_, _, body) = send(&app, post_json("/api/objects/list", cookie, json!({"bucket_name": "demo-1"}))).await;
        assert_eq!(body["data"]["keys"].as_array().unwrap().len(), 1);

        let (status, _, body) = send(&app, post_json("/api/buckets/demo-1/delete", cookie, json!({}))).await;
        assert_eq!(status, StatusCode::CONFLICT, "{}", body);
    }

    #[tokio::test]
    async fn test_disconnect_clears_session() {
        let app = test_app(MemoryWorld::new());
        let cookie = connect(&app).await;

        let (_, _, body) = send(&app, get("/api/session", Some(&cookie))).await;
        assert_eq!(body["data"]["connected"], true);
        assert_eq!(body["data"]["session"]["access_key"], "****DEMO");

        let (status, _, _) = send(&app, post_json("/api/disconnect", Some(&cookie), json!({}))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, body) = send(&app, get("/api/session", Some(&cookie))).await;
        assert_eq!(body["data"]["connected"], false);
        let (status, _, _) = send(&app, get("/api/buckets", Some(&cookie))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_operation_requires_destination() {
        let app = test_app(MemoryWorld::new());
        let cookie = connect(&app).await;
        let (status, _, body) = send(
            &app,
            post_json(
                "/api/objects/operation",
                Some(&cookie),
                json!({"bucket_name": "b", "selected_objects": ["k"], "action": "move"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(MemoryWorld::new());
        let (status, _, body) = send(&app, get("/api/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["backend"], "memory");
    }
}
