use axum::{
    routing::{get, post},
    Router,
    extract::DefaultBodyLimit,
    response::{Response, IntoResponse},
    http::{header, StatusCode, Uri},
    Json,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_cookies::CookieManagerLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use rust_embed::RustEmbed;

/// Embedded console page / 嵌入的控制台页面
#[derive(RustEmbed)]
#[folder = "assets"]
struct ConsoleAssets;

mod api;
mod state;

use s3_console::config;
use s3_console::storage::StoreRegistry;
use state::AppState;

/// Handle embedded static file requests / 处理嵌入的静态文件请求
async fn serve_embedded_file(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    if path.starts_with("api/") {
        return (
            StatusCode::NOT_FOUND,
            Json(api::ApiResponse::<()>::error(404, "Not Found")),
        )
            .into_response();
    }

    // Try to get requested file / 尝试获取请求的文件
    if let Some(content) = ConsoleAssets::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return ([(header::CONTENT_TYPE, mime.as_ref().to_string())], content.data.into_owned()).into_response();
    }

    // Unknown paths get index.html (SPA routing support) / 未知路径返回index.html
    match ConsoleAssets::get("index.html") {
        Some(content) => (
            [(header::CONTENT_TYPE, "text/html; charset=utf-8".to_string())],
            content.data.into_owned(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Build the HTTP router / 构建路由
pub fn build_router(state: Arc<AppState>, body_limit: Option<usize>) -> Router {
    let body_limit = match body_limit {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(), // No size limit
    };

    Router::new()
        .route("/api/health", get(api::server::health_check))
        .route("/api/connect", post(api::session::connect))
        .route("/api/disconnect", post(api::session::disconnect))
        .route("/api/session", get(api::session::session_status))
        .route("/api/buckets", get(api::buckets::list_buckets))
        .route("/api/buckets/create", post(api::buckets::create_bucket))
        .route("/api/buckets/:bucket/delete", post(api::buckets::delete_bucket))
        .route("/api/objects/list", post(api::objects::list_objects))
        .route("/api/objects/mkdir", post(api::objects::mkdir))
        .route("/api/objects/operation", post(api::objects::operation))
        .route("/api/objects/upload/:bucket", post(api::upload::upload))
        // Embedded console page
        .fallback(serve_embedded_file)
        .layer(body_limit)
        .layer(CookieManagerLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "s3_console=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    config::init_config().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    let app_config = config::config();
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    // Register all storage backends / 注册所有存储后端
    let registry = StoreRegistry::new();
    s3_console::register_storage_backends(&registry, &app_config.storage);

    let factory = registry.factory(&app_config.storage.backend)?;
    tracing::info!(
        "Storage backend: {} (available: {})",
        factory.backend(),
        registry.backends().join(", ")
    );

    let state = Arc::new(AppState::new(factory, &app_config));
    let app = build_router(state, app_config.get_body_limit());

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
