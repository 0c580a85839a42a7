//! Tabula Gateway
//!
//! 데이터베이스/스키마/테이블을 HTTP로 노출합니다. 요청 파라미터를 조각으로
//! 변환하고 하나의 파라미터화된 SQL 문장으로 조립해 실행합니다.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod executor;
mod handlers;
mod middleware;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tbl_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("Starting Gateway with config: {:?}", config);

    // 앱 상태 초기화
    let state = Arc::new(AppState::new(&config)?);

    // 라우터 구성
    let app = create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Gateway listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 라우터 생성
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Catalog listings
        .route("/databases", get(handlers::databases::list))
        .route("/schemas", get(handlers::schemas::list))
        .route("/tables", get(handlers::tables::list))
        .route("/:database/:schema", get(handlers::tables::list_by_schema))
        // Table CRUD
        .route(
            "/:database/:schema/:table",
            get(handlers::tables::select)
                .post(handlers::tables::insert)
                .patch(handlers::tables::update)
                .put(handlers::tables::update)
                .delete(handlers::tables::delete),
        )
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(from_fn(middleware::request_id))
        // State
        .with_state(state)
}
