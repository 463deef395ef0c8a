//! 예측 서비스 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다. 시작 시 Postgres에 연결해
//! 저장소 테이블을 보장하고 예측 미러를 재수화한 뒤, 설정에 따라
//! 백그라운드 예측 스윕 데몬을 함께 띄웁니다.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use seer_api::{
    openapi::swagger_ui_router, routes::create_api_router, AppState, ServerConfig, SweepConfig,
    SweepJob,
};
use seer_data::{PredictionStore, PriceHistoryStore};
use seer_feed::{client::DEFAULT_BASE_URL, CoinbaseClient, FeedSynchronizer};

/// CORS 미들웨어 구성.
///
/// CORS_ORIGINS 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그 또는 `EXPORT_OPENAPI` 환경변수가 설정된 경우
/// OpenAPI JSON 스펙을 stdout으로 출력하고 종료합니다.
fn handle_export_openapi() -> anyhow::Result<()> {
    use seer_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    let export_flag = std::env::args().any(|arg| arg == "--export-openapi");
    let export_env = std::env::var("EXPORT_OPENAPI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    if export_flag || export_env {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&spec)?;
        println!("{}", json);
        std::process::exit(0);
    }

    Ok(())
}

/// AppState 초기화.
///
/// Postgres 연결, 저장소 테이블 보장, 미러 재수화, 동기화기 조립.
async fn create_app_state(sweep: SweepConfig) -> anyhow::Result<AppState> {
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL 환경변수가 필요합니다")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Postgres 연결 실패")?;
    info!("Postgres 연결 완료");

    let history = Arc::new(PriceHistoryStore::connect(pool.clone()).await?);
    let predictions = Arc::new(PredictionStore::connect(pool).await?);

    let feed_base_url =
        std::env::var("FEED_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let feed = Arc::new(CoinbaseClient::new(feed_base_url));

    let synchronizer = Arc::new(FeedSynchronizer::new(feed, history));

    Ok(AppState::new(synchronizer, predictions, sweep))
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>) -> Router {
    create_api_router()
        .with_state(state)
        .merge(swagger_ui_router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // OpenAPI 내보내기 처리 (서버 시작 전)
    handle_export_openapi()?;

    // tracing 초기화
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seer_api=info,seer_feed=info,seer_data=info,tower_http=debug".into()),
        )
        .init();

    info!("Seer API 서버 시작");

    let config = ServerConfig::from_env();
    let addr = config.socket_addr().context("API_HOST/API_PORT 확인 필요")?;

    let sweep_config = SweepConfig::from_env();
    info!(
        assets = sweep_config.assets.len(),
        configs = sweep_config.configs.len(),
        interval_secs = ?sweep_config.interval_secs,
        "스윕 설정 로드"
    );

    let state = Arc::new(create_app_state(sweep_config).await?);

    // 주기 스윕 데몬 (SWEEP_INTERVAL_SECS 설정 시)
    if Arc::new(SweepJob::from_state(&state)).spawn_daemon().is_some() {
        info!("스윕 데몬 시작됨");
    }

    let app = create_router(state);

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기 (Ctrl+C 또는 SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
