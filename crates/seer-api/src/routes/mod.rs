//! API 라우트 정의.
//!
//! 모든 자산 지정 엔드포인트는 `?asset=BTC` 쿼리와 선택적 `p`,`d`,`q`
//! 차수 재정의(기본 2,1,2)를 받습니다.

use axum::{
    routing::{get, post},
    Router,
};
use seer_core::ModelConfig;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::state::AppState;

pub mod backtest;
pub mod forecast;
pub mod performance;
pub mod prices;
pub mod sweep;

/// 자산 + 차수 공통 쿼리.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ModelQuery {
    /// 자산 코드 (예: BTC)
    pub asset: String,
    /// 자기회귀 차수 (기본 2)
    pub p: Option<u32>,
    /// 차분 차수 (기본 1)
    pub d: Option<u32>,
    /// 이동평균 차수 (기본 2)
    pub q: Option<u32>,
}

impl ModelQuery {
    /// 재정의가 없는 자리는 기본 차수로 채운 설정 반환.
    pub fn config(&self) -> ModelConfig {
        let base = ModelConfig::default();
        ModelConfig::new(
            self.p.unwrap_or(base.p),
            self.d.unwrap_or(base.d),
            self.q.unwrap_or(base.q),
        )
    }
}

/// 헬스 체크.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "서버 정상", body = String)
    )
)]
pub async fn health() -> &'static str {
    "ok"
}

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/prices/history", get(prices::get_price_history))
        .route("/api/v1/forecast/timeseries", get(forecast::get_timeseries))
        .route("/api/v1/forecast/summary", get(forecast::get_summary))
        .route("/api/v1/forecast/latest", get(forecast::get_latest))
        .route("/api/v1/performance", get(performance::get_performance))
        .route(
            "/api/v1/performance/all",
            get(performance::get_performance_all),
        )
        .route("/api/v1/backtest", get(backtest::get_backtest))
        .route("/api/v1/sweep", post(sweep::trigger_sweep))
}
