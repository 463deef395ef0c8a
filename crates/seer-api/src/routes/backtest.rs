//! 백테스트 endpoint.
//!
//! `GET /api/v1/backtest?asset=&p=&d=&q=&window=` — walk-forward 매수 신호
//! 백테스트 수익률을 반환합니다.

use axum::{
    extract::{Query, State},
    Json,
};
use seer_analytics::{backtest, DEFAULT_LOOKBACK_WINDOW};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::{error::ApiError, state::AppState};

/// 백테스트 쿼리.
#[derive(Debug, Deserialize, IntoParams)]
pub struct BacktestQuery {
    /// 자산 코드 (예: BTC)
    pub asset: String,
    /// 자기회귀 차수 (기본 2)
    pub p: Option<u32>,
    /// 차분 차수 (기본 1)
    pub d: Option<u32>,
    /// 이동평균 차수 (기본 2)
    pub q: Option<u32>,
    /// lookback 윈도우 (일, 기본 30)
    pub window: Option<usize>,
}

/// 백테스트 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResponse {
    pub asset: String,
    pub p: u32,
    pub d: u32,
    pub q: u32,
    pub window: usize,
    /// 첫 윈도우 끝 시점 종가로 정규화한 수익률 (%)
    pub return_pct: f64,
}

/// walk-forward 백테스트 실행.
#[utoipa::path(
    get,
    path = "/api/v1/backtest",
    tag = "backtest",
    params(BacktestQuery),
    responses(
        (status = 200, description = "백테스트 수익률", body = BacktestResponse),
        (status = 404, description = "추적 대상이 아닌 자산", body = crate::error::ApiErrorResponse),
        (status = 422, description = "이력 부족 또는 모델 적합 실패", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn get_backtest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BacktestQuery>,
) -> Result<Json<BacktestResponse>, ApiError> {
    state.ensure_tracked(&query.asset)?;

    let base = seer_core::ModelConfig::default();
    let config = seer_core::ModelConfig::new(
        query.p.unwrap_or(base.p),
        query.d.unwrap_or(base.d),
        query.q.unwrap_or(base.q),
    );
    let window = query.window.unwrap_or(DEFAULT_LOOKBACK_WINDOW);

    let series = state.synchronizer.ensure_fresh(&query.asset).await?;
    let return_pct = backtest::run(&series, config, window)?;

    Ok(Json(BacktestResponse {
        asset: query.asset,
        p: config.p,
        d: config.d,
        q: config.q,
        window,
        return_pct,
    }))
}
