//! 성과 endpoint.
//!
//! - `GET /api/v1/performance` — 자산 × 차수 단일 요약
//! - `GET /api/v1/performance/all` — 추적 자산 × 설정 차수 전체 + 복합 전략

use axum::{
    extract::{Query, State},
    Json,
};
use seer_analytics::PerformanceEvaluator;
use seer_core::PerformanceSummary;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{error::ApiError, routes::ModelQuery, state::AppState};

/// 성과 요약 응답 레코드.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummaryDto {
    /// 자산 코드 또는 "composite"
    pub target: String,
    pub p: u32,
    pub d: u32,
    pub q: u32,
    /// 전체 기간 복리 수익률 (%)
    pub total_return_pct: f64,
    /// 최근 30건 복리 수익률 (%)
    pub last_30d_return_pct: f64,
    /// 최근 7건 복리 수익률 (%)
    pub last_7d_return_pct: f64,
    /// 최근 1건 수익률 (%)
    pub last_1d_return_pct: f64,
    /// 동일 구간 단순 보유 수익률 (%)
    pub hold_return_pct: f64,
    /// 평가에 사용된 실현 레코드 수
    pub sample_size: usize,
}

impl From<&PerformanceSummary> for PerformanceSummaryDto {
    fn from(summary: &PerformanceSummary) -> Self {
        Self {
            target: summary.target.clone(),
            p: summary.config.p,
            d: summary.config.d,
            q: summary.config.q,
            total_return_pct: summary.total_return_pct,
            last_30d_return_pct: summary.last_30d_return_pct,
            last_7d_return_pct: summary.last_7d_return_pct,
            last_1d_return_pct: summary.last_1d_return_pct,
            hold_return_pct: summary.hold_return_pct,
            sample_size: summary.sample_size,
        }
    }
}

/// 전체 성과 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAllResponse {
    pub rows: Vec<PerformanceSummaryDto>,
}

/// 자산 × 차수 성과 조회.
#[utoipa::path(
    get,
    path = "/api/v1/performance",
    tag = "performance",
    params(ModelQuery),
    responses(
        (status = 200, description = "자산 성과 요약", body = PerformanceSummaryDto),
        (status = 404, description = "추적 대상이 아닌 자산", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn get_performance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModelQuery>,
) -> Result<Json<PerformanceSummaryDto>, ApiError> {
    state.ensure_tracked(&query.asset)?;
    let config = query.config();

    let rows = state
        .predictions
        .query(Some(query.asset.as_str()), Some(config))
        .await;
    let summary = PerformanceEvaluator::evaluate(&query.asset, config, &rows);

    Ok(Json(PerformanceSummaryDto::from(&summary)))
}

/// 전체 추적 자산 × 설정 차수 성과 조회.
///
/// 차수마다 자산별 요약에 더해 "최고 기대 신호" 복합 전략 요약을
/// 함께 반환합니다.
#[utoipa::path(
    get,
    path = "/api/v1/performance/all",
    tag = "performance",
    responses(
        (status = 200, description = "전체 성과 요약 + 복합 전략", body = PerformanceAllResponse)
    )
)]
pub async fn get_performance_all(
    State(state): State<Arc<AppState>>,
) -> Json<PerformanceAllResponse> {
    let mut rows: Vec<PerformanceSummaryDto> = Vec::new();

    for config in &state.sweep.configs {
        let mut config_rows = Vec::new();
        for asset in &state.sweep.assets {
            let stored = state
                .predictions
                .query(Some(asset.as_str()), Some(*config))
                .await;
            let summary = PerformanceEvaluator::evaluate(asset, *config, &stored);
            rows.push(PerformanceSummaryDto::from(&summary));
            config_rows.extend(stored);
        }

        let composite = PerformanceEvaluator::evaluate_composite(*config, &config_rows);
        rows.push(PerformanceSummaryDto::from(&composite));
    }

    Json(PerformanceAllResponse { rows })
}
