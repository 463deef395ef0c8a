//! 가격 이력 endpoint.
//!
//! `GET /api/v1/prices/history?asset=` — 동기화된 일봉 시리즈를 반환합니다.
//! 응답 전에 항상 동기화기를 거치므로 가능한 한 최신 데이터입니다
//! (피드 장애 시에는 보유 중인 stale 시리즈).

use axum::{
    extract::{Query, State},
    Json,
};
use seer_core::PriceBar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::{error::ApiError, state::AppState};

/// 가격 이력 쿼리.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PriceHistoryQuery {
    /// 자산 코드 (예: BTC)
    pub asset: String,
}

/// 일봉 응답 레코드.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceBarDto {
    /// 봉 날짜 (ISO 8601)
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// 기초 자산 기준 거래량
    pub volume: f64,
    /// 법정화폐 환산 거래량
    pub fiat_volume: f64,
}

impl From<&PriceBar> for PriceBarDto {
    fn from(bar: &PriceBar) -> Self {
        Self {
            date: bar.date.to_rfc3339(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            fiat_volume: bar.fiat_volume,
        }
    }
}

/// 가격 이력 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryResponse {
    pub asset: String,
    pub count: usize,
    /// 날짜 오름차순 일봉
    pub bars: Vec<PriceBarDto>,
}

/// 일봉 가격 이력 조회.
#[utoipa::path(
    get,
    path = "/api/v1/prices/history",
    tag = "prices",
    params(PriceHistoryQuery),
    responses(
        (status = 200, description = "동기화된 일봉 시리즈", body = PriceHistoryResponse),
        (status = 404, description = "추적 대상이 아닌 자산", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn get_price_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PriceHistoryQuery>,
) -> Result<Json<PriceHistoryResponse>, ApiError> {
    state.ensure_tracked(&query.asset)?;

    let series = state.synchronizer.ensure_fresh(&query.asset).await?;
    let bars: Vec<PriceBarDto> = series.iter().map(PriceBarDto::from).collect();

    Ok(Json(PriceHistoryResponse {
        asset: query.asset,
        count: bars.len(),
        bars,
    }))
}
