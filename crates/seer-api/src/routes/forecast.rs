//! 예측 endpoint.
//!
//! - `GET /api/v1/forecast/timeseries` — 이력 + 예측 결합 시리즈
//! - `GET /api/v1/forecast/summary` — 요약 레코드 조회 + 멱등 저장
//! - `GET /api/v1/forecast/latest` — 최신 report_date의 전체 자산 스냅샷

use axum::{
    extract::{Query, State},
    Json,
};
use seer_analytics::{ForecastEngine, SeriesPoint, DEFAULT_HORIZON};
use seer_core::Forecast;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use crate::{error::ApiError, routes::ModelQuery, state::AppState};

/// 시리즈 한 점 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPointDto {
    /// 날짜 (ISO 8601)
    pub date: String,
    pub close: f64,
}

impl From<&SeriesPoint> for SeriesPointDto {
    fn from(point: &SeriesPoint) -> Self {
        Self {
            date: point.date.to_rfc3339(),
            close: point.close,
        }
    }
}

/// 이력 + 예측 시리즈 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastTimeseriesResponse {
    pub asset: String,
    pub p: u32,
    pub d: u32,
    pub q: u32,
    /// 재지수화된 관측 이력
    pub history: Vec<SeriesPointDto>,
    /// 예측 꼬리 (horizon = 7)
    pub forecast: Vec<SeriesPointDto>,
}

/// 예측 요약 레코드 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRecordDto {
    pub asset: String,
    /// 마지막 관측 봉 날짜 (as-of, ISO 8601)
    pub report_date: String,
    pub p: u32,
    pub d: u32,
    pub q: u32,
    pub last_close: f64,
    pub next_day_price: f64,
    pub seven_day_price: f64,
}

impl From<&Forecast> for ForecastRecordDto {
    fn from(forecast: &Forecast) -> Self {
        Self {
            asset: forecast.asset.clone(),
            report_date: forecast.report_date.to_rfc3339(),
            p: forecast.config.p,
            d: forecast.config.d,
            q: forecast.config.q,
            last_close: forecast.last_close,
            next_day_price: forecast.next_day_price,
            seven_day_price: forecast.seven_day_price,
        }
    }
}

/// 예측 요약 응답 (저장 여부 포함).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummaryResponse {
    #[serde(flatten)]
    pub record: ForecastRecordDto,
    /// 이번 요청으로 새로 저장되었으면 true, 기존 레코드면 false
    pub stored: bool,
}

/// 최신 스냅샷 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LatestForecastsResponse {
    /// 가장 최근 report_date (저장된 예측이 없으면 null)
    pub report_date: Option<String>,
    /// 해당 날짜의 전체 자산 레코드 (자산 코드 오름차순)
    pub rows: Vec<ForecastRecordDto>,
}

/// 이력 + 예측 시리즈 조회.
#[utoipa::path(
    get,
    path = "/api/v1/forecast/timeseries",
    tag = "forecast",
    params(ModelQuery),
    responses(
        (status = 200, description = "이력과 7일 예측 시리즈", body = ForecastTimeseriesResponse),
        (status = 404, description = "추적 대상이 아닌 자산", body = crate::error::ApiErrorResponse),
        (status = 422, description = "이력 부족 또는 모델 적합 실패", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn get_timeseries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModelQuery>,
) -> Result<Json<ForecastTimeseriesResponse>, ApiError> {
    state.ensure_tracked(&query.asset)?;
    let config = query.config();

    let series = state.synchronizer.ensure_fresh(&query.asset).await?;
    let points: Vec<_> = series.iter().map(|bar| bar.close_point()).collect();

    let output = ForecastEngine::forecast(&points, config, DEFAULT_HORIZON)?;

    Ok(Json(ForecastTimeseriesResponse {
        asset: query.asset,
        p: config.p,
        d: config.d,
        q: config.q,
        history: output.history.iter().map(SeriesPointDto::from).collect(),
        forecast: output.forecast.iter().map(SeriesPointDto::from).collect(),
    }))
}

/// 예측 요약 조회 및 저장.
///
/// 요약 레코드를 계산한 뒤 예측 저장소에 멱등 저장합니다.
/// 같은 (asset, report_date, 차수) 키가 이미 있으면 조용히 무시되고
/// `stored: false`로 응답합니다.
#[utoipa::path(
    get,
    path = "/api/v1/forecast/summary",
    tag = "forecast",
    params(ModelQuery),
    responses(
        (status = 200, description = "요약 레코드 (저장 여부 포함)", body = ForecastSummaryResponse),
        (status = 404, description = "추적 대상이 아닌 자산", body = crate::error::ApiErrorResponse),
        (status = 422, description = "이력 부족 또는 모델 적합 실패", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModelQuery>,
) -> Result<Json<ForecastSummaryResponse>, ApiError> {
    state.ensure_tracked(&query.asset)?;
    let config = query.config();

    let series = state.synchronizer.ensure_fresh(&query.asset).await?;
    let points: Vec<_> = series.iter().map(|bar| bar.close_point()).collect();

    let summary = ForecastEngine::forecast_summary(&query.asset, &points, config)?;
    let stored = state.predictions.upsert(&summary).await?;
    debug!(asset = %query.asset, config = %config, stored = stored, "예측 요약 발행");

    Ok(Json(ForecastSummaryResponse {
        record: ForecastRecordDto::from(&summary),
        stored,
    }))
}

/// 최신 report_date 스냅샷 조회.
#[utoipa::path(
    get,
    path = "/api/v1/forecast/latest",
    tag = "forecast",
    responses(
        (status = 200, description = "최신 report_date의 전체 자산 예측", body = LatestForecastsResponse)
    )
)]
pub async fn get_latest(
    State(state): State<Arc<AppState>>,
) -> Json<LatestForecastsResponse> {
    let report_date = state
        .predictions
        .latest_report_date()
        .await
        .map(|d| d.to_rfc3339());
    let rows = state
        .predictions
        .snapshot_latest()
        .await
        .iter()
        .map(ForecastRecordDto::from)
        .collect();

    Json(LatestForecastsResponse { report_date, rows })
}
