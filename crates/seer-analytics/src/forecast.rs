//! 예측 엔진.
//!
//! 종가 시리즈에 대한 로그 공간 ARIMA 절차:
//!
//! 1. 날짜 오름차순 정렬, 0 이하/비유한 종가 제거 (로그 변환 전제)
//! 2. 자연로그 변환
//! 3. ARIMA(p, d, q) 적합
//! 4. `horizon` 단계 로그 공간 점 예측
//! 5. i번째 예측에 마지막 관측일 + i일 날짜 부여
//! 6. 지수 변환으로 가격 공간 복원
//!
//! 반환 시리즈는 재지수화된 이력 + 예측 꼬리입니다. 이력 구간은
//! log/exp 왕복만 거치므로 원래 종가와의 상대 오차는 부동소수점
//! 드리프트(1e-9 이내)뿐입니다.

use chrono::{DateTime, Duration, Utc};
use seer_core::{Forecast, ModelConfig, Result, SeerError};
use serde::Serialize;

use crate::arima::ArimaModel;

/// 기본 예측 구간 (7일).
pub const DEFAULT_HORIZON: usize = 7;

/// 시리즈 한 점 (날짜, 종가).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: DateTime<Utc>,
    pub close: f64,
}

/// 예측 결과.
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    /// 재지수화된 관측 이력 (날짜 오름차순)
    pub history: Vec<SeriesPoint>,
    /// 예측 꼬리 (길이 = horizon, 날짜 오름차순)
    pub forecast: Vec<SeriesPoint>,
}

impl ForecastOutput {
    /// 이력 + 예측을 하나의 날짜순 시리즈로 결합.
    pub fn combined(&self) -> Vec<SeriesPoint> {
        let mut series = self.history.clone();
        series.extend(self.forecast.iter().copied());
        series
    }
}

/// 예측 엔진 (무상태).
pub struct ForecastEngine;

impl ForecastEngine {
    /// (date, close) 시리즈에 대해 `horizon`일 예측 수행.
    pub fn forecast(
        series: &[(DateTime<Utc>, f64)],
        config: ModelConfig,
        horizon: usize,
    ) -> Result<ForecastOutput> {
        let mut points: Vec<(DateTime<Utc>, f64)> = series
            .iter()
            .copied()
            .filter(|(_, close)| close.is_finite() && *close > 0.0)
            .collect();
        points.sort_by(|a, b| a.0.cmp(&b.0));

        let Some(&(last_date, _)) = points.last() else {
            return Err(SeerError::InsufficientHistory {
                required: 1,
                actual: 0,
            });
        };

        let log_closes: Vec<f64> = points.iter().map(|(_, close)| close.ln()).collect();

        let model = ArimaModel::fit(&log_closes, config)?;
        let log_forecast = model.forecast(&log_closes, horizon);

        let history: Vec<SeriesPoint> = points
            .iter()
            .zip(log_closes.iter())
            .map(|(&(date, _), &log_close)| SeriesPoint {
                date,
                close: log_close.exp(),
            })
            .collect();

        let forecast: Vec<SeriesPoint> = log_forecast
            .iter()
            .enumerate()
            .map(|(i, &log_close)| SeriesPoint {
                date: last_date + Duration::days(i as i64 + 1),
                close: log_close.exp(),
            })
            .collect();

        Ok(ForecastOutput { history, forecast })
    }

    /// 7일 예측을 요약 레코드로 변환.
    ///
    /// report_date는 마지막 관측 봉의 날짜, next/seven은 1일/7일 후 예측가입니다.
    pub fn forecast_summary(
        asset: &str,
        series: &[(DateTime<Utc>, f64)],
        config: ModelConfig,
    ) -> Result<Forecast> {
        let output = Self::forecast(series, config, DEFAULT_HORIZON)?;

        let (Some(last), Some(next_day), Some(seven_day)) = (
            output.history.last(),
            output.forecast.first(),
            output.forecast.get(DEFAULT_HORIZON - 1),
        ) else {
            return Err(SeerError::ModelFitFailure {
                config,
                reason: "예측 구간이 비어 있습니다".to_string(),
            });
        };

        Ok(Forecast {
            asset: asset.to_string(),
            report_date: last.date,
            config,
            last_close: last.close,
            next_day_price: next_day.close,
            seven_day_price: seven_day.close,
        })
    }
}
