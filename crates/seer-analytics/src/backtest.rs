//! Walk-forward 매수 신호 백테스트.
//!
//! 과거 시리즈를 앞으로 걸어가며 각 trailing 윈도우에 대해 1일 예측을
//! 수행하고, "내일 종가 > 오늘 종가" 매수 신호의 수익을 누적합니다.
//!
//! 결과는 `100 * 누적수익 / 첫 윈도우 끝 시점 종가`입니다 — 복리가 아니라
//! 단일 고정 가격으로 정규화한 값으로, 성과 평가기의 복리 지표와는
//! 의도적으로 구분되는 별도 지표입니다.

use seer_core::{ModelConfig, PriceBar, Result, SeerError};
use tracing::debug;

use crate::forecast::ForecastEngine;

/// 기본 lookback 윈도우 (일).
pub const DEFAULT_LOOKBACK_WINDOW: usize = 30;

/// walk-forward 백테스트 수행, 수익률(%)을 반환.
///
/// 각 윈도우 시작 i (0..len-window)에 대해:
/// 길이 `lookback_window`의 슬라이스로 1일 예측 → 예측 종가가 슬라이스
/// 마지막 실제 종가보다 크면 매수 → `close[i+window] - close[i+window-1]`
/// 누적. 매수 신호가 전혀 없으면 정확히 0.0입니다.
///
/// 예측 수치 실패는 그대로 전파됩니다 (폴백 없음).
pub fn run(series: &[PriceBar], config: ModelConfig, lookback_window: usize) -> Result<f64> {
    if lookback_window == 0 || series.len() <= lookback_window {
        return Err(SeerError::InsufficientHistory {
            required: lookback_window + 1,
            actual: series.len(),
        });
    }

    let mut profit = 0.0;
    let mut buy_signals = 0usize;
    let windows = series.len() - lookback_window;

    for i in 0..windows {
        let slice = &series[i..i + lookback_window];
        let points: Vec<_> = slice.iter().map(|bar| bar.close_point()).collect();

        let output = ForecastEngine::forecast(&points, config, 1)?;
        let Some(predicted) = output.forecast.first() else {
            continue;
        };

        let last_close = slice[lookback_window - 1].close;
        if predicted.close > last_close {
            buy_signals += 1;
            profit += series[i + lookback_window].close - last_close;
        }
    }

    let baseline = series[lookback_window - 1].close;
    let return_pct = profit / baseline * 100.0;

    debug!(
        config = %config,
        windows = windows,
        buy_signals = buy_signals,
        return_pct = return_pct,
        "백테스트 완료"
    );
    Ok(return_pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn bar(date: DateTime<Utc>, close: f64) -> PriceBar {
        PriceBar {
            asset: "BTC".to_string(),
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
            fiat_volume: close,
        }
    }

    fn series_from(closes: &[f64]) -> Vec<PriceBar> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| bar(base + Duration::days(i as i64), close))
            .collect()
    }

    #[test]
    fn strictly_declining_series_yields_exactly_zero() {
        // 기하급수적으로 하락 → 드리프트 모델 예측은 항상 하락 → 매수 없음
        let closes: Vec<f64> = (0..40).map(|i| 100.0 * 0.99f64.powi(i)).collect();
        let series = series_from(&closes);

        let result = run(&series, ModelConfig::new(0, 1, 0), 15).unwrap();
        assert_eq!(result, 0.0);
    }

    #[test]
    fn rising_series_accrues_every_daily_move() {
        // 기하급수적으로 상승 → 모든 윈도우에서 매수 신호
        let closes: Vec<f64> = (0..40).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let series = series_from(&closes);
        let window = 15;

        let result = run(&series, ModelConfig::new(0, 1, 0), window).unwrap();

        // 매일 매수하면 누적 수익 = close[n-1] - close[window-1] (텔레스코핑)
        let expected =
            (closes[closes.len() - 1] - closes[window - 1]) / closes[window - 1] * 100.0;
        assert!((result - expected).abs() < 1e-9);
        assert!(result > 0.0);
    }

    #[test]
    fn too_short_series_is_an_error() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let series = series_from(&closes);
        let err = run(&series, ModelConfig::default(), 30).unwrap_err();
        assert!(matches!(err, SeerError::InsufficientHistory { .. }));
    }
}
