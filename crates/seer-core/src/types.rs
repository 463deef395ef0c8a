//! 도메인 타입 정의.
//!
//! 원본 데이터는 느슨한 테이블 행이 아니라 고정 필드 레코드로 모델링합니다.
//! 모든 필터링/그룹핑은 타입이 명시된 컬렉션 위에서 수행됩니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 일봉 OHLCV 레코드.
///
/// (asset, date) 조합으로 유일하며, 날짜 오름차순 시리즈가
/// 모든 하위 계산의 정본(canonical) 입력입니다.
/// 생성 후 수정/삭제되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 자산 코드 (예: "BTC")
    pub asset: String,
    /// 일 단위 UTC 날짜
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// 기초 자산 기준 거래량
    pub volume: f64,
    /// 법정화폐 환산 거래량 (volume * close)
    pub fiat_volume: f64,
}

impl PriceBar {
    /// (date, close) 쌍으로 변환.
    ///
    /// 예측/백테스트 엔진은 종가 시리즈만 소비합니다.
    pub fn close_point(&self) -> (DateTime<Utc>, f64) {
        (self.date, self.close)
    }
}

/// ARIMA 모델 차수 (p, d, q).
///
/// 자기회귀 차수 / 차분 차수 / 이동평균 차수.
/// 서로 다른 차수 조합은 완전히 독립적인 신호 소스로 취급하며,
/// 비교 키로만 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelConfig {
    pub p: u32,
    pub d: u32,
    pub q: u32,
}

impl ModelConfig {
    pub fn new(p: u32, d: u32, q: u32) -> Self {
        Self { p, d, q }
    }
}

impl Default for ModelConfig {
    /// 원본 서비스의 기본 차수 (2, 1, 2).
    fn default() -> Self {
        Self { p: 2, d: 1, q: 2 }
    }
}

impl fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// 발행된 예측 레코드.
///
/// `report_date`는 예측에 사용된 마지막 관측 종가의 날짜(as-of)입니다.
/// (asset, report_date, config) 조합으로 최대 1건만 존재하며,
/// 저장 이후 변경되지 않습니다 (중복 요청은 no-op).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub asset: String,
    /// 마지막 관측 봉의 날짜 (as-of)
    pub report_date: DateTime<Utc>,
    pub config: ModelConfig,
    /// 마지막 관측 종가
    pub last_close: f64,
    /// 1일 후 예측 종가
    pub next_day_price: f64,
    /// 7일 후 예측 종가
    pub seven_day_price: f64,
}

impl Forecast {
    /// 모델이 예측한 익일 변화율 ((next - last) / last).
    ///
    /// 복합 전략의 "최고 기대 신호" 선택 기준입니다.
    pub fn expected_change(&self) -> f64 {
        (self.next_day_price - self.last_close) / self.last_close
    }

    /// 같은 유일성 키 (asset, report_date, config)를 갖는지 확인.
    pub fn same_key(&self, other: &Forecast) -> bool {
        self.asset == other.asset
            && self.report_date == other.report_date
            && self.config == other.config
    }
}

/// 성과 요약 (파생 데이터, 저장하지 않음).
///
/// 저장된 예측과 실현 종가를 조인하여 요청 시마다 재계산합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub config: ModelConfig,
    /// 자산 코드 또는 "composite"
    pub target: String,
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn model_config_display_and_default() {
        assert_eq!(ModelConfig::default(), ModelConfig::new(2, 1, 2));
        assert_eq!(ModelConfig::new(1, 0, 3).to_string(), "(1,0,3)");
    }

    #[test]
    fn forecast_expected_change() {
        let f = Forecast {
            asset: "BTC".to_string(),
            report_date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            config: ModelConfig::default(),
            last_close: 100.0,
            next_day_price: 110.0,
            seven_day_price: 120.0,
        };
        assert!((f.expected_change() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn forecast_key_ignores_values() {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let a = Forecast {
            asset: "BTC".to_string(),
            report_date: date,
            config: ModelConfig::default(),
            last_close: 100.0,
            next_day_price: 110.0,
            seven_day_price: 120.0,
        };
        let mut b = a.clone();
        b.next_day_price = 90.0;
        assert!(a.same_key(&b));
    }
}
