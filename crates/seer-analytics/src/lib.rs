//! 분석 엔진 크레이트.
//!
//! 순수 계산만 담당합니다 — I/O 없음, 전역 상태 없음.
//! 입력은 타입이 명시된 시리즈/레코드 컬렉션이고 출력은 값입니다.
//!
//! # 주요 구성요소
//!
//! - [`arima`]: ARIMA(p, d, q) 적합과 다단계 예측
//! - [`forecast`]: 로그 변환 기반 예측 절차 ([`ForecastEngine`])
//! - [`backtest`]: walk-forward 매수 신호 백테스트
//! - [`performance`]: 저장된 예측 대비 실현 성과 평가

pub mod arima;
pub mod backtest;
pub mod forecast;
pub mod performance;

pub use arima::ArimaModel;
pub use backtest::DEFAULT_LOOKBACK_WINDOW;
pub use forecast::{ForecastEngine, ForecastOutput, SeriesPoint, DEFAULT_HORIZON};
pub use performance::{PerformanceEvaluator, COMPOSITE_TARGET};
