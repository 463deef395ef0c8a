//! 영속 저장 계층.
//!
//! 두 개의 테이블을 소유합니다:
//!
//! - `crypto_prices`: 일봉 가격 이력, (asset, date) 키. append-only.
//! - `crypto_predictions`: 발행된 예측 이력, (asset, report_date, p, d, q) 키.
//!   원자적 insert-if-absent로 중복을 흡수합니다.
//!
//! 예측 저장소는 쓰기 관통(write-through) 인메모리 미러를 함께 유지하며,
//! 프로세스 시작 시 전체 재수화(rehydrate) 후에만 읽기를 서빙합니다.

pub mod mirror;
pub mod prediction_store;
pub mod price_history;

pub use mirror::ForecastMirror;
pub use prediction_store::PredictionStore;
pub use price_history::PriceHistoryStore;
