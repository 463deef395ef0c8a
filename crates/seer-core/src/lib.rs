//! Seer 핵심 도메인 크레이트.
//!
//! 예측 파이프라인 전체에서 공유하는 타입과 trait 경계를 정의합니다.
//!
//! # 구성
//!
//! - [`types`]: 고정 필드 도메인 레코드 (PriceBar, ModelConfig, Forecast 등)
//! - [`error`]: 서비스 전역 에러 분류 체계
//! - [`provider`]: 외부 피드/저장소 trait 경계

pub mod error;
pub mod provider;
pub mod types;

pub use error::{Result, SeerError};
pub use provider::{PriceFeed, PriceHistory};
pub use types::{Forecast, ModelConfig, PerformanceSummary, PriceBar};
