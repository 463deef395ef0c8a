//! REST API 서버 크레이트.
//!
//! 동기화기/예측 저장소/분석 엔진을 Axum 라우터 뒤에 조립합니다.
//!
//! # 구성요소
//!
//! - [`config`]: 환경 변수 기반 서버/스윕 설정
//! - [`state`]: 핸들러가 공유하는 애플리케이션 상태
//! - [`error`]: 도메인 에러 → HTTP 상태 코드 매핑
//! - [`routes`]: `/api/v1` 엔드포인트 핸들러
//! - [`sweep`]: 전체 자산 × 차수 백그라운드 예측 스윕
//! - [`openapi`]: OpenAPI 스펙과 Swagger UI

pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod sweep;

pub use config::{ServerConfig, SweepConfig};
pub use error::ApiError;
pub use state::AppState;
pub use sweep::SweepJob;
