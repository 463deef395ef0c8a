//! 서비스 전역 에러 분류 체계.
//!
//! # 전파 정책
//!
//! - [`SeerError::FeedUnavailable`]: 피드 동기화 경계에서 흡수하고 로그만 남깁니다.
//!   호출자는 항상 (오래되었을 수 있는) 시리즈를 받습니다.
//! - [`SeerError::InsufficientHistory`] / [`SeerError::ModelFitFailure`]:
//!   해당 예측 요청에 치명적이며 요청 경계까지 전파됩니다. 자동 재시도 없음.
//! - [`SeerError::Storage`]: 해당 요청에 치명적. 버퍼링된 쓰기 경로 없음.
//!
//! 중복 예측 제출은 에러가 아니라 upsert 멱등성으로 조용히 흡수됩니다.

use crate::types::ModelConfig;
use thiserror::Error;

/// 예측 파이프라인 에러.
#[derive(Debug, Error)]
pub enum SeerError {
    /// 외부 피드 호출 실패 또는 비정상 페이로드 (비치명적, 로컬 데이터로 degrade)
    #[error("피드 조회 실패 ({asset}): {message}")]
    FeedUnavailable { asset: String, message: String },

    /// 요청한 모델 차수 대비 데이터 부족
    #[error("데이터 부족: 최소 {required}개 필요, 현재 {actual}개")]
    InsufficientHistory { required: usize, actual: usize },

    /// 모델 적합 수치 실패 (비수렴, 특이 행렬 등)
    #[error("ARIMA{config} 적합 실패: {reason}")]
    ModelFitFailure { config: ModelConfig, reason: String },

    /// 등록되지 않았거나 데이터가 전혀 없는 자산
    #[error("알 수 없는 자산: {0}")]
    UnknownAsset(String),

    /// 영속 저장소 에러
    #[error("저장소 에러: {0}")]
    Storage(String),
}

impl SeerError {
    /// 피드 경계에서 흡수 가능한 에러인지 확인.
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::FeedUnavailable { .. })
    }
}

/// Result 타입 별칭.
pub type Result<T> = std::result::Result<T, SeerError>;
