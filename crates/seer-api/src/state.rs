//! 애플리케이션 공유 상태.

use seer_core::{Result, SeerError};
use seer_data::PredictionStore;
use seer_feed::FeedSynchronizer;
use std::sync::Arc;

use crate::config::SweepConfig;

/// 핸들러가 공유하는 애플리케이션 상태.
///
/// 모든 필드는 시작 시 한 번 조립되고 이후 불변입니다.
pub struct AppState {
    /// 가격 이력 동기화기 (피드 + 저장소)
    pub synchronizer: Arc<FeedSynchronizer>,
    /// 예측 저장소 (영속 테이블 + 미러)
    pub predictions: Arc<PredictionStore>,
    /// 스윕 대상 자산/차수 설정
    pub sweep: SweepConfig,
}

impl AppState {
    pub fn new(
        synchronizer: Arc<FeedSynchronizer>,
        predictions: Arc<PredictionStore>,
        sweep: SweepConfig,
    ) -> Self {
        Self {
            synchronizer,
            predictions,
            sweep,
        }
    }

    /// 추적 대상 자산인지 검증.
    ///
    /// 추적 목록에 없는 자산 코드는 [`SeerError::UnknownAsset`]입니다.
    pub fn ensure_tracked(&self, asset: &str) -> Result<()> {
        if self.sweep.assets.iter().any(|a| a == asset) {
            Ok(())
        } else {
            Err(SeerError::UnknownAsset(asset.to_string()))
        }
    }
}
