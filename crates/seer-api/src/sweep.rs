//! 전체 자산 × 차수 예측 스윕.
//!
//! 추적 자산마다 이력을 동기화한 뒤, 후보 차수 조합 전부에 대해
//! 7일 예측 요약을 계산하고 예측 저장소에 멱등 저장합니다.
//!
//! # 실패 정책
//!
//! 개별 자산/차수의 실패는 로그만 남기고 건너뜁니다.
//! 스윕 전체가 중단되는 일은 없습니다.
//!
//! # 속도 제한
//!
//! 자산 사이에 고정 대기(`pause_ms`)를 둡니다. 피드는 공개 API이므로
//! 연속 호출 간격을 벌려야 합니다.

use seer_analytics::ForecastEngine;
use seer_data::PredictionStore;
use seer_feed::FeedSynchronizer;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::{config::SweepConfig, state::AppState};

/// 예측 스윕 작업.
pub struct SweepJob {
    synchronizer: Arc<FeedSynchronizer>,
    predictions: Arc<PredictionStore>,
    config: SweepConfig,
}

impl SweepJob {
    pub fn new(
        synchronizer: Arc<FeedSynchronizer>,
        predictions: Arc<PredictionStore>,
        config: SweepConfig,
    ) -> Self {
        Self {
            synchronizer,
            predictions,
            config,
        }
    }

    /// 애플리케이션 상태에서 스윕 작업 구성.
    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.synchronizer.clone(),
            state.predictions.clone(),
            state.sweep.clone(),
        )
    }

    /// 스윕 1회 수행.
    #[instrument(skip(self), fields(assets = self.config.assets.len(), configs = self.config.configs.len()))]
    pub async fn run_once(&self) {
        info!("예측 스윕 시작");
        let mut published = 0usize;
        let mut skipped = 0usize;

        for asset in &self.config.assets {
            let series = match self.synchronizer.ensure_fresh(asset).await {
                Ok(series) => series,
                Err(e) => {
                    warn!(asset = %asset, error = %e, "이력 동기화 실패, 자산 건너뜀");
                    skipped += 1;
                    continue;
                }
            };
            let points: Vec<_> = series.iter().map(|bar| bar.close_point()).collect();

            for config in &self.config.configs {
                let summary = match ForecastEngine::forecast_summary(asset, &points, *config) {
                    Ok(summary) => summary,
                    Err(e) => {
                        warn!(asset = %asset, config = %config, error = %e, "예측 실패, 건너뜀");
                        skipped += 1;
                        continue;
                    }
                };

                match self.predictions.upsert(&summary).await {
                    Ok(true) => {
                        published += 1;
                        debug!(asset = %asset, config = %config, "예측 발행");
                    }
                    Ok(false) => {
                        debug!(asset = %asset, config = %config, "기존 예측 존재, 무시");
                    }
                    Err(e) => {
                        warn!(asset = %asset, config = %config, error = %e, "예측 저장 실패");
                        skipped += 1;
                    }
                }
            }

            tokio::time::sleep(Duration::from_millis(self.config.pause_ms)).await;
        }

        info!(published = published, skipped = skipped, "예측 스윕 완료");
    }

    /// 고정 주기 데몬 루프 시작.
    ///
    /// `SWEEP_INTERVAL_SECS`가 설정되지 않았으면 아무것도 하지 않습니다.
    pub fn spawn_daemon(self: Arc<Self>) -> Option<JoinHandle<()>> {
        let interval_secs = self.config.interval_secs?;

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
            loop {
                ticker.tick().await;
                self.run_once().await;
            }
        }))
    }
}
