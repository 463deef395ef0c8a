//! 스윕 트리거 endpoint.
//!
//! `POST /api/v1/sweep` — 전체 자산 × 차수 예측 스윕을 백그라운드로
//! 시작하고 즉시 202로 응답합니다 (fire-and-forget).

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::{state::AppState, sweep::SweepJob};

/// 스윕 접수 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepAcceptedResponse {
    pub status: String,
    /// 스윕 대상 자산 수
    pub assets: usize,
    /// 자산당 차수 조합 수
    pub configs: usize,
}

/// 예측 스윕 시작.
#[utoipa::path(
    post,
    path = "/api/v1/sweep",
    tag = "sweep",
    responses(
        (status = 202, description = "스윕 접수, 백그라운드 실행", body = SweepAcceptedResponse)
    )
)]
pub async fn trigger_sweep(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SweepAcceptedResponse>) {
    let job = SweepJob::from_state(&state);
    let assets = state.sweep.assets.len();
    let configs = state.sweep.configs.len();

    info!(assets = assets, configs = configs, "스윕 트리거 접수");
    tokio::spawn(async move {
        job.run_once().await;
    });

    (
        StatusCode::ACCEPTED,
        Json(SweepAcceptedResponse {
            status: "accepted".to_string(),
            assets,
            configs,
        }),
    )
}
