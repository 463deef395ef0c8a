//! 도메인 에러 → HTTP 응답 매핑.
//!
//! - `InsufficientHistory` / `ModelFitFailure` → 422 (재시도 무의미)
//! - `UnknownAsset` → 404
//! - `FeedUnavailable` → 502 (동기화기 경계를 넘어온 경우에만)
//! - `Storage` → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use seer_core::SeerError;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

/// API 에러 응답 본문.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// 사람이 읽을 수 있는 에러 메시지
    pub error: String,
}

/// 핸들러 경계의 에러 래퍼.
#[derive(Debug)]
pub struct ApiError(pub SeerError);

impl From<SeerError> for ApiError {
    fn from(err: SeerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SeerError::InsufficientHistory { .. } | SeerError::ModelFitFailure { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            SeerError::UnknownAsset(_) => StatusCode::NOT_FOUND,
            SeerError::FeedUnavailable { .. } => StatusCode::BAD_GATEWAY,
            SeerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self.0, "요청 처리 실패");
        }

        let body = ApiErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
