//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::routes::{
    backtest::BacktestResponse,
    forecast::{
        ForecastRecordDto, ForecastSummaryResponse, ForecastTimeseriesResponse,
        LatestForecastsResponse, SeriesPointDto,
    },
    performance::{PerformanceAllResponse, PerformanceSummaryDto},
    prices::{PriceBarDto, PriceHistoryResponse},
    sweep::SweepAcceptedResponse,
};

/// Seer API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Seer Forecast API",
        version = "0.4.2",
        description = r#"
# Seer 암호화폐 예측 서비스 REST API

일봉 가격 이력 동기화, ARIMA 예측, walk-forward 백테스트,
저장된 예측 대비 성과 평가를 제공합니다.

## 주요 기능

- **가격 이력**: 외부 피드에서 증분 동기화된 일봉 시리즈
- **예측**: 로그 변환 ARIMA 기반 7일 예측과 멱등 저장
- **백테스트**: trailing 윈도우 매수 신호 시뮬레이션
- **성과**: 자산별/복합 전략 복리 수익률
- **스윕**: 전체 자산 × 차수 백그라운드 예측 발행
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "prices", description = "가격 이력 - 동기화된 일봉 조회"),
        (name = "forecast", description = "예측 - ARIMA 시리즈/요약/최신 스냅샷"),
        (name = "performance", description = "성과 - 저장된 예측 대비 복리 수익률"),
        (name = "backtest", description = "백테스트 - walk-forward 매수 신호 시뮬레이션"),
        (name = "sweep", description = "스윕 - 전체 자산 × 차수 예측 발행")
    ),
    components(
        schemas(
            ApiErrorResponse,
            PriceBarDto,
            PriceHistoryResponse,
            SeriesPointDto,
            ForecastTimeseriesResponse,
            ForecastRecordDto,
            ForecastSummaryResponse,
            LatestForecastsResponse,
            PerformanceSummaryDto,
            PerformanceAllResponse,
            BacktestResponse,
            SweepAcceptedResponse,
        )
    ),
    paths(
        crate::routes::health,
        crate::routes::prices::get_price_history,
        crate::routes::forecast::get_timeseries,
        crate::routes::forecast::get_summary,
        crate::routes::forecast::get_latest,
        crate::routes::performance::get_performance,
        crate::routes::performance::get_performance_all,
        crate::routes::backtest::get_backtest,
        crate::routes::sweep::trigger_sweep,
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
///
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_spec_is_valid_and_lists_endpoints() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&spec).unwrap();

        assert!(json.contains("Seer Forecast API"));
        assert!(json.contains("/health"));
        assert!(json.contains("/api/v1/prices/history"));
        assert!(json.contains("/api/v1/forecast/timeseries"));
        assert!(json.contains("/api/v1/forecast/summary"));
        assert!(json.contains("/api/v1/forecast/latest"));
        assert!(json.contains("/api/v1/performance"));
        assert!(json.contains("/api/v1/performance/all"));
        assert!(json.contains("/api/v1/backtest"));
        assert!(json.contains("/api/v1/sweep"));
    }

    #[test]
    fn openapi_contains_schemas() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).unwrap();

        assert!(json.contains("PriceHistoryResponse"));
        assert!(json.contains("ForecastTimeseriesResponse"));
        assert!(json.contains("PerformanceSummaryDto"));
        assert!(json.contains("ApiErrorResponse"));
    }

    #[test]
    fn swagger_ui_router_creates() {
        let _router: Router<()> = swagger_ui_router();
    }
}
