//! 예측 영속 저장소.
//!
//! `crypto_predictions` 테이블과 인메모리 미러를 함께 소유합니다.
//!
//! # 멱등성 계약
//!
//! (asset, report_date, p, d, q) 키에 대한 insert-if-absent는
//! `ON CONFLICT DO NOTHING`으로 DB에서 원자적으로 수행됩니다.
//! 같은 키로 재시도/중복 제출된 예측 작업은 값이 달라도 조용히 무시되며
//! (first-writer-wins), 미러는 영속 쓰기가 새 행을 보고한 경우에만
//! 갱신되므로 두 저장소는 갈라질 수 없습니다.
//!
//! # 읽기 경로
//!
//! 모든 읽기는 미러에서 수행합니다. 프로세스 시작 시 [`PredictionStore::connect`]가
//! 테이블 전체를 미러로 재수화한 뒤에야 읽기가 가능해집니다.

use chrono::{DateTime, Utc};
use seer_core::{Forecast, ModelConfig, Result, SeerError};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::mirror::ForecastMirror;

/// 예측 데이터베이스 레코드.
#[derive(Debug, Clone, FromRow)]
struct ForecastRecord {
    asset: String,
    report_date: DateTime<Utc>,
    p: i32,
    d: i32,
    q: i32,
    last_close: f64,
    next_day_price: f64,
    seven_day_price: f64,
}

impl ForecastRecord {
    fn into_forecast(self) -> Forecast {
        Forecast {
            asset: self.asset,
            report_date: self.report_date,
            config: ModelConfig::new(self.p as u32, self.d as u32, self.q as u32),
            last_close: self.last_close,
            next_day_price: self.next_day_price,
            seven_day_price: self.seven_day_price,
        }
    }
}

/// 예측 저장소 서비스 (영속 테이블 + 쓰기 관통 미러).
pub struct PredictionStore {
    pool: PgPool,
    mirror: RwLock<ForecastMirror>,
}

impl PredictionStore {
    /// 저장소 생성. 테이블을 보장하고 미러를 전체 재수화합니다.
    pub async fn connect(pool: PgPool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS crypto_predictions (
                asset           TEXT NOT NULL,
                report_date     TIMESTAMPTZ NOT NULL,
                p               INT NOT NULL,
                d               INT NOT NULL,
                q               INT NOT NULL,
                last_close      DOUBLE PRECISION NOT NULL,
                next_day_price  DOUBLE PRECISION NOT NULL,
                seven_day_price DOUBLE PRECISION NOT NULL,
                PRIMARY KEY (asset, report_date, p, d, q)
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| SeerError::Storage(e.to_string()))?;

        let records: Vec<ForecastRecord> = sqlx::query_as(
            r#"
            SELECT asset, report_date, p, d, q,
                   last_close, next_day_price, seven_day_price
            FROM crypto_predictions
            ORDER BY report_date ASC
            "#,
        )
        .fetch_all(&pool)
        .await
        .map_err(|e| SeerError::Storage(e.to_string()))?;

        let rows: Vec<Forecast> = records.into_iter().map(|r| r.into_forecast()).collect();
        info!(rows = rows.len(), "예측 미러 재수화 완료");

        Ok(Self {
            pool,
            mirror: RwLock::new(ForecastMirror::rehydrate(rows)),
        })
    }

    /// 예측 저장 (insert-if-absent).
    ///
    /// 새로 저장되었으면 `true`, 같은 키가 이미 있어 무시되었으면 `false`.
    /// 영속 쓰기가 확인된 뒤에만 미러에 반영됩니다.
    #[instrument(skip(self, forecast), fields(asset = %forecast.asset, config = %forecast.config))]
    pub async fn upsert(&self, forecast: &Forecast) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO crypto_predictions
                (asset, report_date, p, d, q,
                 last_close, next_day_price, seven_day_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (asset, report_date, p, d, q) DO NOTHING
            "#,
        )
        .bind(&forecast.asset)
        .bind(forecast.report_date)
        .bind(forecast.config.p as i32)
        .bind(forecast.config.d as i32)
        .bind(forecast.config.q as i32)
        .bind(forecast.last_close)
        .bind(forecast.next_day_price)
        .bind(forecast.seven_day_price)
        .execute(&self.pool)
        .await
        .map_err(|e| SeerError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            // 중복 제출은 에러가 아니라 no-op
            debug!("동일 키 예측 존재, 무시");
            return Ok(false);
        }

        let mut mirror = self.mirror.write().await;
        mirror.insert_if_absent(forecast.clone());
        debug!("예측 저장 완료");
        Ok(true)
    }

    /// 자산/차수 필터 조회 (미러 읽기, report_date 오름차순).
    pub async fn query(
        &self,
        asset: Option<&str>,
        config: Option<ModelConfig>,
    ) -> Vec<Forecast> {
        self.mirror.read().await.query(asset, config)
    }

    /// 가장 최근 report_date.
    pub async fn latest_report_date(&self) -> Option<DateTime<Utc>> {
        self.mirror.read().await.latest_report_date()
    }

    /// 가장 최근 report_date의 전체 자산 스냅샷.
    pub async fn snapshot_latest(&self) -> Vec<Forecast> {
        self.mirror.read().await.snapshot_latest()
    }

    /// 저장된 예측 행 수.
    pub async fn len(&self) -> usize {
        self.mirror.read().await.len()
    }
}
