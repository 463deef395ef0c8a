//! 일봉 가격 이력 저장소.
//!
//! `crypto_prices` 테이블에 대한 파라미터화된 읽기와 append 쓰기를 제공합니다.
//! 행 생성은 피드 동기화기를 통해서만 이루어지며, 수정/삭제 경로는 없습니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use seer_core::{PriceBar, PriceHistory, Result, SeerError};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use tracing::{debug, instrument};

/// 일봉 가격 데이터베이스 레코드.
#[derive(Debug, Clone, FromRow)]
struct PriceBarRecord {
    asset: String,
    date: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    fiat_volume: f64,
}

impl PriceBarRecord {
    fn into_bar(self) -> PriceBar {
        PriceBar {
            asset: self.asset,
            date: self.date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            fiat_volume: self.fiat_volume,
        }
    }
}

/// 가격 이력 저장소 서비스.
#[derive(Clone)]
pub struct PriceHistoryStore {
    pool: PgPool,
}

impl PriceHistoryStore {
    /// 저장소 생성. 테이블이 없으면 만듭니다.
    pub async fn connect(pool: PgPool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS crypto_prices (
                asset       TEXT NOT NULL,
                date        TIMESTAMPTZ NOT NULL,
                open        DOUBLE PRECISION NOT NULL,
                high        DOUBLE PRECISION NOT NULL,
                low         DOUBLE PRECISION NOT NULL,
                close       DOUBLE PRECISION NOT NULL,
                volume      DOUBLE PRECISION NOT NULL,
                fiat_volume DOUBLE PRECISION NOT NULL,
                PRIMARY KEY (asset, date)
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| SeerError::Storage(e.to_string()))?;

        Ok(Self { pool })
    }

    /// 내부 커넥션 풀 참조.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PriceHistory for PriceHistoryStore {
    #[instrument(skip(self))]
    async fn series(&self, asset: &str) -> Result<Vec<PriceBar>> {
        let records: Vec<PriceBarRecord> = sqlx::query_as(
            r#"
            SELECT asset, date, open, high, low, close, volume, fiat_volume
            FROM crypto_prices
            WHERE asset = $1
            ORDER BY date ASC
            "#,
        )
        .bind(asset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SeerError::Storage(e.to_string()))?;

        let bars: Vec<PriceBar> = records.into_iter().map(|r| r.into_bar()).collect();

        debug!(asset = asset, count = bars.len(), "가격 이력 조회");
        Ok(bars)
    }

    #[instrument(skip(self))]
    async fn max_date(&self, asset: &str) -> Result<Option<DateTime<Utc>>> {
        // MAX는 행이 없어도 NULL 한 행을 돌려준다
        let row: (Option<DateTime<Utc>>,) = sqlx::query_as(
            r#"
            SELECT MAX(date) FROM crypto_prices WHERE asset = $1
            "#,
        )
        .bind(asset)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| SeerError::Storage(e.to_string()))?;

        Ok(row.0)
    }

    #[instrument(skip(self, bars), fields(count = bars.len()))]
    async fn append(&self, bars: &[PriceBar]) -> Result<u64> {
        let mut appended = 0u64;

        // 행 수가 하루 단위 증분이라 개별 insert로 충분합니다.
        // 이미 존재하는 (asset, date)는 건드리지 않습니다.
        for bar in bars {
            let result = sqlx::query(
                r#"
                INSERT INTO crypto_prices
                    (asset, date, open, high, low, close, volume, fiat_volume)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (asset, date) DO NOTHING
                "#,
            )
            .bind(&bar.asset)
            .bind(bar.date)
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close)
            .bind(bar.volume)
            .bind(bar.fiat_volume)
            .execute(&self.pool)
            .await
            .map_err(|e| SeerError::Storage(e.to_string()))?;

            appended += result.rows_affected();
        }

        debug!(appended = appended, "가격 이력 추가 완료");
        Ok(appended)
    }
}
