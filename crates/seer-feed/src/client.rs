//! Coinbase Exchange 일봉 캔들 클라이언트.
//!
//! `GET {base}/products/{ASSET}-USD/candles?granularity=86400` 응답은
//! `[unix, low, high, open, close, volume]` 배열의 배열입니다.
//! 법정화폐 거래량(`fiat_volume = volume * close`)은 수집 시점에 계산합니다.

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use seer_core::{PriceBar, PriceFeed, Result, SeerError};
use serde::Deserialize;
use tracing::{debug, warn};

/// Coinbase Exchange 공개 API 기본 URL.
pub const DEFAULT_BASE_URL: &str = "https://api.exchange.coinbase.com";

/// 일봉 granularity (초).
const DAILY_GRANULARITY_SECS: u32 = 86_400;

/// 캔들 원시 페이로드: [unix, low, high, open, close, volume].
#[derive(Debug, Deserialize)]
struct RawCandle(i64, f64, f64, f64, f64, f64);

/// Coinbase Exchange REST 클라이언트.
#[derive(Clone)]
pub struct CoinbaseClient {
    http: Client,
    base_url: String,
}

impl Default for CoinbaseClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl CoinbaseClient {
    /// 지정한 기본 URL로 클라이언트 생성 (테스트용 mock 서버 주입 가능).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn candles_url(&self, asset: &str) -> String {
        format!(
            "{}/products/{}-USD/candles?granularity={}",
            self.base_url, asset, DAILY_GRANULARITY_SECS
        )
    }

    fn unavailable(asset: &str, message: impl Into<String>) -> SeerError {
        SeerError::FeedUnavailable {
            asset: asset.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl PriceFeed for CoinbaseClient {
    async fn fetch_daily(&self, asset: &str) -> Result<Vec<PriceBar>> {
        let url = self.candles_url(asset);
        debug!(asset = asset, "코인베이스 일봉 조회");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::unavailable(asset, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(asset = asset, status = %status, "코인베이스 비성공 응답");
            return Err(Self::unavailable(asset, format!("HTTP {}", status)));
        }

        let raw: Vec<RawCandle> = response
            .json()
            .await
            .map_err(|e| Self::unavailable(asset, format!("페이로드 파싱 실패: {}", e)))?;

        let mut bars: Vec<PriceBar> = raw
            .into_iter()
            .filter_map(|RawCandle(unix, low, high, open, close, volume)| {
                let date = DateTime::from_timestamp(unix, 0)?;
                Some(PriceBar {
                    asset: asset.to_string(),
                    date,
                    open,
                    high,
                    low,
                    close,
                    volume,
                    fiat_volume: volume * close,
                })
            })
            .collect();

        // 피드는 최신순으로 내려오므로 정본 순서(오름차순)로 정렬
        bars.sort_by(|a, b| a.date.cmp(&b.date));

        debug!(asset = asset, count = bars.len(), "코인베이스 일봉 수신");
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_candle_arrays_and_sorts_ascending() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"[
            [1714608000, 95.0, 105.0, 98.0, 100.0, 10.0],
            [1714521600, 90.0, 100.0, 92.0, 95.0, 20.0]
        ]"#;
        let mock = server
            .mock("GET", "/products/BTC-USD/candles?granularity=86400")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = CoinbaseClient::new(server.url());
        let bars = client.fetch_daily("BTC").await.unwrap();

        mock.assert_async().await;
        assert_eq!(bars.len(), 2);
        assert!(bars[0].date < bars[1].date);
        assert_eq!(bars[1].close, 100.0);
        // fiat_volume = volume * close
        assert_eq!(bars[1].fiat_volume, 1000.0);
        assert_eq!(bars[0].asset, "BTC");
    }

    #[tokio::test]
    async fn non_success_status_maps_to_feed_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/products/NOPE-USD/candles?granularity=86400")
            .with_status(404)
            .with_body(r#"{"message":"NotFound"}"#)
            .create_async()
            .await;

        let client = CoinbaseClient::new(server.url());
        let err = client.fetch_daily("NOPE").await.unwrap_err();
        assert!(matches!(err, SeerError::FeedUnavailable { .. }));
    }

    #[tokio::test]
    async fn malformed_payload_maps_to_feed_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/products/BTC-USD/candles?granularity=86400")
            .with_status(200)
            .with_body("not-json")
            .create_async()
            .await;

        let client = CoinbaseClient::new(server.url());
        let err = client.fetch_daily("BTC").await.unwrap_err();
        assert!(matches!(err, SeerError::FeedUnavailable { .. }));
    }
}
