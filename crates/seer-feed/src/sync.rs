//! 피드 동기화기.
//!
//! 로컬 가격 이력이 오래되었는지 판단하고, 필요할 때만 외부 피드를 호출해
//! 새 행만 증분 병합합니다.
//!
//! # 신선도 규칙
//!
//! 로컬 시리즈가 비어 있거나, 최대 봉 날짜가 "현재(UTC) - 1일"보다
//! 엄격히 최신이 아니면 오래된 것입니다. 새 일봉이 이미 존재해야 하는
//! 시점이기 때문입니다.
//!
//! # 실패 정책
//!
//! 피드 조회 실패는 여기서 흡수하고 로그만 남깁니다. 호출자는 기존
//! (오래되었을 수 있는) 로컬 시리즈로 진행합니다. 저장소 에러만 전파됩니다.

use chrono::{DateTime, Duration, Utc};
use seer_core::{PriceBar, PriceFeed, PriceHistory, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// 로컬 최대 봉 날짜 기준 신선도 판단.
///
/// `max_date`가 `now - 1일`보다 엄격히 크면 최신, 아니면 stale.
pub fn is_stale(max_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match max_date {
        None => true,
        Some(date) => date <= now - Duration::days(1),
    }
}

/// 피드 동기화기.
///
/// 가격 이력 저장소의 행 생성은 이 타입을 통해서만 이루어집니다.
pub struct FeedSynchronizer {
    feed: Arc<dyn PriceFeed>,
    history: Arc<dyn PriceHistory>,
}

impl FeedSynchronizer {
    pub fn new(feed: Arc<dyn PriceFeed>, history: Arc<dyn PriceHistory>) -> Self {
        Self { feed, history }
    }

    /// 자산의 최신 시리즈 확보.
    ///
    /// stale이면 피드 전체를 조회해 로컬 최대 날짜보다 엄격히 큰 행만
    /// 추가합니다 (로컬이 비었으면 전부). 같은 원격 상태를 두 번 병합해도
    /// 두 번째는 아무것도 추가하지 않습니다.
    #[instrument(skip(self))]
    pub async fn ensure_fresh(&self, asset: &str) -> Result<Vec<PriceBar>> {
        let local = self.history.series(asset).await?;
        let max_date = local.last().map(|b| b.date);

        if !is_stale(max_date, Utc::now()) {
            debug!(asset = asset, "가격 이력 최신 상태");
            return Ok(local);
        }

        info!(asset = asset, "가격 이력 stale, 피드 조회");
        let fetched = match self.feed.fetch_daily(asset).await {
            Ok(bars) => bars,
            Err(e) => {
                // 피드 실패는 흡수: 기존 데이터로 진행 (degraded, 저심각도)
                warn!(asset = asset, error = %e, "피드 조회 실패, 기존 데이터로 진행");
                return Ok(local);
            }
        };

        let new_bars: Vec<PriceBar> = fetched
            .into_iter()
            .filter(|bar| max_date.map_or(true, |max| bar.date > max))
            .collect();

        if new_bars.is_empty() {
            warn!(asset = asset, "피드 호출에도 추가할 새 데이터 없음");
            return Ok(local);
        }

        let appended = self.history.append(&new_bars).await?;
        info!(asset = asset, appended = appended, "새 일봉 병합 완료");

        // new_bars는 모두 로컬 최대 날짜 이후이므로 이어 붙이면 오름차순 유지
        let mut merged = local;
        merged.extend(new_bars);
        merged.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use seer_core::SeerError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    fn bar(asset: &str, date: DateTime<Utc>, close: f64) -> PriceBar {
        PriceBar {
            asset: asset.to_string(),
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
            fiat_volume: close,
        }
    }

    /// 호출 횟수를 세는 테스트 피드.
    struct CountingFeed {
        bars: Vec<PriceBar>,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceFeed for CountingFeed {
        async fn fetch_daily(&self, asset: &str) -> Result<Vec<PriceBar>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SeerError::FeedUnavailable {
                    asset: asset.to_string(),
                    message: "HTTP 500".to_string(),
                });
            }
            Ok(self.bars.clone())
        }
    }

    /// 인메모리 가격 이력 저장소.
    #[derive(Default)]
    struct MemoryHistory {
        bars: Mutex<Vec<PriceBar>>,
    }

    #[async_trait]
    impl PriceHistory for MemoryHistory {
        async fn series(&self, asset: &str) -> Result<Vec<PriceBar>> {
            let mut bars: Vec<PriceBar> = self
                .bars
                .lock()
                .await
                .iter()
                .filter(|b| b.asset == asset)
                .cloned()
                .collect();
            bars.sort_by(|a, b| a.date.cmp(&b.date));
            Ok(bars)
        }

        async fn max_date(&self, asset: &str) -> Result<Option<DateTime<Utc>>> {
            Ok(self
                .bars
                .lock()
                .await
                .iter()
                .filter(|b| b.asset == asset)
                .map(|b| b.date)
                .max())
        }

        async fn append(&self, new: &[PriceBar]) -> Result<u64> {
            let mut guard = self.bars.lock().await;
            let mut appended = 0;
            for bar in new {
                if !guard.iter().any(|b| b.asset == bar.asset && b.date == bar.date) {
                    guard.push(bar.clone());
                    appended += 1;
                }
            }
            Ok(appended)
        }
    }

    fn day(offset: i64) -> DateTime<Utc> {
        // 시각을 자정으로 정규화해 경계 비교를 명확히 한다
        (Utc::now() - Duration::days(offset))
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt))
            .unwrap()
    }

    #[test]
    fn staleness_rule_boundaries() {
        let now = Utc::now();
        assert!(is_stale(None, now));
        // 2일 전 → stale
        assert!(is_stale(Some(now - Duration::days(2)), now));
        // 정확히 1일 전 → stale (엄격 비교)
        assert!(is_stale(Some(now - Duration::days(1)), now));
        // 1일 미만 → 최신
        assert!(!is_stale(Some(now - Duration::hours(23)), now));
    }

    #[tokio::test]
    async fn fresh_history_skips_feed_call() {
        let history = Arc::new(MemoryHistory::default());
        history
            .append(&[bar("BTC", Utc::now() - Duration::hours(2), 100.0)])
            .await
            .unwrap();

        let feed = Arc::new(CountingFeed {
            bars: vec![],
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let sync = FeedSynchronizer::new(feed.clone(), history);

        let series = sync.ensure_fresh("BTC").await.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(feed.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stale_history_merges_only_newer_rows() {
        let history = Arc::new(MemoryHistory::default());
        history.append(&[bar("BTC", day(3), 95.0)]).await.unwrap();

        let feed = Arc::new(CountingFeed {
            bars: vec![
                bar("BTC", day(3), 95.0), // 이미 보유 — 필터링되어야 함
                bar("BTC", day(2), 97.0),
                bar("BTC", day(1), 99.0),
            ],
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let sync = FeedSynchronizer::new(feed.clone(), history.clone());

        let series = sync.ensure_fresh("BTC").await.unwrap();
        assert_eq!(feed.calls.load(Ordering::SeqCst), 1);
        assert_eq!(series.len(), 3);
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));

        // 같은 원격 상태를 다시 병합해도 아무것도 추가되지 않는다
        let again = sync.ensure_fresh("BTC").await.unwrap();
        assert_eq!(again.len(), 3);
        assert_eq!(history.series("BTC").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn empty_history_takes_all_fetched_rows() {
        let history = Arc::new(MemoryHistory::default());
        let feed = Arc::new(CountingFeed {
            bars: vec![bar("ETH", day(2), 10.0), bar("ETH", day(1), 11.0)],
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let sync = FeedSynchronizer::new(feed, history);

        let series = sync.ensure_fresh("ETH").await.unwrap();
        assert_eq!(series.len(), 2);
    }

    #[tokio::test]
    async fn feed_failure_degrades_to_local_series() {
        let history = Arc::new(MemoryHistory::default());
        history.append(&[bar("BTC", day(5), 90.0)]).await.unwrap();

        let feed = Arc::new(CountingFeed {
            bars: vec![],
            fail: true,
            calls: AtomicUsize::new(0),
        });
        let sync = FeedSynchronizer::new(feed, history);

        // 에러가 아니라 기존 (stale) 시리즈가 반환되어야 한다
        let series = sync.ensure_fresh("BTC").await.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].close, 90.0);
    }
}
