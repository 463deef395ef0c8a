//! 예측 레코드 인메모리 미러.
//!
//! 영속 테이블과 항상 같은 내용을 유지하는 읽기 전용 캐시입니다.
//! 전역 상태가 아니라 [`crate::PredictionStore`]가 소유하는 명시적 객체이며,
//! 쓰기 관통(write-through)으로만 갱신됩니다.

use chrono::{DateTime, Utc};
use seer_core::{Forecast, ModelConfig};

/// 예측 레코드 미러.
///
/// 키 (asset, report_date, config)에 대해 최대 1건을 유지합니다.
/// 먼저 쓴 쪽이 이깁니다 — 같은 키의 두 번째 삽입은 값이 달라도 무시됩니다.
#[derive(Debug, Default)]
pub struct ForecastMirror {
    rows: Vec<Forecast>,
}

impl ForecastMirror {
    /// 빈 미러 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 영속 저장소에서 읽은 전체 행으로 재수화.
    pub fn rehydrate(rows: Vec<Forecast>) -> Self {
        Self { rows }
    }

    /// 키가 없을 때만 삽입. 삽입했으면 `true`.
    pub fn insert_if_absent(&mut self, forecast: Forecast) -> bool {
        if self.rows.iter().any(|r| r.same_key(&forecast)) {
            return false;
        }
        self.rows.push(forecast);
        true
    }

    /// 키 존재 여부 확인.
    pub fn contains_key(&self, forecast: &Forecast) -> bool {
        self.rows.iter().any(|r| r.same_key(forecast))
    }

    /// 자산/차수 필터 조회, report_date 오름차순.
    pub fn query(&self, asset: Option<&str>, config: Option<ModelConfig>) -> Vec<Forecast> {
        let mut rows: Vec<Forecast> = self
            .rows
            .iter()
            .filter(|r| asset.map_or(true, |a| r.asset == a))
            .filter(|r| config.map_or(true, |c| r.config == c))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.report_date.cmp(&b.report_date));
        rows
    }

    /// 가장 최근 report_date.
    pub fn latest_report_date(&self) -> Option<DateTime<Utc>> {
        self.rows.iter().map(|r| r.report_date).max()
    }

    /// 가장 최근 report_date의 전체 자산 스냅샷.
    pub fn snapshot_latest(&self) -> Vec<Forecast> {
        match self.latest_report_date() {
            Some(latest) => {
                let mut rows: Vec<Forecast> = self
                    .rows
                    .iter()
                    .filter(|r| r.report_date == latest)
                    .cloned()
                    .collect();
                rows.sort_by(|a, b| a.asset.cmp(&b.asset));
                rows
            }
            None => Vec::new(),
        }
    }

    /// 보유 중인 행 수.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 비어 있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn forecast(asset: &str, day: u32, next: f64) -> Forecast {
        Forecast {
            asset: asset.to_string(),
            report_date: Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap(),
            config: ModelConfig::default(),
            last_close: 100.0,
            next_day_price: next,
            seven_day_price: next + 1.0,
        }
    }

    #[test]
    fn duplicate_key_keeps_first_value() {
        let mut mirror = ForecastMirror::new();
        assert!(mirror.insert_if_absent(forecast("BTC", 1, 110.0)));

        // 같은 키, 다른 값 — 먼저 쓴 값이 유지되어야 한다
        let mut dup = forecast("BTC", 1, 90.0);
        dup.seven_day_price = 50.0;
        assert!(!mirror.insert_if_absent(dup));

        assert_eq!(mirror.len(), 1);
        let rows = mirror.query(Some("BTC"), None);
        assert_eq!(rows[0].next_day_price, 110.0);
    }

    #[test]
    fn different_config_is_a_different_key() {
        let mut mirror = ForecastMirror::new();
        mirror.insert_if_absent(forecast("BTC", 1, 110.0));

        let mut other = forecast("BTC", 1, 110.0);
        other.config = ModelConfig::new(1, 1, 1);
        assert!(mirror.insert_if_absent(other));
        assert_eq!(mirror.len(), 2);
    }

    #[test]
    fn query_filters_and_sorts_by_report_date() {
        let mut mirror = ForecastMirror::new();
        mirror.insert_if_absent(forecast("BTC", 3, 1.0));
        mirror.insert_if_absent(forecast("BTC", 1, 1.0));
        mirror.insert_if_absent(forecast("ETH", 2, 1.0));

        let btc = mirror.query(Some("BTC"), Some(ModelConfig::default()));
        assert_eq!(btc.len(), 2);
        assert!(btc[0].report_date < btc[1].report_date);

        let all = mirror.query(None, None);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn snapshot_latest_returns_only_last_day() {
        let mut mirror = ForecastMirror::new();
        mirror.insert_if_absent(forecast("BTC", 1, 1.0));
        mirror.insert_if_absent(forecast("BTC", 2, 1.0));
        mirror.insert_if_absent(forecast("ETH", 2, 1.0));

        let snapshot = mirror.snapshot_latest();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|r| r.report_date
            == Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()));
        // 자산 코드 오름차순
        assert_eq!(snapshot[0].asset, "BTC");
        assert_eq!(snapshot[1].asset, "ETH");
    }

    #[test]
    fn empty_mirror_has_no_latest_date() {
        let mirror = ForecastMirror::new();
        assert!(mirror.latest_report_date().is_none());
        assert!(mirror.snapshot_latest().is_empty());
    }
}
