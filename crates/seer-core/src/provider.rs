//! 외부 협력자 trait 경계.
//!
//! 피드 클라이언트와 가격 이력 저장소는 이 trait 뒤에 숨겨
//! 동기화 로직을 실제 전송/스토리지 없이 테스트할 수 있게 합니다.

use crate::error::Result;
use crate::types::PriceBar;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// 외부 일봉 피드.
///
/// 자산 코드에 대해 전체 일봉 시리즈를 반환합니다.
/// 비성공 응답은 [`crate::SeerError::FeedUnavailable`]로 매핑되어야 하며,
/// 호출자(동기화기)가 흡수 여부를 결정합니다.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// 자산의 일봉 캔들 조회 (날짜 오름차순).
    async fn fetch_daily(&self, asset: &str) -> Result<Vec<PriceBar>>;
}

/// 일봉 이력 영속 저장소.
///
/// append-only: 행은 생성만 되고 수정/삭제되지 않습니다.
#[async_trait]
pub trait PriceHistory: Send + Sync {
    /// 자산의 전체 시리즈 조회 (날짜 오름차순).
    async fn series(&self, asset: &str) -> Result<Vec<PriceBar>>;

    /// 자산의 최대 봉 날짜 조회. 데이터가 없으면 `None`.
    async fn max_date(&self, asset: &str) -> Result<Option<DateTime<Utc>>>;

    /// 새 봉 추가. 이미 존재하는 (asset, date) 행은 무시됩니다.
    ///
    /// 실제로 추가된 행 수를 반환합니다.
    async fn append(&self, bars: &[PriceBar]) -> Result<u64>;
}
