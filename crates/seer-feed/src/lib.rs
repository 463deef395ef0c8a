//! 외부 가격 피드 계층.
//!
//! - [`client`]: Coinbase Exchange 일봉 캔들 REST 클라이언트
//! - [`sync`]: 로컬 이력의 신선도 판단과 증분 병합을 담당하는 동기화기
//!
//! 동기화 실패는 이 크레이트 경계를 넘어 전파되지 않습니다.
//! 호출자는 항상 (오래되었을 수 있는) 시리즈를 받습니다.

pub mod client;
pub mod sync;

pub use client::CoinbaseClient;
pub use sync::{is_stale, FeedSynchronizer};
