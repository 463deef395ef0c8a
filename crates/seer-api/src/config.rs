//! 환경 변수 기반 설정.
//!
//! # 환경변수
//!
//! - `API_HOST`, `API_PORT`: 바인딩 주소 (기본 127.0.0.1:3000)
//! - `TRACKED_ASSETS`: 쉼표 구분 자산 코드 목록 (기본 "BTC,ETH")
//! - `SWEEP_CONFIGS`: 세미콜론 구분 "p,d,q" 목록 (기본 "2,1,2")
//! - `SWEEP_INTERVAL_SECS`: 설정 시 해당 주기로 스윕 데몬 실행
//! - `SWEEP_PAUSE_MS`: 스윕 중 자산 간 대기 시간 (피드 rate limit, 기본 500)
//! - `FEED_BASE_URL`: 피드 기본 URL 재정의 (기본 Coinbase Exchange)
//! - `DATABASE_URL`: Postgres 접속 문자열 (필수)

use seer_core::ModelConfig;
use std::net::SocketAddr;
use tracing::warn;

/// 서버 설정.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 바인딩할 호스트 주소
    pub host: String,
    /// 바인딩할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// 환경 변수에서 설정 로드.
    pub fn from_env() -> Self {
        let default = Self::default();
        let host = std::env::var("API_HOST").unwrap_or(default.host);
        let port = std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(default.port);

        Self { host, port }
    }

    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// 예측 스윕 설정.
///
/// 추적 자산 목록과 후보 차수 조합의 곱집합이 스윕 대상입니다.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// 추적 자산 코드 (대문자)
    pub assets: Vec<String>,
    /// 후보 ARIMA 차수 조합
    pub configs: Vec<ModelConfig>,
    /// 설정 시 해당 주기(초)로 데몬 루프 실행
    pub interval_secs: Option<u64>,
    /// 자산 간 대기 시간 (밀리초)
    pub pause_ms: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            assets: vec!["BTC".to_string(), "ETH".to_string()],
            configs: vec![ModelConfig::default()],
            interval_secs: None,
            pause_ms: 500,
        }
    }
}

impl SweepConfig {
    /// 환경 변수에서 설정 로드.
    pub fn from_env() -> Self {
        let default = Self::default();

        let assets = std::env::var("TRACKED_ASSETS")
            .ok()
            .map(|raw| parse_assets(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or(default.assets);

        let configs = std::env::var("SWEEP_CONFIGS")
            .ok()
            .map(|raw| parse_configs(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or(default.configs);

        let interval_secs = std::env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok());

        let pause_ms = std::env::var("SWEEP_PAUSE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.pause_ms);

        Self {
            assets,
            configs,
            interval_secs,
            pause_ms,
        }
    }
}

/// 쉼표 구분 자산 목록 파싱 (공백 제거, 대문자 정규화).
fn parse_assets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// 세미콜론 구분 "p,d,q" 목록 파싱.
///
/// 형식이 맞지 않는 항목은 경고 로그 후 건너뜁니다.
fn parse_configs(raw: &str) -> Vec<ModelConfig> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|entry| {
            let parts: Vec<u32> = entry
                .split(',')
                .filter_map(|n| n.trim().parse().ok())
                .collect();
            match parts.as_slice() {
                [p, d, q] => Some(ModelConfig::new(*p, *d, *q)),
                _ => {
                    warn!(entry = entry, "SWEEP_CONFIGS 항목 형식 오류, 무시");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_assets_trims_and_uppercases() {
        assert_eq!(
            parse_assets(" btc, ETH ,ltc,"),
            vec!["BTC".to_string(), "ETH".to_string(), "LTC".to_string()]
        );
        assert!(parse_assets("").is_empty());
    }

    #[test]
    fn parse_configs_accepts_semicolon_separated_triples() {
        let configs = parse_configs("2,1,2; 4,1,4 ;0,1,0");
        assert_eq!(
            configs,
            vec![
                ModelConfig::new(2, 1, 2),
                ModelConfig::new(4, 1, 4),
                ModelConfig::new(0, 1, 0),
            ]
        );
    }

    #[test]
    fn parse_configs_skips_malformed_entries() {
        let configs = parse_configs("2,1;abc;3,1,3");
        assert_eq!(configs, vec![ModelConfig::new(3, 1, 3)]);
    }

    #[test]
    fn server_config_default_addr_parses() {
        let addr = ServerConfig::default().socket_addr().unwrap();
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn sweep_config_default_has_canonical_order() {
        let config = SweepConfig::default();
        assert_eq!(config.configs, vec![ModelConfig::new(2, 1, 2)]);
        assert!(config.interval_secs.is_none());
    }
}
