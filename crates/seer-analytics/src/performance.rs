//! 성과 평가기.
//!
//! 저장된 예측 레코드와 실현 가격을 조인하여 복리 수익률을 계산합니다.
//!
//! # 실현 규칙
//!
//! report_date 오름차순으로 정렬했을 때, 각 행의 `next_day_actual`은
//! 바로 다음 행의 `last_close`입니다 (다음 날 예측이 존재해야 결과를
//! 알 수 있음). 뒤따르는 행이 없는 꼬리는 평가에서 제외합니다.
//!
//! # 매매 시뮬레이션
//!
//! 100 단위 포지션으로 시작해, 모델이 상승을 예측한 날만
//! `next_day_actual / last_close` 배율로 복리 적용하고, 하락/보합 예측일은
//! 투자를 건너뛰어 가치를 유지합니다.
//!
//! # 복합 전략 tie-break
//!
//! 같은 날 기대 변화율이 동일한 자산이 여러 개면 자산 코드가
//! 사전순으로 가장 작은 자산을 선택합니다 (결정론적).

use chrono::{DateTime, Utc};
use seer_core::{Forecast, ModelConfig, PerformanceSummary};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// 시뮬레이션 초기 포지션 가치.
pub const INITIAL_POSITION_VALUE: f64 = 100.0;

/// 복합 전략 요약의 target 값.
pub const COMPOSITE_TARGET: &str = "composite";

/// 실현된 예측 행 (다음 날 실제가 포함).
#[derive(Debug, Clone)]
struct RealizedRow {
    forecast: Forecast,
    next_day_actual: f64,
}

impl RealizedRow {
    fn is_buy(&self) -> bool {
        self.forecast.next_day_price > self.forecast.last_close
    }
}

/// 단일 자산×차수 예측 행을 실현 행으로 변환.
///
/// 입력은 같은 (asset, config)의 행이어야 하며, report_date로 정렬 후
/// 다음 행의 last_close를 실현가로 붙입니다. 마지막 행은 탈락합니다.
fn realize(rows: &[Forecast]) -> Vec<RealizedRow> {
    let mut sorted: Vec<Forecast> = rows.to_vec();
    sorted.sort_by(|a, b| a.report_date.cmp(&b.report_date));

    sorted
        .windows(2)
        .map(|pair| RealizedRow {
            forecast: pair[0].clone(),
            next_day_actual: pair[1].last_close,
        })
        .collect()
}

/// invest/skip 규칙의 복리 수익률 (%).
///
/// `window`가 주어지면 가장 최근 window개 실현 행만 사용합니다.
fn compound_return(rows: &[RealizedRow], window: Option<usize>) -> f64 {
    let slice = match window {
        Some(k) if rows.len() > k => &rows[rows.len() - k..],
        _ => rows,
    };

    let mut value = INITIAL_POSITION_VALUE;
    for row in slice {
        if row.is_buy() {
            value *= row.next_day_actual / row.forecast.last_close;
        }
        // 하락/보합 예측일은 투자하지 않음 — 가치 유지
    }
    (value - INITIAL_POSITION_VALUE) / INITIAL_POSITION_VALUE * 100.0
}

/// 동일 구간 단순 보유 수익률 (%).
///
/// 첫 실현 행의 진입가에서 마지막 실현 행의 실현가까지,
/// invest/skip 규칙과 무관하게 계산합니다.
fn hold_return(rows: &[RealizedRow]) -> f64 {
    match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => {
            (last.next_day_actual / first.forecast.last_close - 1.0) * 100.0
        }
        _ => 0.0,
    }
}

fn build_summary(target: &str, config: ModelConfig, realized: &[RealizedRow]) -> PerformanceSummary {
    PerformanceSummary {
        config,
        target: target.to_string(),
        total_return_pct: compound_return(realized, None),
        last_30d_return_pct: compound_return(realized, Some(30)),
        last_7d_return_pct: compound_return(realized, Some(7)),
        last_1d_return_pct: compound_return(realized, Some(1)),
        hold_return_pct: hold_return(realized),
        sample_size: realized.len(),
    }
}

/// 성과 평가기 (무상태).
pub struct PerformanceEvaluator;

impl PerformanceEvaluator {
    /// 단일 자산×차수 평가.
    ///
    /// `rows`는 해당 (asset, config)의 저장된 예측 전체입니다.
    pub fn evaluate(asset: &str, config: ModelConfig, rows: &[Forecast]) -> PerformanceSummary {
        let realized = realize(rows);
        debug!(
            asset = asset,
            config = %config,
            stored = rows.len(),
            realized = realized.len(),
            "자산 성과 평가"
        );
        build_summary(asset, config, &realized)
    }

    /// 전 자산 "최고 기대 신호" 복합 전략 평가.
    ///
    /// `rows`는 고정 차수에 대한 모든 자산의 저장된 예측입니다.
    /// 각 report_date마다 기대 변화율이 엄격히 최대인 자산을 선택하고,
    /// 선택된 행들에 동일한 invest/skip 복리 규칙을 적용합니다.
    pub fn evaluate_composite(config: ModelConfig, rows: &[Forecast]) -> PerformanceSummary {
        // 실현은 자산별로 수행해야 한다 — 실현가는 같은 자산의 다음 행에서 온다
        let mut by_asset: HashMap<String, Vec<Forecast>> = HashMap::new();
        for row in rows {
            by_asset.entry(row.asset.clone()).or_default().push(row.clone());
        }

        let mut by_date: BTreeMap<DateTime<Utc>, Vec<RealizedRow>> = BTreeMap::new();
        for asset_rows in by_asset.values() {
            for realized in realize(asset_rows) {
                by_date
                    .entry(realized.forecast.report_date)
                    .or_default()
                    .push(realized);
            }
        }

        let mut selected: Vec<RealizedRow> = Vec::with_capacity(by_date.len());
        for candidates in by_date.values_mut() {
            // 자산 코드 오름차순 + 엄격 비교 → 동률이면 사전순 최소 자산 유지
            candidates.sort_by(|a, b| a.forecast.asset.cmp(&b.forecast.asset));
            let mut best: Option<&RealizedRow> = None;
            for candidate in candidates.iter() {
                let better = match best {
                    None => true,
                    Some(current) => {
                        candidate.forecast.expected_change()
                            > current.forecast.expected_change()
                    }
                };
                if better {
                    best = Some(candidate);
                }
            }
            if let Some(best) = best {
                selected.push(best.clone());
            }
        }

        debug!(
            config = %config,
            assets = by_asset.len(),
            days = selected.len(),
            "복합 전략 평가"
        );
        build_summary(COMPOSITE_TARGET, config, &selected)
    }
}
