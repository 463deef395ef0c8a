//! ARIMA(p, d, q) 적합과 예측.
//!
//! 조건부 최소제곱 기반의 경량 구현입니다:
//!
//! - 순수 AR: 절편 포함 OLS (정규방정식)
//! - 순수 MA: 잔차 재귀를 이용한 반복 추정
//! - ARMA: Hannan-Rissanen 2단계 (고차 AR로 잔차 근사 후 합동 회귀)
//!
//! 차분(d)은 적합 전에 적용하고, 예측값은 역차분으로 원래 수준에 복원합니다.
//! 수치 실패(데이터 부족, 특이 행렬, 비유한 계수)는 에러로 전파하며
//! 다른 차수로의 자동 폴백은 없습니다.

use nalgebra::{DMatrix, DVector};
use seer_core::{ModelConfig, Result, SeerError};

/// 차수 합 외에 추가로 요구하는 최소 관측치 수.
const MIN_EXTRA_OBSERVATIONS: usize = 10;
/// MA 반복 추정 최대 횟수.
const MA_MAX_ITERATIONS: usize = 50;
/// MA 계수 수렴 허용 오차.
const MA_TOLERANCE: f64 = 1e-6;

/// 적합된 ARIMA 모델.
#[derive(Debug, Clone)]
pub struct ArimaModel {
    config: ModelConfig,
    /// AR 계수 (φ)
    ar: Vec<f64>,
    /// MA 계수 (θ)
    ma: Vec<f64>,
    /// 절편
    constant: f64,
    /// 적합 잔차 (마지막 원소가 마지막 관측치에 대응)
    residuals: Vec<f64>,
}

impl ArimaModel {
    /// 시리즈에 ARIMA(p, d, q) 적합.
    pub fn fit(data: &[f64], config: ModelConfig) -> Result<Self> {
        let (p, d, q) = (config.p as usize, config.d as usize, config.q as usize);

        let required = p + d + q + MIN_EXTRA_OBSERVATIONS;
        if data.len() < required {
            return Err(SeerError::InsufficientHistory {
                required,
                actual: data.len(),
            });
        }

        let diffed = difference(data, d);

        let fit_err = |reason: &str| SeerError::ModelFitFailure {
            config,
            reason: reason.to_string(),
        };

        let (ar, ma, constant, residuals) = if q == 0 {
            estimate_ar(&diffed, p).ok_or_else(|| fit_err("AR 정규방정식이 특이합니다"))?
        } else if p == 0 {
            estimate_ma(&diffed, q).ok_or_else(|| fit_err("MA 반복 추정 실패"))?
        } else {
            estimate_arma(&diffed, p, q)
                .ok_or_else(|| fit_err("ARMA 정규방정식이 특이합니다"))?
        };

        if !constant.is_finite()
            || ar.iter().any(|v| !v.is_finite())
            || ma.iter().any(|v| !v.is_finite())
        {
            return Err(fit_err("비유한 계수 (비수렴)"));
        }

        Ok(Self {
            config,
            ar,
            ma,
            constant,
            residuals,
        })
    }

    /// `horizon` 단계 앞 점 예측 (원래 수준).
    ///
    /// `data`는 적합에 사용한 것과 같은 시리즈여야 합니다.
    pub fn forecast(&self, data: &[f64], horizon: usize) -> Vec<f64> {
        let d = self.config.d as usize;
        let mut extended = difference(data, d);
        let mut residuals = self.residuals.clone();
        let mut forecasts = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let mut value = self.constant;

            for (i, phi) in self.ar.iter().enumerate() {
                if let Some(idx) = extended.len().checked_sub(i + 1) {
                    value += phi * extended[idx];
                }
            }
            for (i, theta) in self.ma.iter().enumerate() {
                if let Some(idx) = residuals.len().checked_sub(i + 1) {
                    value += theta * residuals[idx];
                }
            }

            extended.push(value);
            // 미래 충격의 기대값은 0
            residuals.push(0.0);
            forecasts.push(value);
        }

        undifference(forecasts, data, d)
    }
}

/// d차 차분.
fn difference(data: &[f64], d: usize) -> Vec<f64> {
    let mut current = data.to_vec();
    for _ in 0..d {
        current = current.windows(2).map(|w| w[1] - w[0]).collect();
    }
    current
}

/// 역차분: d 수준 예측값을 원래 수준으로 복원.
///
/// 각 차분 수준의 마지막 관측값을 anchor로 누적합합니다.
fn undifference(forecasts: Vec<f64>, data: &[f64], d: usize) -> Vec<f64> {
    if d == 0 {
        return forecasts;
    }

    // levels[k] = k차 차분 시리즈 (anchor는 0..d-1 수준만 필요)
    let mut levels: Vec<Vec<f64>> = vec![data.to_vec()];
    for k in 1..d {
        let next: Vec<f64> = levels[k - 1].windows(2).map(|w| w[1] - w[0]).collect();
        levels.push(next);
    }

    let mut result = forecasts;
    for level in (0..d).rev() {
        let mut running = levels[level].last().copied().unwrap_or(0.0);
        for value in result.iter_mut() {
            running += *value;
            *value = running;
        }
    }
    result
}

fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// 정규방정식으로 OLS 해 계산. 특이 행렬이면 `None`.
fn solve_ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let xtx = x.transpose() * x;
    let xty = x.transpose() * y;
    xtx.try_inverse().map(|inv| inv * xty)
}

type Estimate = (Vec<f64>, Vec<f64>, f64, Vec<f64>);

/// 순수 AR(p) 추정: x[t]를 [1, x[t-1..t-p]]에 회귀.
///
/// p = 0이면 절편만 추정합니다 (드리프트 모델).
fn estimate_ar(data: &[f64], p: usize) -> Option<Estimate> {
    let n = data.len();
    if n <= p + 1 {
        return None;
    }

    let rows = n - p;
    let cols = p + 1;
    let mut x_data = Vec::with_capacity(rows * cols);
    let mut y_data = Vec::with_capacity(rows);

    for t in p..n {
        y_data.push(data[t]);
        x_data.push(1.0);
        for i in 1..=p {
            x_data.push(data[t - i]);
        }
    }

    let x = DMatrix::from_row_slice(rows, cols, &x_data);
    let y = DVector::from_vec(y_data);
    let beta = solve_ols(&x, &y)?;

    let constant = beta[0];
    let ar: Vec<f64> = beta.iter().skip(1).take(p).copied().collect();

    let fitted = &x * &beta;
    let residuals: Vec<f64> = (&y - fitted).iter().copied().collect();

    Some((ar, Vec::new(), constant, residuals))
}

/// 순수 MA(q) 추정: 잔차 재귀를 고정점 반복으로 푼다.
fn estimate_ma(data: &[f64], q: usize) -> Option<Estimate> {
    let data_mean = mean(data);
    let centered: Vec<f64> = data.iter().map(|v| v - data_mean).collect();

    let mut theta = vec![0.0; q];
    for _ in 0..MA_MAX_ITERATIONS {
        let residuals = ma_residuals(&centered, &theta);

        let mut next = vec![0.0; q];
        for i in 0..q {
            let mut num = 0.0;
            let mut den = 0.0;
            for t in (i + 1)..centered.len() {
                num += centered[t] * residuals[t - i - 1];
                den += residuals[t - i - 1] * residuals[t - i - 1];
            }
            if den > 0.0 {
                next[i] = num / den;
            }
        }

        let delta: f64 = theta
            .iter()
            .zip(next.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        theta = next;
        if delta < MA_TOLERANCE {
            break;
        }
    }

    let residuals = ma_residuals(&centered, &theta);
    Some((Vec::new(), theta, data_mean, residuals))
}

/// 주어진 MA 계수로 잔차 재귀 계산.
fn ma_residuals(data: &[f64], theta: &[f64]) -> Vec<f64> {
    let mut residuals = vec![0.0; data.len()];
    for t in 0..data.len() {
        let mut ma_part = 0.0;
        for (i, coef) in theta.iter().enumerate() {
            if t > i {
                ma_part += coef * residuals[t - i - 1];
            }
        }
        residuals[t] = data[t] - ma_part;
    }
    residuals
}

/// ARMA(p, q) 추정: Hannan-Rissanen 2단계.
///
/// 1단계: 고차 AR로 충격(잔차) 근사.
/// 2단계: 시차값과 근사 잔차를 합동 회귀.
fn estimate_arma(data: &[f64], p: usize, q: usize) -> Option<Estimate> {
    let n = data.len();
    let data_mean = mean(data);
    let centered: Vec<f64> = data.iter().map(|v| v - data_mean).collect();

    let long_order = (p + q).max(10).min(n / 4).max(1);
    let (_, _, _, initial_residuals) = estimate_ar(&centered, long_order)?;

    let start = p.max(q).max(long_order);
    if n < start + p + q + 2 {
        return None;
    }

    let rows = n - start;
    let cols = 1 + p + q;
    let mut x_data = Vec::with_capacity(rows * cols);
    let mut y_data = Vec::with_capacity(rows);

    for t in start..n {
        y_data.push(centered[t]);
        x_data.push(1.0);
        for i in 1..=p {
            x_data.push(centered[t - i]);
        }
        for i in 1..=q {
            // initial_residuals[k]는 centered[long_order + k]의 충격 근사
            let value = (t - i)
                .checked_sub(long_order)
                .and_then(|k| initial_residuals.get(k))
                .copied()
                .unwrap_or(0.0);
            x_data.push(value);
        }
    }

    let x = DMatrix::from_row_slice(rows, cols, &x_data);
    let y = DVector::from_vec(y_data);
    let beta = solve_ols(&x, &y)?;

    let ar: Vec<f64> = beta.iter().skip(1).take(p).copied().collect();
    let ma: Vec<f64> = beta.iter().skip(1 + p).take(q).copied().collect();

    // 중심화 해제: x_t = c' + Σφ x_{t-i} + ... 형태로 복원
    let ar_sum: f64 = ar.iter().sum();
    let constant = beta[0] + data_mean * (1.0 - ar_sum);

    let fitted = &x * &beta;
    let residuals: Vec<f64> = (&y - fitted).iter().copied().collect();

    Some((ar, ma, constant, residuals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difference_and_undifference_roundtrip() {
        let data = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&data, 1), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(difference(&data, 2), vec![1.0, 1.0, 1.0]);

        // 1차 차분 예측 [6, 7]을 복원하면 [21, 28]
        let restored = undifference(vec![6.0, 7.0], &data, 1);
        assert_eq!(restored, vec![21.0, 28.0]);
    }

    /// 결정론적 의사 백색잡음 (LCG 상위 비트).
    fn pseudo_noise(seed: &mut u64) -> f64 {
        *seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((*seed >> 33) % 1000) as f64 / 5000.0 - 0.1
    }

    #[test]
    fn ar1_coefficient_recovery() {
        let phi = 0.7;
        let mut seed = 42u64;
        let mut data = vec![0.0];
        for i in 1..400 {
            let noise = pseudo_noise(&mut seed);
            data.push(phi * data[i - 1] + noise);
        }

        let model = ArimaModel::fit(&data, ModelConfig::new(1, 0, 0)).unwrap();
        assert!((model.ar[0] - phi).abs() < 0.2, "ar[0] = {}", model.ar[0]);
    }

    #[test]
    fn insufficient_data_is_an_error() {
        let data = vec![1.0, 2.0, 3.0];
        let err = ArimaModel::fit(&data, ModelConfig::new(2, 1, 2)).unwrap_err();
        assert!(matches!(err, SeerError::InsufficientHistory { .. }));
    }

    #[test]
    fn drift_model_extrapolates_linear_trend() {
        // ARIMA(0,1,0) = 드리프트 랜덤워크: 선형 추세를 그대로 연장해야 한다
        let data: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let model = ArimaModel::fit(&data, ModelConfig::new(0, 1, 0)).unwrap();

        let forecasts = model.forecast(&data, 3);
        assert_eq!(forecasts.len(), 3);
        for (i, value) in forecasts.iter().enumerate() {
            let expected = 149.0 + (i + 1) as f64;
            assert!((value - expected).abs() < 1e-9, "step {}: {}", i, value);
        }
    }

    #[test]
    fn arma_fit_produces_finite_forecasts() {
        let mut data = vec![0.0, 0.5];
        for i in 2..150 {
            let noise = ((i * 104_729) % 1000) as f64 / 2500.0 - 0.2;
            let value = 0.5 * data[i - 1] - 0.2 * data[i - 2] + noise;
            data.push(value);
        }

        let model = ArimaModel::fit(&data, ModelConfig::new(2, 0, 2)).unwrap();
        let forecasts = model.forecast(&data, 7);
        assert_eq!(forecasts.len(), 7);
        assert!(forecasts.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn ma_only_fit_produces_finite_forecasts() {
        let mut data = Vec::with_capacity(120);
        for i in 0..120 {
            let noise = ((i * 31_337) % 1000) as f64 / 1000.0 - 0.5;
            data.push(2.0 + noise);
        }

        let model = ArimaModel::fit(&data, ModelConfig::new(0, 0, 2)).unwrap();
        let forecasts = model.forecast(&data, 3);
        assert!(forecasts.iter().all(|v| v.is_finite()));
    }
}
