//! Least-squares ARIMA estimation.
//!
//! Differencing is expressed through the expanded lag polynomial
//! `(1-B)^d (1-B^s)^D`, autoregressive terms are estimated by ordinary least
//! squares on the differenced series, and moving-average terms use two-stage
//! Hannan-Rissanen: a long autoregression supplies residuals that enter the
//! final regression as extra regressors.

use super::{FitError, ModelSpec};

/// Stage-one autoregression order for Hannan-Rissanen.
const LONG_AR_ORDER: usize = 10;

/// Variance threshold under which the differenced series is treated as
/// constant and the forecast short-circuits to a flat continuation.
const NEAR_ZERO_VARIANCE: f64 = 1e-12;

/// Pivot threshold below which the normal equations count as singular.
const SINGULAR_PIVOT: f64 = 1e-12;

/// A fitted model ready to produce point forecasts.
#[derive(Debug, Clone)]
pub struct FittedArima {
    diff_poly: Vec<f64>,
    ar_lags: Vec<usize>,
    ar_coef: Vec<f64>,
    ma_lags: Vec<usize>,
    ma_coef: Vec<f64>,
    intercept: f64,
    history: Vec<f64>,
    w: Vec<f64>,
    resid: Vec<f64>,
}

/// Fit `spec` to `series` by least squares.
pub fn fit(series: &[f64], spec: &ModelSpec) -> Result<FittedArima, FitError> {
    let (p, d, q) = spec.order;

    let mut ar_lags: Vec<usize> = (1..=p).collect();
    let mut ma_lags: Vec<usize> = (1..=q).collect();
    let mut diff_poly = vec![1.0];
    for _ in 0..d {
        diff_poly = poly_mul(&diff_poly, &[1.0, -1.0]);
    }
    if let Some(seasonal) = spec.seasonal {
        let (sp, sd, sq) = seasonal.order;
        for k in 1..=sp {
            ar_lags.push(k * seasonal.period);
        }
        for k in 1..=sq {
            ma_lags.push(k * seasonal.period);
        }
        let mut seasonal_poly = vec![0.0; seasonal.period + 1];
        seasonal_poly[0] = 1.0;
        seasonal_poly[seasonal.period] = -1.0;
        for _ in 0..sd {
            diff_poly = poly_mul(&diff_poly, &seasonal_poly);
        }
    }
    ar_lags.sort_unstable();
    ar_lags.dedup();
    ma_lags.sort_unstable();
    ma_lags.dedup();

    let span = diff_poly.len() - 1;
    let max_ar = ar_lags.last().copied().unwrap_or(0);
    let max_ma = ma_lags.last().copied().unwrap_or(0);
    let long_ar = if ma_lags.is_empty() { 0 } else { LONG_AR_ORDER.max(max_ma + 1) };
    let start = if ma_lags.is_empty() { max_ar } else { long_ar + max_ma };
    let unknowns = 1 + ar_lags.len() + ma_lags.len();

    let mut need_w = start + unknowns + 2;
    if !ma_lags.is_empty() {
        need_w = need_w.max(2 * long_ar + 3);
    }
    if series.len() < span + need_w {
        return Err(FitError::InsufficientHistory {
            have: series.len(),
            need: span + need_w,
        });
    }

    let w = difference(series, &diff_poly);

    if variance(&w) <= NEAR_ZERO_VARIANCE {
        // Constant differenced series: continue it flat.
        return Ok(FittedArima {
            diff_poly,
            ar_lags: Vec::new(),
            ar_coef: Vec::new(),
            ma_lags: Vec::new(),
            ma_coef: Vec::new(),
            intercept: mean(&w),
            history: series.to_vec(),
            resid: vec![0.0; w.len()],
            w,
        });
    }

    // Stage one: long autoregression residuals stand in for the unobserved
    // innovations of the MA terms.
    let resid = if ma_lags.is_empty() {
        vec![0.0; w.len()]
    } else {
        let lags: Vec<usize> = (1..=long_ar).collect();
        let beta = regress(&w, &lags, &[], &[], long_ar)?;
        residuals(&w, &lags, &beta[1..], &[], &[], beta[0], long_ar)
    };

    let beta = regress(&w, &ar_lags, &ma_lags, &resid, start)?;
    let intercept = beta[0];
    let ar_coef = beta[1..1 + ar_lags.len()].to_vec();
    let ma_coef = beta[1 + ar_lags.len()..].to_vec();

    let final_resid = residuals(&w, &ar_lags, &ar_coef, &ma_lags, &ma_coef, intercept, start);
    // Keep stage-one residuals where the final ones are undefined.
    let resid = final_resid
        .iter()
        .enumerate()
        .map(|(t, &r)| if t < start { resid[t] } else { r })
        .collect();

    Ok(FittedArima {
        diff_poly,
        ar_lags,
        ar_coef,
        ma_lags,
        ma_coef,
        intercept,
        history: series.to_vec(),
        w,
        resid,
    })
}

impl FittedArima {
    /// Recursive point forecast: future innovations are zero, forecasts feed
    /// back as observations, and the differencing polynomial is inverted to
    /// return to the original scale.
    pub fn forecast(&self, steps: usize) -> Result<Vec<f64>, FitError> {
        let span = self.diff_poly.len() - 1;
        let mut w = self.w.clone();
        let mut resid = self.resid.clone();
        let mut history = self.history.clone();
        let mut out = Vec::with_capacity(steps);

        for _ in 0..steps {
            let t = w.len();
            let mut w_next = self.intercept;
            for (coef, lag) in self.ar_coef.iter().zip(&self.ar_lags) {
                w_next += coef * w[t - lag];
            }
            for (coef, lag) in self.ma_coef.iter().zip(&self.ma_lags) {
                if t >= *lag {
                    w_next += coef * resid[t - lag];
                }
            }

            let n = history.len();
            let mut y_next = w_next;
            for k in 1..=span {
                y_next -= self.diff_poly[k] * history[n - k];
            }
            if !y_next.is_finite() {
                return Err(FitError::NonConvergence(
                    "forecast diverged to a non-finite value".into(),
                ));
            }

            w.push(w_next);
            resid.push(0.0);
            history.push(y_next);
            out.push(y_next);
        }

        Ok(out)
    }
}

/// Regress `w[t]` on an intercept, lagged values, and lagged residuals,
/// starting at `start`.
fn regress(
    w: &[f64],
    ar_lags: &[usize],
    ma_lags: &[usize],
    resid: &[f64],
    start: usize,
) -> Result<Vec<f64>, FitError> {
    let mut rows = Vec::with_capacity(w.len() - start);
    let mut targets = Vec::with_capacity(w.len() - start);
    for t in start..w.len() {
        let mut row = Vec::with_capacity(1 + ar_lags.len() + ma_lags.len());
        row.push(1.0);
        for lag in ar_lags {
            row.push(w[t - lag]);
        }
        for lag in ma_lags {
            row.push(resid[t - lag]);
        }
        rows.push(row);
        targets.push(w[t]);
    }
    least_squares(&rows, &targets)
}

fn residuals(
    w: &[f64],
    ar_lags: &[usize],
    ar_coef: &[f64],
    ma_lags: &[usize],
    ma_coef: &[f64],
    intercept: f64,
    start: usize,
) -> Vec<f64> {
    let mut resid = vec![0.0; w.len()];
    for t in start..w.len() {
        let mut pred = intercept;
        for (coef, lag) in ar_coef.iter().zip(ar_lags) {
            pred += coef * w[t - lag];
        }
        for (coef, lag) in ma_coef.iter().zip(ma_lags) {
            pred += coef * resid[t - lag];
        }
        resid[t] = w[t] - pred;
    }
    resid
}

/// Apply the expanded differencing polynomial: the result has
/// `series.len() - (poly.len() - 1)` entries.
fn difference(series: &[f64], poly: &[f64]) -> Vec<f64> {
    let span = poly.len() - 1;
    (span..series.len())
        .map(|i| poly.iter().enumerate().map(|(k, c)| c * series[i - k]).sum())
        .collect()
}

fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Minimize `||y - Xb||` via the normal equations. A small ridge term keeps
/// near-collinear designs solvable.
fn least_squares(rows: &[Vec<f64>], y: &[f64]) -> Result<Vec<f64>, FitError> {
    let k = rows[0].len();
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &target) in rows.iter().zip(y) {
        for i in 0..k {
            xty[i] += row[i] * target;
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    let ridge = 1e-8 * ((0..k).map(|i| xtx[i][i]).sum::<f64>() / k as f64).max(1.0);
    for (i, row) in xtx.iter_mut().enumerate() {
        row[i] += ridge;
    }

    let beta = solve(xtx, xty)
        .ok_or_else(|| FitError::NonConvergence("normal equations are singular".into()))?;
    if beta.iter().any(|b| !b.is_finite()) {
        return Err(FitError::NonConvergence("non-finite coefficients".into()));
    }
    Ok(beta)
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot_row][col].abs() < SINGULAR_PIVOT {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut acc = b[row];
        for col in row + 1..n {
            acc -= a[row][col] * x[col];
        }
        x[row] = acc / a[row][row];
    }
    Some(x)
}
