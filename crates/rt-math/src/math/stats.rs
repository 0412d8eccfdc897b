//! Descriptive statistics over daily metric series.
//!
//! Every function degrades to a documented neutral value on degenerate
//! input (empty series, too few samples, zero variance) instead of
//! returning an error: a flat or tiny series means "no signal", and the
//! pipeline above carries that forward as lower confidence rather than
//! aborting an investigation.

use serde::{Deserialize, Serialize};

/// Minimum sample count for a meaningful Pearson correlation.
const PEARSON_MIN_SAMPLES: usize = 3;

/// |t| threshold above which a Welch's t-test is flagged significant.
const WELCH_SIGNIFICANCE_T: f64 = 2.0;

/// Arithmetic mean. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased (n-1 denominator) sample standard deviation.
///
/// Returns 0.0 for fewer than 2 samples.
pub fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Standard score of `value` against a baseline distribution.
///
/// Returns 0.0 when `stddev` is 0: a flat series carries no signal, not
/// an infinite one.
pub fn z_score(value: f64, mean: f64, stddev: f64) -> f64 {
    if stddev == 0.0 {
        return 0.0;
    }
    (value - mean) / stddev
}

/// Pearson correlation coefficient over the overlapping prefix of both
/// series (`n = min(len(xs), len(ys))`).
///
/// Returns 0.0 if fewer than 3 overlapping points or either variance is
/// zero. The result is clamped to [-1, 1] so floating-point round-off
/// never leaks an out-of-range coefficient.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < PEARSON_MIN_SAMPLES {
        return 0.0;
    }
    let xs = &xs[..n];
    let ys = &ys[..n];
    let mx = mean(xs);
    let my = mean(ys);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = xs[i] - mx;
        let dy = ys[i] - my;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Pearson correlation with `xs` leading `ys` by `lag` days:
/// correlates `xs[0..n-lag]` against `ys[lag..n]`.
///
/// `lag = 0` is identical to [`pearson`]. Returns 0.0 when the shifted
/// overlap has fewer than 3 points.
pub fn lagged_pearson(xs: &[f64], ys: &[f64], lag: usize) -> f64 {
    let n = xs.len().min(ys.len());
    if lag >= n {
        return 0.0;
    }
    pearson(&xs[..n - lag], &ys[lag..n])
}

/// Result of a two-sample Welch's t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WelchResult {
    /// The t statistic; 0.0 when the test degenerates.
    pub t: f64,
    /// True when `|t|` exceeds 2.0.
    pub significant: bool,
}

/// Two-sample Welch's t-test (unequal variances).
///
/// Returns `{t: 0.0, significant: false}` when either sample has fewer
/// than 2 points or the pooled standard error is zero.
pub fn welch_t_test(sample_a: &[f64], sample_b: &[f64]) -> WelchResult {
    if sample_a.len() < 2 || sample_b.len() < 2 {
        return WelchResult {
            t: 0.0,
            significant: false,
        };
    }
    let var_a = sample_stddev(sample_a).powi(2);
    let var_b = sample_stddev(sample_b).powi(2);
    let se = (var_a / sample_a.len() as f64 + var_b / sample_b.len() as f64).sqrt();
    if se == 0.0 {
        return WelchResult {
            t: 0.0,
            significant: false,
        };
    }
    let t = (mean(sample_a) - mean(sample_b)) / se;
    WelchResult {
        t,
        significant: t.abs() > WELCH_SIGNIFICANCE_T,
    }
}
