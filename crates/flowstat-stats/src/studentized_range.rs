//! Studentized range distribution.
//!
//! The studentized range `q = (max - min) / s` of `k` independent standard
//! normal samples, where `s²` is an independent variance estimate with `df`
//! degrees of freedom, is the reference distribution of Tukey's HSD test.
//!
//! [`ptukey`] evaluates the CDF by Gauss-Legendre quadrature following
//! Copenhaver & Holland (1988): the inner integral is the distribution of
//! the range of `k` normals, the outer integral averages it over the chi
//! distribution of `s`. [`qtukey`] inverts the CDF numerically.
//!
//! # Examples
//!
//! ```
//! use flowstat_stats::studentized_range::{ptukey, qtukey};
//!
//! let q = qtukey(0.95, 3, 10.0);
//! assert!((q - 3.877).abs() < 1e-3);
//! assert!((ptukey(q, 3, 10.0) - 0.95).abs() < 1e-8);
//! ```

use std::f64::consts::{FRAC_1_SQRT_2, LN_2, PI};

use statrs::function::{erf::erfc, gamma::ln_gamma};

/// Gauss-Legendre nodes (positive half) for the 12-point inner rule.
const INNER_NODES: [f64; 6] = [
    0.981_560_634_246_719_2,
    0.904_117_256_370_474_9,
    0.769_902_674_194_304_7,
    0.587_317_954_286_617_5,
    0.367_831_498_998_180_2,
    0.125_233_408_511_468_9,
];

const INNER_WEIGHTS: [f64; 6] = [
    0.047_175_336_386_511_83,
    0.106_939_325_995_318_43,
    0.160_078_328_543_346_22,
    0.203_167_426_723_065_92,
    0.233_492_536_538_354_8,
    0.249_147_045_813_402_77,
];

/// Gauss-Legendre nodes (positive half) for the 16-point outer rule.
const OUTER_NODES: [f64; 8] = [
    0.989_400_934_991_649_9,
    0.944_575_023_073_232_6,
    0.865_631_202_387_831_8,
    0.755_404_408_355_003,
    0.617_876_244_402_643_8,
    0.458_016_777_657_227_37,
    0.281_603_550_779_258_9,
    0.095_012_509_837_637_44,
];

const OUTER_WEIGHTS: [f64; 8] = [
    0.027_152_459_411_754_096,
    0.062_253_523_938_647_894,
    0.095_158_511_682_492_79,
    0.124_628_971_255_533_88,
    0.149_595_988_816_576_74,
    0.169_156_519_395_002_54,
    0.182_603_415_044_923_58,
    0.189_450_610_455_068_5,
];

/// Above this many degrees of freedom `s` is treated as exact.
const LARGE_DF: f64 = 25_000.0;

/// Standard normal CDF.
fn pnorm(x: f64) -> f64 {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// CDF of the range of `k` standard normal samples evaluated at `w`.
#[expect(clippy::cast_precision_loss)]
fn range_cdf(w: f64, k: usize) -> f64 {
    const LOG_FLOOR: f64 = -30.0;
    const EXPONENT_CUTOFF: f64 = 60.0;
    const UPPER_BOUND: f64 = 8.0;
    const WIDE_RANGE: f64 = 3.0;

    let cc = k as f64;
    let half = w * 0.5;
    if half >= UPPER_BOUND {
        return 1.0;
    }

    // Probability that all k samples fall inside [-w/2, w/2].
    let inside = 2.0 * pnorm(half) - 1.0;
    let mut prob = if inside >= 1.0 { 1.0 } else { inside.powf(cc) };

    let steps = if w > WIDE_RANGE { 2 } else { 3 };
    let step = (UPPER_BOUND - half) / f64::from(steps);
    let mut lower = half;
    let mut upper = half + step;
    let cc1 = cc - 1.0;
    let threshold = (LOG_FLOOR / cc1).exp();

    let mut integral = 0.0;
    for _ in 0..steps {
        let center = 0.5 * (upper + lower);
        let radius = 0.5 * (upper - lower);
        let mut sum = 0.0;
        for (node, weight) in symmetric_rule(&INNER_NODES, &INNER_WEIGHTS) {
            let x = center + radius * node;
            let exponent = x * x;
            if exponent > EXPONENT_CUTOFF {
                break;
            }
            let spread = pnorm(x) - pnorm(x - w);
            if spread >= threshold {
                sum += weight * (-0.5 * exponent).exp() * spread.powf(cc1);
            }
        }
        integral += sum * (2.0 * radius * cc) / (2.0 * PI).sqrt();
        lower = upper;
        upper += step;
    }

    prob += integral;
    if prob <= LOG_FLOOR.exp() {
        return 0.0;
    }
    prob.min(1.0)
}

/// Expands half a symmetric Gauss-Legendre rule into `(node, weight)` pairs,
/// negative nodes first.
fn symmetric_rule<'a>(
    nodes: &'a [f64],
    weights: &'a [f64],
) -> impl Iterator<Item = (f64, f64)> + 'a {
    let negative = nodes.iter().zip(weights).map(|(x, w)| (-x, *w));
    let positive = nodes.iter().zip(weights).rev().map(|(x, w)| (*x, *w));
    negative.chain(positive)
}

/// Cumulative distribution function of the studentized range.
///
/// Returns `P(Q <= q)` for `k` compared groups and `df` degrees of freedom of
/// the variance estimate. Returns `NaN` when `k < 2` or `df < 2`.
///
/// # Examples
///
/// ```
/// use flowstat_stats::studentized_range::ptukey;
///
/// assert_eq!(ptukey(0.0, 4, 3.0), 0.0);
/// assert_eq!(ptukey(f64::INFINITY, 4, 3.0), 1.0);
/// assert!(ptukey(1.0, 1, 3.0).is_nan());
/// ```
#[must_use]
pub fn ptukey(q: f64, k: usize, df: f64) -> f64 {
    const LOG_FLOOR: f64 = -30.0;
    const CONVERGED: f64 = 1.0e-14;
    const MAX_INTERVALS: u32 = 50;

    if q.is_nan() || df.is_nan() || k < 2 || df < 2.0 {
        return f64::NAN;
    }
    if q <= 0.0 {
        return 0.0;
    }
    if q.is_infinite() {
        return 1.0;
    }
    if df > LARGE_DF {
        return range_cdf(q, k);
    }

    // Log density of the scaled chi distribution, without the variable part.
    let f2 = df * 0.5;
    let f21 = f2 - 1.0;
    let ff4 = df * 0.25;
    let interval = if df <= 100.0 {
        1.0
    } else if df <= 800.0 {
        0.5
    } else if df <= 5000.0 {
        0.25
    } else {
        0.125
    };
    let log_norm = f2 * df.ln() - df * LN_2 - ln_gamma(f2) + f64::ln(interval);

    let mut total = 0.0;
    for i in 1..=MAX_INTERVALS {
        let mid = f64::from(2 * i - 1) * interval;
        let mut sum = 0.0;
        for (node, weight) in symmetric_rule(&OUTER_NODES, &OUTER_WEIGHTS) {
            let u = mid + node * interval;
            let log_density = log_norm + f21 * u.ln() - u * ff4;
            if log_density >= LOG_FLOOR {
                let scaled = q * (u * 0.5).sqrt();
                sum += range_cdf(scaled, k) * weight * log_density.exp();
            }
        }
        if f64::from(i) * interval >= 1.0 && sum <= CONVERGED {
            break;
        }
        total += sum;
    }

    total.min(1.0)
}

/// Quantile function of the studentized range.
///
/// Finds `q` with `ptukey(q, k, df) = p` by bracketing and bisection.
/// Returns `NaN` for `p` outside `(0, 1)` or parameters rejected by [`ptukey`].
///
/// # Examples
///
/// ```
/// use flowstat_stats::studentized_range::qtukey;
///
/// // Critical value for four groups and three residual degrees of freedom.
/// assert!((qtukey(0.95, 4, 3.0) - 6.825).abs() < 2e-3);
/// assert!(qtukey(1.5, 4, 3.0).is_nan());
/// ```
#[must_use]
pub fn qtukey(p: f64, k: usize, df: f64) -> f64 {
    const TOLERANCE: f64 = 1.0e-10;
    const MAX_ITERATIONS: u32 = 200;

    if !(p > 0.0 && p < 1.0) || k < 2 || df.is_nan() || df < 2.0 {
        return f64::NAN;
    }

    let mut lower = 0.0;
    let mut upper = 1.0;
    while ptukey(upper, k, df) < p {
        lower = upper;
        upper *= 2.0;
        if upper > 1.0e6 {
            return f64::INFINITY;
        }
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = f64::midpoint(lower, upper);
        if ptukey(mid, k, df) < p {
            lower = mid;
        } else {
            upper = mid;
        }
        if upper - lower < TOLERANCE {
            break;
        }
    }
    f64::midpoint(lower, upper)
}
