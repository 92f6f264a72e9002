//! Tukey's honestly significant difference test.
//!
//! Pairwise comparisons use the Tukey-Kramer standard error, so groups of
//! unequal size are supported as long as the pooled variance has at least
//! two residual degrees of freedom.

use std::f64::consts::SQRT_2;

use serde::Serialize;

use crate::{
    FitError,
    group::{Group, Groups},
    studentized_range::{ptukey, qtukey},
};

/// Significance level used when none is given.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Comparison of one pair of groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseComparison<L> {
    pub group1: L,
    pub group2: L,
    /// `mean(group2) - mean(group1)`.
    pub mean_diff: f64,
    /// Family-wise adjusted p-value.
    pub p_adj: f64,
    /// Lower bound of the simultaneous confidence interval.
    pub lower: f64,
    /// Upper bound of the simultaneous confidence interval.
    pub upper: f64,
    /// Whether the difference is significant at the test's alpha.
    pub reject: bool,
}

impl<L> PairwiseComparison<L> {
    /// Half-width of the confidence interval.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        (self.upper - self.lower) / 2.0
    }
}

/// Per-group summary used by the simultaneous interval plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupInterval<L> {
    pub label: L,
    pub count: usize,
    pub mean: f64,
    /// Half-width of the group's simultaneous comparison interval.
    pub half_width: f64,
}

impl<L> GroupInterval<L> {
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.mean - self.half_width
    }

    #[must_use]
    pub fn upper(&self) -> f64 {
        self.mean + self.half_width
    }
}

/// Result of Tukey's HSD test over every pair of groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TukeyHsd<L> {
    pub alpha: f64,
    /// Pooled within-group variance.
    pub mse: f64,
    /// Residual degrees of freedom of the pooled variance.
    pub df_resid: usize,
    /// Critical value of the studentized range at `1 - alpha`.
    pub q_crit: f64,
    /// One entry per group, in group order.
    pub groups: Vec<GroupInterval<L>>,
    /// One entry per unordered pair `(i, j)` with `i < j`, in group order.
    pub comparisons: Vec<PairwiseComparison<L>>,
}

impl<L> TukeyHsd<L>
where
    L: Clone,
{
    /// Runs Tukey's HSD test on `groups` at significance level `alpha`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flowstat_stats::{group::Groups, tukey::TukeyHsd};
    ///
    /// let groups = Groups::from_labeled(
    ///     ["a", "a", "a", "b", "b", "b"],
    ///     [1.0, 1.2, 0.8, 5.0, 5.3, 4.7],
    /// )
    /// .unwrap();
    /// let tukey = TukeyHsd::fit(&groups, 0.05).unwrap();
    /// assert_eq!(tukey.comparisons.len(), 1);
    /// assert!(tukey.comparisons[0].reject);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn fit(groups: &Groups<L>, alpha: f64) -> Result<Self, FitError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(FitError::InvalidAlpha { alpha });
        }
        groups.check_layout(2)?;

        let k = groups.len();
        let df_resid = groups.residual_df();
        let within = groups.iter().map(Group::sum_of_squares).sum::<f64>();
        let mse = within / df_resid as f64;
        let q_crit = qtukey(1.0 - alpha, k, df_resid as f64);

        let groups = groups.as_slice();
        let mut comparisons = Vec::with_capacity(k * (k - 1) / 2);
        for (i, first) in groups.iter().enumerate() {
            for second in &groups[i + 1..] {
                let std_err =
                    (mse / 2.0 * (1.0 / first.len() as f64 + 1.0 / second.len() as f64)).sqrt();
                let mean_diff = second.mean() - first.mean();
                let half_width = q_crit * std_err;
                let p_adj =
                    (1.0 - ptukey(mean_diff.abs() / std_err, k, df_resid as f64)).clamp(0.0, 1.0);
                comparisons.push(PairwiseComparison {
                    group1: first.label.clone(),
                    group2: second.label.clone(),
                    mean_diff,
                    p_adj,
                    lower: mean_diff - half_width,
                    upper: mean_diff + half_width,
                    reject: mean_diff.abs() > half_width,
                });
            }
        }

        let counts = groups.iter().map(Group::len).collect::<Vec<_>>();
        let half_widths = simultaneous_half_widths(q_crit, mse, &counts);
        let intervals = groups
            .iter()
            .zip(half_widths)
            .map(|(g, half_width)| GroupInterval {
                label: g.label.clone(),
                count: g.len(),
                mean: g.mean(),
                half_width,
            })
            .collect();

        Ok(Self {
            alpha,
            mse,
            df_resid,
            q_crit,
            groups: intervals,
            comparisons,
        })
    }

    /// Number of pairs whose difference is significant.
    #[must_use]
    pub fn significant_count(&self) -> usize {
        self.comparisons.iter().filter(|c| c.reject).count()
    }
}

impl<L> TukeyHsd<L>
where
    L: PartialEq,
{
    /// Looks up the comparison of two groups regardless of their order.
    ///
    /// The returned comparison keeps its stored orientation
    /// (`group2 - group1`).
    #[must_use]
    pub fn comparison(&self, a: &L, b: &L) -> Option<&PairwiseComparison<L>> {
        self.comparisons.iter().find(|c| {
            (c.group1 == *a && c.group2 == *b) || (c.group1 == *b && c.group2 == *a)
        })
    }
}

/// Per-group half-widths whose pairwise sums best approximate the pairwise
/// comparison widths (Hochberg & Tamhane).
///
/// Solves `min Σ (w_i + w_j - d_ij)²` with `d_ij = sqrt(mse/n_i + mse/n_j)`
/// in closed form and scales the result by `q_crit / √2`, so two groups whose
/// intervals do not overlap differ significantly (exactly so for equal sizes).
#[expect(clippy::cast_precision_loss)]
fn simultaneous_half_widths(q_crit: f64, mse: f64, counts: &[usize]) -> Vec<f64> {
    let k = counts.len();
    let group_var = counts.iter().map(|&n| mse / n as f64).collect::<Vec<_>>();
    let distance = |i: usize, j: usize| (group_var[i] + group_var[j]).sqrt();

    let scale = q_crit / SQRT_2;
    if k == 2 {
        let w = distance(0, 1) / 2.0;
        return vec![scale * w; 2];
    }

    let pair_sum = (0..k)
        .flat_map(|i| (i + 1..k).map(move |j| (i, j)))
        .map(|(i, j)| distance(i, j))
        .sum::<f64>();
    let kf = k as f64;
    (0..k)
        .map(|i| {
            let row_sum = (0..k).filter(|&j| j != i).map(|j| distance(i, j)).sum::<f64>();
            scale * ((kf - 1.0) * row_sum - pair_sum) / ((kf - 1.0) * (kf - 2.0))
        })
        .collect()
}
