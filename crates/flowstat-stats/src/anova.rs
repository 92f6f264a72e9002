//! One-way analysis of variance.
//!
//! With a single categorical factor the Type-I, Type-II and Type-III sums of
//! squares coincide, so the table produced here is the Type-II table of a
//! linear model `response ~ C(factor)`.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF as _, FisherSnedecor};

use crate::{
    FitError,
    group::{Group, Groups},
};

/// One line of an ANOVA table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnovaRow {
    /// Sum of squares attributed to this source.
    pub sum_sq: f64,
    /// Degrees of freedom of this source.
    pub df: usize,
    /// F statistic (`None` for the residual row).
    pub f_value: Option<f64>,
    /// Upper-tail probability of the F statistic (`None` for the residual row).
    pub p_value: Option<f64>,
}

impl AnovaRow {
    /// Mean square (`sum_sq / df`).
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_sq(&self) -> f64 {
        self.sum_sq / self.df as f64
    }
}

/// Result of a one-way ANOVA.
///
/// # Examples
///
/// ```
/// use flowstat_stats::{anova::OneWayAnova, group::Groups};
///
/// let groups = Groups::from_labeled([0, 0, 1, 1], [1.0, 2.0, 3.0, 4.0]).unwrap();
/// let anova = OneWayAnova::fit(&groups).unwrap();
/// assert_eq!(anova.factor.sum_sq, 4.0);
/// assert_eq!(anova.residual.sum_sq, 1.0);
/// assert_eq!(anova.factor.f_value, Some(8.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneWayAnova {
    /// Between-group source.
    pub factor: AnovaRow,
    /// Within-group (residual) source.
    pub residual: AnovaRow,
    /// Number of observations.
    pub n_obs: usize,
    /// Mean of all observations.
    pub grand_mean: f64,
}

impl OneWayAnova {
    /// Fits the one-way layout described by `groups`.
    ///
    /// Fails when there are fewer than two groups, an empty group, or no
    /// residual degrees of freedom left to estimate the within-group variance.
    #[expect(clippy::cast_precision_loss)]
    pub fn fit<L>(groups: &Groups<L>) -> Result<Self, FitError> {
        groups.check_layout(1)?;

        let grand_mean = groups.grand_mean();
        let between = groups
            .iter()
            .map(|g| g.len() as f64 * (g.mean() - grand_mean).powi(2))
            .sum::<f64>();
        let within = groups.iter().map(Group::sum_of_squares).sum::<f64>();
        // Rounding noise from identical group means must not turn into an effect.
        let between = if between <= f64::EPSILON * (between + within) {
            0.0
        } else {
            between
        };

        let mut factor = AnovaRow {
            sum_sq: between,
            df: groups.len() - 1,
            f_value: None,
            p_value: None,
        };
        let residual = AnovaRow {
            sum_sq: within,
            df: groups.residual_df(),
            f_value: None,
            p_value: None,
        };
        let f_value = factor.mean_sq() / residual.mean_sq();
        factor.f_value = Some(f_value);
        factor.p_value = Some(f_upper_tail(f_value, factor.df, residual.df)?);

        Ok(Self {
            factor,
            residual,
            n_obs: groups.total_count(),
            grand_mean,
        })
    }

    /// F statistic of the factor.
    #[must_use]
    pub fn f_value(&self) -> f64 {
        self.factor.f_value.unwrap_or(f64::NAN)
    }

    /// p-value of the factor.
    #[must_use]
    pub fn p_value(&self) -> f64 {
        self.factor.p_value.unwrap_or(f64::NAN)
    }

    /// Whether the null hypothesis of equal means is rejected at `alpha`.
    #[must_use]
    pub fn rejects_at(&self, alpha: f64) -> bool {
        self.p_value() < alpha
    }
}

/// `P(F > f)` for an F distribution with the given degrees of freedom.
#[expect(clippy::cast_precision_loss)]
fn f_upper_tail(f: f64, df1: usize, df2: usize) -> Result<f64, FitError> {
    if f.is_nan() {
        return Ok(f64::NAN);
    }
    if f <= 0.0 {
        return Ok(1.0);
    }
    if f.is_infinite() {
        return Ok(0.0);
    }
    let dist = FisherSnedecor::new(df1 as f64, df2 as f64).map_err(|_| {
        FitError::InsufficientReplicates {
            residual_df: df2,
            required: 1,
        }
    })?;
    Ok(dist.sf(f))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn mcf7_live_cells() -> Groups<u32> {
        Groups::from_labeled(
            [0, 50, 50, 100, 100, 200, 200],
            [63.18, 24.47, 25.38, 21.69, 19.81, 14.34, 12.34],
        )
        .unwrap()
    }

    #[test]
    fn test_matches_closed_form() {
        let groups = mcf7_live_cells();
        let anova = OneWayAnova::fit(&groups).unwrap();

        // Recompute from group means and sample variances.
        let n = 7.0;
        let grand = (63.18 + 24.47 + 25.38 + 21.69 + 19.81 + 14.34 + 12.34) / n;
        let means = [(1.0, 63.18), (2.0, 24.925), (2.0, 20.75), (2.0, 13.34)];
        let variances = [0.41405, 1.7672, 2.0];
        let ssb = means
            .iter()
            .map(|(count, mean)| count * (mean - grand) * (mean - grand))
            .sum::<f64>();
        // Each dosed group has n_i - 1 = 1, so SS_within is the sum of variances.
        let ssw = variances.iter().sum::<f64>();
        let f = (ssb / 3.0) / (ssw / 3.0);

        assert_abs_diff_eq!(anova.factor.sum_sq, ssb, epsilon = 1e-9);
        assert_abs_diff_eq!(anova.residual.sum_sq, ssw, epsilon = 1e-9);
        assert_eq!(anova.factor.df, 3);
        assert_eq!(anova.residual.df, 3);
        assert_abs_diff_eq!(anova.residual.mean_sq(), ssw / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            anova.factor.mean_sq() / anova.residual.mean_sq(),
            anova.f_value(),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(anova.f_value(), f, epsilon = 1e-6);

        let expected_p = FisherSnedecor::new(3.0, 3.0).unwrap().sf(f);
        assert_abs_diff_eq!(anova.p_value(), expected_p, epsilon = 1e-12);
        assert!(anova.rejects_at(0.05));
        assert!(anova.p_value() < 1e-3);
    }

    #[test]
    fn test_equal_means_give_unit_p_value() {
        let groups =
            Groups::from_labeled(["a", "a", "b", "b", "c", "c"], [1.0, 3.0, 0.0, 4.0, 2.5, 1.5])
                .unwrap();
        let anova = OneWayAnova::fit(&groups).unwrap();
        assert_abs_diff_eq!(anova.factor.sum_sq, 0.0, epsilon = 1e-12);
        assert_eq!(anova.p_value(), 1.0);
        assert!(!anova.rejects_at(0.05));
    }

    #[test]
    fn test_zero_within_variance() {
        let groups = Groups::from_labeled([1, 1, 2, 2], [1.0, 1.0, 2.0, 2.0]).unwrap();
        let anova = OneWayAnova::fit(&groups).unwrap();
        assert!(anova.f_value().is_infinite());
        assert_eq!(anova.p_value(), 0.0);

        let flat = Groups::from_labeled([1, 1, 2, 2], [1.0, 1.0, 1.0, 1.0]).unwrap();
        let anova = OneWayAnova::fit(&flat).unwrap();
        assert!(anova.f_value().is_nan());
        assert!(anova.p_value().is_nan());
    }

    #[test]
    fn test_requires_replicates() {
        let groups = Groups::from_labeled([1, 2, 3], [1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            OneWayAnova::fit(&groups),
            Err(FitError::InsufficientReplicates {
                residual_df: 0,
                required: 1
            })
        );
    }
}
