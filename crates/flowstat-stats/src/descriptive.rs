use serde::Serialize;
use statrs::distribution::{ContinuousCDF as _, StudentsT};

/// Descriptive statistics summarizing a dataset.
///
/// This structure contains common measures of central tendency, dispersion,
/// and spread for a dataset of `f64` values. Dispersion uses the sample
/// (`n - 1`) denominator, so a single observation has an undefined variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    /// Number of values in the dataset.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// The arithmetic mean (average) of the dataset.
    pub mean: f64,
    /// The median value of the dataset.
    pub median: f64,
    /// The sample variance of the dataset, if it has at least two values.
    pub variance: Option<f64>,
    /// The sample standard deviation of the dataset, if it has at least two values.
    pub std_dev: Option<f64>,
    /// The standard error of the mean, if the dataset has at least two values.
    pub std_err: Option<f64>,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// This method will sort the values internally before computing statistics.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use flowstat_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert_eq!(stats.variance, Some(2.5));
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flowstat_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::from_sorted(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(stats.median, 2.5);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let mid = count / 2;
        let median = if count.is_multiple_of(2) {
            f64::midpoint(sorted_values[mid - 1], sorted_values[mid])
        } else {
            sorted_values[mid]
        };
        let (variance, std_dev, std_err) = if count < 2 {
            (None, None, None)
        } else {
            let variance = sum_of_squares(sorted_values, mean) / (n - 1.0);
            let std_dev = variance.sqrt();
            (Some(variance), Some(std_dev), Some(std_dev / n.sqrt()))
        };

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev,
            std_err,
        })
    }

    /// Half-width of the two-sided Student-t confidence interval for the mean.
    ///
    /// Returns `None` when the dataset holds fewer than two values or when
    /// `level` is not inside `(0, 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flowstat_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([24.47, 25.38]).unwrap();
    /// let half_width = stats.confidence_half_width(0.95).unwrap();
    /// assert!(half_width > 0.0);
    /// assert!(DescriptiveStats::new([63.18]).unwrap().confidence_half_width(0.95).is_none());
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn confidence_half_width(&self, level: f64) -> Option<f64> {
        let std_err = self.std_err?;
        if level <= 0.0 || level >= 1.0 {
            return None;
        }
        let dist = StudentsT::new(0.0, 1.0, (self.count - 1) as f64).ok()?;
        let t = dist.inverse_cdf(0.5 + level / 2.0);
        Some(t * std_err)
    }
}

/// Sum of squared deviations of `values` from `center`.
///
/// # Examples
///
/// ```
/// # use flowstat_stats::descriptive::sum_of_squares;
/// assert_eq!(sum_of_squares(&[1.0, 2.0, 3.0], 2.0), 2.0);
/// ```
#[must_use]
pub fn sum_of_squares(values: &[f64], center: f64) -> f64 {
    values.iter().map(|v| (v - center).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(DescriptiveStats::new(Vec::new()).is_none());
    }

    #[test]
    fn test_single_value_has_undefined_dispersion() {
        let stats = DescriptiveStats::new([63.18]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 63.18);
        assert_eq!(stats.median, 63.18);
        assert_eq!(stats.variance, None);
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.std_err, None);
    }

    #[test]
    fn test_single_value_stats_compare_equal() {
        // Equality must hold for summaries of single-replicate groups too.
        let stats = DescriptiveStats::new([63.18]).unwrap();
        assert_eq!(stats, stats.clone());
        assert_eq!(stats, DescriptiveStats::new([63.18]).unwrap());
    }

    #[test]
    fn test_pair_of_replicates() {
        let stats = DescriptiveStats::new([21.69, 19.81]).unwrap();
        assert_abs_diff_eq!(stats.mean, 20.75, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.variance.unwrap(), 1.7672, epsilon = 1e-10);
        assert_abs_diff_eq!(stats.std_err.unwrap(), 0.94, epsilon = 1e-10);
    }

    #[test]
    fn test_confidence_half_width_uses_student_t() {
        // t(0.975, 1) = 12.7062...
        let stats = DescriptiveStats::new([1.0, 3.0]).unwrap();
        let half_width = stats.confidence_half_width(0.95).unwrap();
        assert_abs_diff_eq!(half_width, 12.706_204_736, epsilon = 1e-6);
    }

    #[test]
    fn test_confidence_half_width_rejects_invalid_level() {
        let stats = DescriptiveStats::new([1.0, 2.0, 3.0]).unwrap();
        assert!(stats.confidence_half_width(0.0).is_none());
        assert!(stats.confidence_half_width(1.0).is_none());
    }
}
