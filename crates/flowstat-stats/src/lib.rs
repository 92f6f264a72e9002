//! Statistical procedures for dose-response reporting.
//!
//! This crate provides the statistics behind the flow-cytometry reports:
//!
//! - **Descriptive statistics**: mean, median, sample variance, confidence intervals
//! - **Grouping**: partition observations by the levels of a categorical factor
//! - **One-way ANOVA**: between/within sums of squares, F statistic and p-value
//! - **Studentized range distribution**: CDF and quantile function
//! - **Tukey HSD**: all-pairs comparisons with family-wise error control
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`group`]: Observations partitioned by factor level
//! - [`anova`]: One-way analysis of variance
//! - [`studentized_range`]: Distribution of the studentized range
//! - [`tukey`]: Tukey's honestly significant difference test
//!
//! # Examples
//!
//! ```
//! use flowstat_stats::{anova::OneWayAnova, group::Groups, tukey::TukeyHsd};
//!
//! let groups = Groups::from_labeled(
//!     [0, 50, 50, 100, 100, 200, 200],
//!     [63.18, 24.47, 25.38, 21.69, 19.81, 14.34, 12.34],
//! )
//! .unwrap();
//!
//! let anova = OneWayAnova::fit(&groups).unwrap();
//! assert!(anova.p_value() < 0.05);
//!
//! let tukey = TukeyHsd::fit(&groups, 0.05).unwrap();
//! assert!(tukey.comparison(&0, &200).unwrap().reject);
//! ```

pub mod anova;
pub mod descriptive;
pub mod group;
pub mod studentized_range;
pub mod tukey;

/// Reasons a one-way procedure cannot be fitted.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum FitError {
    #[display("labels and values differ in length ({labels} labels, {values} values)")]
    LengthMismatch { labels: usize, values: usize },
    #[display("at least two groups are required, found {found}")]
    TooFewGroups { found: usize },
    #[display("group #{index} has no observations")]
    EmptyGroup { index: usize },
    #[display("group #{index} contains a non-finite value")]
    NonFiniteValue { index: usize },
    #[display(
        "not enough replicates: {residual_df} residual degrees of freedom, at least {required} required"
    )]
    InsufficientReplicates { residual_df: usize, required: usize },
    #[display("significance level must be inside (0, 1), got {alpha}")]
    InvalidAlpha { alpha: f64 },
}
