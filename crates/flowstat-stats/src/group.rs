use std::collections::BTreeMap;

use crate::{FitError, descriptive::sum_of_squares};

/// Values observed under one level of a categorical factor.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<L> {
    /// Factor level shared by every value of the group.
    pub label: L,
    /// Observed values, in input order.
    pub values: Vec<f64>,
}

impl<L> Group<L> {
    /// Number of observations in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Arithmetic mean (`NaN` for an empty group).
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Sum of squared deviations from the group mean.
    #[must_use]
    pub fn sum_of_squares(&self) -> f64 {
        sum_of_squares(&self.values, self.mean())
    }
}

/// Observations partitioned by factor level.
///
/// Groups are ordered by the `Ord` implementation of the label type, which
/// fixes the order of every table derived from them.
///
/// # Examples
///
/// ```
/// use flowstat_stats::group::Groups;
///
/// let groups = Groups::from_labeled(["b", "a", "b"], [1.0, 2.0, 3.0]).unwrap();
/// let labels = groups.iter().map(|g| g.label).collect::<Vec<_>>();
/// assert_eq!(labels, ["a", "b"]);
/// assert_eq!(groups.total_count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Groups<L> {
    groups: Vec<Group<L>>,
}

impl<L> Groups<L>
where
    L: Ord,
{
    /// Groups `values` by the label at the same position.
    ///
    /// Fails with [`FitError::LengthMismatch`] when the two inputs differ in length.
    pub fn from_labeled<I, V>(labels: I, values: V) -> Result<Self, FitError>
    where
        I: IntoIterator<Item = L>,
        V: IntoIterator<Item = f64>,
    {
        let labels = labels.into_iter().collect::<Vec<_>>();
        let values = values.into_iter().collect::<Vec<_>>();
        if labels.len() != values.len() {
            return Err(FitError::LengthMismatch {
                labels: labels.len(),
                values: values.len(),
            });
        }

        let mut map = BTreeMap::<L, Vec<f64>>::new();
        for (label, value) in labels.into_iter().zip(values) {
            map.entry(label).or_default().push(value);
        }
        Ok(Self {
            groups: map
                .into_iter()
                .map(|(label, values)| Group { label, values })
                .collect(),
        })
    }
}

impl<L> Groups<L> {
    /// Builds groups from already partitioned data, keeping the given order.
    #[must_use]
    pub fn from_groups(groups: Vec<Group<L>>) -> Self {
        Self { groups }
    }

    #[must_use]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Group<L>> + '_ {
        self.groups.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Group<L>] {
        &self.groups
    }

    /// Number of groups (factor levels).
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of observations across all groups.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// Mean of all observations, ignoring group membership.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn grand_mean(&self) -> f64 {
        let sum = self
            .groups
            .iter()
            .flat_map(|g| g.values.iter())
            .sum::<f64>();
        sum / self.total_count() as f64
    }

    /// Residual degrees of freedom of a one-way layout (`N - k`).
    #[must_use]
    pub fn residual_df(&self) -> usize {
        self.total_count().saturating_sub(self.len())
    }

    /// Checks the layout every one-way procedure relies on.
    ///
    /// Requires at least two groups, no empty group, and at least
    /// `min_residual_df` residual degrees of freedom.
    pub(crate) fn check_layout(&self, min_residual_df: usize) -> Result<(), FitError> {
        if self.groups.len() < 2 {
            return Err(FitError::TooFewGroups {
                found: self.groups.len(),
            });
        }
        if let Some(index) = self.groups.iter().position(Group::is_empty) {
            return Err(FitError::EmptyGroup { index });
        }
        if let Some(index) = self
            .groups
            .iter()
            .position(|g| g.values.iter().any(|v| !v.is_finite()))
        {
            return Err(FitError::NonFiniteValue { index });
        }
        let df = self.residual_df();
        if df < min_residual_df {
            return Err(FitError::InsufficientReplicates {
                residual_df: df,
                required: min_residual_df,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_sorted_by_label() {
        let groups =
            Groups::from_labeled([200, 0, 50, 50, 200], [1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let labels = groups.iter().map(|g| g.label).collect::<Vec<_>>();
        assert_eq!(labels, [0, 50, 200]);
        assert_eq!(groups.as_slice()[2].values, [1.0, 5.0]);
        assert_eq!(groups.residual_df(), 2);
    }

    #[test]
    fn test_length_mismatch() {
        let err = Groups::from_labeled([1, 2], [1.0]).unwrap_err();
        assert_eq!(err, FitError::LengthMismatch { labels: 2, values: 1 });
    }

    #[test]
    fn test_layout_checks() {
        let single = Groups::from_labeled([1, 1], [1.0, 2.0]).unwrap();
        assert_eq!(single.check_layout(1), Err(FitError::TooFewGroups { found: 1 }));

        let unreplicated = Groups::from_labeled([1, 2], [1.0, 2.0]).unwrap();
        assert_eq!(
            unreplicated.check_layout(1),
            Err(FitError::InsufficientReplicates {
                residual_df: 0,
                required: 1
            })
        );

        let empty = Groups::from_groups(vec![
            Group {
                label: 1,
                values: vec![1.0],
            },
            Group {
                label: 2,
                values: vec![],
            },
        ]);
        assert_eq!(empty.check_layout(0), Err(FitError::EmptyGroup { index: 1 }));
    }

    #[test]
    fn test_grand_mean() {
        let groups = Groups::from_labeled(["x", "y", "y"], [3.0, 1.0, 2.0]).unwrap();
        assert!((groups.grand_mean() - 2.0).abs() < 1e-12);
    }
}
