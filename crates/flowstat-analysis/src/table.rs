//! In-memory observation table.
//!
//! Rows are biological replicates. Every row carries a dose level, an
//! optional sample identifier, and one value per response category
//! (percentage of cells in a given state).

use std::collections::HashSet;

use flowstat_stats::{FitError, group::Groups};
use serde::Serialize;

/// A level of the dose factor.
///
/// Numeric doses order numerically, labels lexicographically, and numeric
/// levels sort before labels.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display)]
#[serde(untagged)]
pub enum Level {
    /// Dose in µg/mL.
    #[display("{_0}")]
    Numeric(u32),
    /// Free-form group label such as `"Control"` or `"50 µg/mL"`.
    #[display("{_0}")]
    Label(String),
}

impl From<u32> for Level {
    fn from(value: u32) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for Level {
    fn from(value: &str) -> Self {
        Self::Label(value.to_owned())
    }
}

/// Values of one response category, one per row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseColumn {
    pub name: String,
    pub values: Vec<f64>,
}

impl ResponseColumn {
    pub fn new<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum TableError {
    #[display("observation table has no rows")]
    NoRows,
    #[display("observation table has no response columns")]
    NoColumns,
    #[display("column '{column}' has {found} values, expected {expected}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
    #[display("column '{name}' is defined more than once")]
    DuplicateColumn { name: String },
    #[display("column '{column}' row {row} is not a finite number")]
    NonFinite { column: String, row: usize },
    #[display("no response column named '{name}'")]
    UnknownColumn { name: String },
    #[display("{_0}")]
    Fit(FitError),
}

impl From<FitError> for TableError {
    fn from(err: FitError) -> Self {
        Self::Fit(err)
    }
}

/// Observation table with a dose factor and response columns.
///
/// # Examples
///
/// ```
/// use flowstat_analysis::table::{Level, ObservationTable, ResponseColumn};
///
/// let table = ObservationTable::new(
///     "Dose",
///     [0, 50, 50].map(Level::Numeric),
///     vec![ResponseColumn::new("Live_Cells", [63.18, 24.47, 25.38])],
/// )
/// .unwrap();
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.category_names().collect::<Vec<_>>(), ["Live_Cells"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationTable {
    dose_column: String,
    doses: Vec<Level>,
    sample_ids: Option<Vec<String>>,
    columns: Vec<ResponseColumn>,
}

impl ObservationTable {
    /// Builds a table, rejecting shape mismatches, duplicate column names and
    /// non-finite values.
    pub fn new<I>(
        dose_column: impl Into<String>,
        doses: I,
        columns: Vec<ResponseColumn>,
    ) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = Level>,
    {
        let doses = doses.into_iter().collect::<Vec<_>>();
        if doses.is_empty() {
            return Err(TableError::NoRows);
        }
        if columns.is_empty() {
            return Err(TableError::NoColumns);
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
            if column.values.len() != doses.len() {
                return Err(TableError::ShapeMismatch {
                    column: column.name.clone(),
                    expected: doses.len(),
                    found: column.values.len(),
                });
            }
            if let Some(row) = column.values.iter().position(|v| !v.is_finite()) {
                return Err(TableError::NonFinite {
                    column: column.name.clone(),
                    row,
                });
            }
        }

        Ok(Self {
            dose_column: dose_column.into(),
            doses,
            sample_ids: None,
            columns,
        })
    }

    /// Attaches one sample identifier per row.
    pub fn with_sample_ids<I, S>(mut self, sample_ids: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sample_ids = sample_ids.into_iter().map(Into::into).collect::<Vec<_>>();
        if sample_ids.len() != self.doses.len() {
            return Err(TableError::ShapeMismatch {
                column: "Sample_ID".to_owned(),
                expected: self.doses.len(),
                found: sample_ids.len(),
            });
        }
        self.sample_ids = Some(sample_ids);
        Ok(self)
    }

    #[must_use]
    pub fn dose_column(&self) -> &str {
        &self.dose_column
    }

    #[must_use]
    pub fn doses(&self) -> &[Level] {
        &self.doses
    }

    #[must_use]
    pub fn sample_ids(&self) -> Option<&[String]> {
        self.sample_ids.as_deref()
    }

    /// Number of rows (replicates).
    #[must_use]
    pub fn len(&self) -> usize {
        self.doses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doses.is_empty()
    }

    #[must_use]
    pub fn columns(&self) -> &[ResponseColumn] {
        &self.columns
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Result<&ResponseColumn, TableError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| TableError::UnknownColumn {
                name: name.to_owned(),
            })
    }

    /// Partitions a response column by dose level, levels in sorted order.
    pub fn groups(&self, name: &str) -> Result<Groups<Level>, TableError> {
        let column = self.column(name)?;
        Ok(Groups::from_labeled(
            self.doses.iter().cloned(),
            column.values.iter().copied(),
        )?)
    }

    /// Dose levels in chart order.
    ///
    /// Numeric doses are sorted; labelled doses keep the order in which they
    /// first appear, so a `"Control"` row entered first stays first.
    #[must_use]
    pub fn display_levels(&self) -> Vec<Level> {
        let mut levels = Vec::<Level>::new();
        for dose in &self.doses {
            if !levels.contains(dose) {
                levels.push(dose.clone());
            }
        }
        if levels.iter().all(|l| matches!(l, Level::Numeric(_))) {
            levels.sort();
        }
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled_table() -> ObservationTable {
        ObservationTable::new(
            "Dose",
            ["Control", "50 µg/mL", "50 µg/mL", "100 µg/mL"].map(Level::from),
            vec![ResponseColumn::new("Live_Cells", [90.75, 33.32, 28.39, 28.52])],
        )
        .unwrap()
    }

    #[test]
    fn test_level_ordering() {
        let mut levels = vec![
            Level::from("Control"),
            Level::Numeric(200),
            Level::from("100 µg/mL"),
            Level::Numeric(50),
        ];
        levels.sort();
        assert_eq!(
            levels,
            [
                Level::Numeric(50),
                Level::Numeric(200),
                Level::from("100 µg/mL"),
                Level::from("Control"),
            ]
        );
        assert_eq!(Level::Numeric(50).to_string(), "50");
    }

    #[test]
    fn test_shape_mismatch() {
        let err = ObservationTable::new(
            "Dose",
            [0, 50].map(Level::Numeric),
            vec![ResponseColumn::new("Live_Cells", [1.0])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            TableError::ShapeMismatch {
                column: "Live_Cells".to_owned(),
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_rejects_duplicates_and_non_finite() {
        let err = ObservationTable::new(
            "Dose",
            [0].map(Level::Numeric),
            vec![
                ResponseColumn::new("A", [1.0]),
                ResponseColumn::new("A", [2.0]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn { .. }));

        let err = ObservationTable::new(
            "Dose",
            [0, 1].map(Level::Numeric),
            vec![ResponseColumn::new("A", [1.0, f64::NAN])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            TableError::NonFinite {
                column: "A".to_owned(),
                row: 1
            }
        );
    }

    #[test]
    fn test_groups_use_sorted_levels() {
        let table = labelled_table();
        let groups = table.groups("Live_Cells").unwrap();
        let labels = groups.iter().map(|g| g.label.to_string()).collect::<Vec<_>>();
        assert_eq!(labels, ["100 µg/mL", "50 µg/mL", "Control"]);
        assert!(matches!(
            table.groups("Dead_Cells"),
            Err(TableError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_display_levels() {
        let table = labelled_table();
        let labels = table
            .display_levels()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(labels, ["Control", "50 µg/mL", "100 µg/mL"]);

        let numeric = ObservationTable::new(
            "Dose",
            [100, 0, 50].map(Level::Numeric),
            vec![ResponseColumn::new("A", [1.0, 2.0, 3.0])],
        )
        .unwrap();
        assert_eq!(
            numeric.display_levels(),
            [Level::Numeric(0), Level::Numeric(50), Level::Numeric(100)]
        );
    }

    #[test]
    fn test_sample_ids_must_match_rows() {
        let table = labelled_table();
        assert!(table.clone().with_sample_ids(["a", "b"]).is_err());
        let table = table.with_sample_ids(["c", "50-1", "50-2", "100-1"]).unwrap();
        assert_eq!(table.sample_ids().unwrap()[1], "50-1");
    }
}
