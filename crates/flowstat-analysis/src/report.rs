//! Report assembly for one experiment.
//!
//! Runs the ANOVA for every response category, Tukey's HSD test for the
//! experiment's designated category, and summarizes the values behind each
//! bar of the two chart grids. Nothing here touches the filesystem.

use flowstat_stats::{
    FitError, anova::OneWayAnova, descriptive::DescriptiveStats, tukey::TukeyHsd,
};
use serde::Serialize;

use crate::{
    experiment::{Experiment, Hue},
    table::{Level, ObservationTable, TableError},
};

/// Confidence level of the error bars drawn on bar charts.
pub const BAR_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ReportError {
    #[display("invalid observation table: {_0}")]
    Table(TableError),
    #[display("cannot analyze category '{category}'")]
    Fit { category: String, source: FitError },
}

impl From<TableError> for ReportError {
    fn from(err: TableError) -> Self {
        Self::Table(err)
    }
}

/// ANOVA table of one response category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAnova {
    pub category: String,
    pub anova: OneWayAnova,
}

/// Values behind a single bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub dose: Level,
    /// Hue key of the bar (the dose label itself when bars are split by dose).
    pub hue: String,
    pub stats: DescriptiveStats,
    /// Half-width of the [`BAR_CONFIDENCE`] interval, when it can be estimated.
    pub error: Option<f64>,
}

impl Bar {
    fn new(dose: Level, hue: String, values: &[f64]) -> Option<Self> {
        let stats = DescriptiveStats::new(values.iter().copied())?;
        let error = stats.confidence_half_width(BAR_CONFIDENCE);
        Some(Self {
            dose,
            hue,
            stats,
            error,
        })
    }
}

/// Bars of one response category for both chart grids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBars {
    pub category: String,
    /// One bar per dose level, in display order.
    pub by_dose: Vec<Bar>,
    /// Bars split by the experiment's hue, grouped by dose in display order.
    pub by_hue: Vec<Bar>,
}

impl CategoryBars {
    /// Summarizes `category` of `table`, splitting the second grid by `hue`.
    pub fn collect(
        table: &ObservationTable,
        category: &str,
        hue: Hue,
    ) -> Result<Self, TableError> {
        let column = table.column(category)?;
        let levels = table.display_levels();

        let by_dose = levels
            .iter()
            .filter_map(|level| {
                let values = rows_where(table, |row| table.doses()[row] == *level)
                    .map(|row| column.values[row])
                    .collect::<Vec<_>>();
                Bar::new(level.clone(), level.to_string(), &values)
            })
            .collect::<Vec<_>>();

        let by_hue = match (hue, table.sample_ids()) {
            (Hue::SampleId, Some(sample_ids)) => levels
                .iter()
                .flat_map(|level| {
                    rows_where(table, |row| table.doses()[row] == *level)
                        .filter_map(|row| {
                            Bar::new(
                                level.clone(),
                                sample_ids[row].clone(),
                                &[column.values[row]],
                            )
                        })
                        .collect::<Vec<_>>()
                })
                .collect(),
            _ => by_dose.clone(),
        };

        Ok(Self {
            category: category.to_owned(),
            by_dose,
            by_hue,
        })
    }
}

fn rows_where<F>(table: &ObservationTable, mut pred: F) -> impl Iterator<Item = usize>
where
    F: FnMut(usize) -> bool,
{
    (0..table.len()).filter(move |&row| pred(row))
}

/// Every statistic needed to export and plot one experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentReport {
    pub experiment_id: String,
    pub cell_line: String,
    pub dose_column: String,
    /// One ANOVA per response category, in column order.
    pub anova: Vec<CategoryAnova>,
    pub tukey_category: String,
    pub tukey: TukeyHsd<Level>,
    /// One entry per response category, in column order.
    pub bars: Vec<CategoryBars>,
}

impl ExperimentReport {
    /// Computes the full report of `experiment` at significance level `alpha`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flowstat_analysis::{experiment, report::ExperimentReport};
    ///
    /// let experiment = experiment::mcf7().unwrap();
    /// let report = ExperimentReport::compute(&experiment, 0.05).unwrap();
    /// assert_eq!(report.anova.len(), 4);
    /// assert_eq!(report.tukey.comparisons.len(), 6);
    /// ```
    pub fn compute(experiment: &Experiment, alpha: f64) -> Result<Self, ReportError> {
        let table = &experiment.table;

        let anova = table
            .category_names()
            .map(|category| -> Result<CategoryAnova, ReportError> {
                let anova = fit_category(table, category, OneWayAnova::fit)?;
                log::debug!(
                    "{}: ANOVA {category}: F={:.4}, p={:.4e}",
                    experiment.id,
                    anova.f_value(),
                    anova.p_value()
                );
                Ok(CategoryAnova {
                    category: category.to_owned(),
                    anova,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tukey = fit_category(table, experiment.tukey_category, |groups| {
            TukeyHsd::fit(groups, alpha)
        })?;
        log::debug!(
            "{}: Tukey HSD on {}: q_crit={:.4}, {} of {} pairs significant",
            experiment.id,
            experiment.tukey_category,
            tukey.q_crit,
            tukey.significant_count(),
            tukey.comparisons.len()
        );

        let bars = table
            .category_names()
            .map(|category| CategoryBars::collect(table, category, experiment.hue))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            experiment_id: experiment.id.to_owned(),
            cell_line: experiment.cell_line.to_owned(),
            dose_column: table.dose_column().to_owned(),
            anova,
            tukey_category: experiment.tukey_category.to_owned(),
            tukey,
            bars,
        })
    }
}

fn fit_category<T, F>(table: &ObservationTable, category: &str, fit: F) -> Result<T, ReportError>
where
    F: FnOnce(&flowstat_stats::group::Groups<Level>) -> Result<T, FitError>,
{
    let groups = table.groups(category)?;
    fit(&groups).map_err(|source| ReportError::Fit {
        category: category.to_owned(),
        source,
    })
}
