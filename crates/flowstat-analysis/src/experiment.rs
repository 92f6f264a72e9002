//! Built-in flow-cytometry experiments.
//!
//! Each experiment bundles its observation table with the labels and file
//! names used when the report is rendered.

use serde::Serialize;

use crate::table::{Level, ObservationTable, ResponseColumn, TableError};

/// Variable that splits the bars of the per-sample chart grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Hue {
    /// One bar per dose level.
    Dose,
    /// One bar per sample identifier.
    SampleId,
}

/// Titles and axis labels of the rendered charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartLabels {
    pub tukey_title: &'static str,
    pub combined_title: &'static str,
    pub combined_x_label: &'static str,
    pub phase_x_label: &'static str,
    pub legend_title: &'static str,
}

/// File names of the report artifacts, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFiles {
    pub anova: &'static str,
    pub tukey: &'static str,
    pub tukey_plot: &'static str,
    pub combined_plot: &'static str,
    pub phase_plot: &'static str,
}

impl OutputFiles {
    /// All artifact names, in the order they are produced.
    #[must_use]
    pub fn all(&self) -> [&'static str; 5] {
        [
            self.anova,
            self.tukey,
            self.tukey_plot,
            self.combined_plot,
            self.phase_plot,
        ]
    }
}

/// A dataset together with everything needed to report on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experiment {
    /// Short identifier used on the command line.
    pub id: &'static str,
    pub cell_line: &'static str,
    pub table: ObservationTable,
    /// Response category analysed with Tukey's HSD test.
    pub tukey_category: &'static str,
    pub hue: Hue,
    pub labels: ChartLabels,
    pub files: OutputFiles,
}

/// All built-in experiments.
pub fn builtin() -> Result<Vec<Experiment>, TableError> {
    Ok(vec![mcf7()?, mda_mb_231()?])
}

/// Looks up a built-in experiment by identifier (case-insensitive).
pub fn find(id: &str) -> Result<Option<Experiment>, TableError> {
    Ok(builtin()?
        .into_iter()
        .find(|e| e.id.eq_ignore_ascii_case(id)))
}

/// MCF-7 breast adenocarcinoma line, numeric doses.
pub fn mcf7() -> Result<Experiment, TableError> {
    let table = ObservationTable::new(
        "Dose",
        [0, 50, 50, 100, 100, 200, 200].map(Level::Numeric),
        vec![
            ResponseColumn::new(
                "Live_Cells",
                [63.18, 24.47, 25.38, 21.69, 19.81, 14.34, 12.34],
            ),
            ResponseColumn::new(
                "Early_Apoptotic_Cells",
                [0.66, 34.69, 26.15, 23.31, 17.46, 15.01, 17.65],
            ),
            ResponseColumn::new(
                "Late_Apoptotic_Necrotic_Cells",
                [0.70, 17.87, 19.15, 24.74, 34.00, 31.20, 33.47],
            ),
            ResponseColumn::new(
                "Necrotic_Cells",
                [3.50, 6.04, 8.31, 11.40, 14.03, 20.07, 18.41],
            ),
        ],
    )?;

    Ok(Experiment {
        id: "mcf7",
        cell_line: "MCF-7",
        table,
        tukey_category: "Live_Cells",
        hue: Hue::Dose,
        labels: ChartLabels {
            tukey_title: "MCF-7 Tukey HSD Test Results",
            combined_title: "Treatment Response Across Cell Types for MCF-7",
            combined_x_label: "Dose (µg/mL)",
            phase_x_label: "Dose (µg/mL)",
            legend_title: "Dose",
        },
        files: OutputFiles {
            anova: "ANOVA_Results_MCF7.xlsx",
            tukey: "MCF7_Tukeys_HSD_Results.xlsx",
            tukey_plot: "MCF7_Tukey_HSD_Plot.png",
            combined_plot: "Combined_Visualization_MCF7.png",
            phase_plot: "Phase_Comparison_Visualization_MCF7.png",
        },
    })
}

/// MDA-MB-231 triple-negative breast cancer line, labelled doses with one
/// sample identifier per replicate.
pub fn mda_mb_231() -> Result<Experiment, TableError> {
    let table = ObservationTable::new(
        "Dose",
        [
            "Control",
            "50 µg/mL",
            "50 µg/mL",
            "100 µg/mL",
            "100 µg/mL",
            "200 µg/mL",
            "200 µg/mL",
        ]
        .map(Level::from),
        vec![
            ResponseColumn::new(
                "Live_Cells",
                [90.75, 33.32, 28.39, 28.52, 28.57, 25.63, 24.01],
            ),
            ResponseColumn::new(
                "Early_Apoptotic",
                [8.02, 14.02, 21.77, 21.96, 25.33, 26.93, 25.54],
            ),
            ResponseColumn::new(
                "Late_Apoptotic_Necrotic",
                [0.12, 43.25, 43.88, 45.50, 42.11, 45.20, 46.43],
            ),
            ResponseColumn::new("Necrotic", [1.10, 9.41, 5.95, 4.02, 3.99, 2.24, 4.02]),
        ],
    )?
    .with_sample_ids(["Control", "50-1", "50-2", "100-1", "100-2", "200-1", "200-2"])?;

    Ok(Experiment {
        id: "mda-mb-231",
        cell_line: "MDA-MB-231",
        table,
        tukey_category: "Live_Cells",
        hue: Hue::SampleId,
        labels: ChartLabels {
            tukey_title: "MDA-MB-231 Tukey HSD Test Results",
            combined_title: "Treatment Response Across Cell Types",
            combined_x_label: "Dose µg/mL",
            phase_x_label: "Dose",
            legend_title: "Sample ID",
        },
        files: OutputFiles {
            anova: "ANOVA_Results.xlsx",
            tukey: "MDA_MB231_Tukeys_HSD_Results.xlsx",
            tukey_plot: "MDA_MB231_Tukey_HSD_Plot.png",
            combined_plot: "Combined_Visualization.png",
            phase_plot: "Phase_Comparison_Visualization.png",
        },
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_builtin_experiments_are_well_formed() {
        let experiments = builtin().unwrap();
        assert_eq!(experiments.len(), 2);
        for experiment in &experiments {
            assert_eq!(experiment.table.len(), 7);
            assert_eq!(experiment.table.columns().len(), 4);
            assert!(experiment.table.column(experiment.tukey_category).is_ok());
        }
    }

    #[test]
    fn test_output_files_do_not_collide() {
        let experiments = builtin().unwrap();
        let names = experiments
            .iter()
            .flat_map(|e| e.files.all())
            .collect::<HashSet<_>>();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("MCF7").unwrap().unwrap().cell_line, "MCF-7");
        assert!(find("hela").unwrap().is_none());
    }
}
