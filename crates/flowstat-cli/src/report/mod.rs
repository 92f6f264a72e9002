//! Report artifacts: workbooks and charts written to an output directory.

use std::path::Path;

use anyhow::{Context, ensure};
use flowstat_analysis::{experiment::Experiment, report::ExperimentReport};

pub mod export;
pub mod plot;

/// Fails unless `dir` is an existing directory. The directory is never created.
pub fn ensure_output_dir(dir: &Path) -> anyhow::Result<()> {
    ensure!(
        dir.is_dir(),
        "Output directory does not exist: {}",
        dir.display()
    );
    Ok(())
}

/// Writes the two workbooks and three charts of `report` into `dir`,
/// replacing existing files. A status line is printed after each file.
pub fn write_artifacts(
    experiment: &Experiment,
    report: &ExperimentReport,
    dir: &Path,
) -> anyhow::Result<()> {
    ensure_output_dir(dir)?;
    let files = &experiment.files;

    let path = dir.join(files.anova);
    export::save(&export::anova_sheets(report), &path)?;
    println!("ANOVA results saved to {}", path.display());

    let path = dir.join(files.tukey);
    export::save(&[export::tukey_sheet(report)], &path)?;
    println!("Tukey's test results saved to {}", path.display());

    let path = dir.join(files.tukey_plot);
    plot::tukey::draw(&report.tukey, experiment.labels.tukey_title, &path)
        .with_context(|| format!("Failed to render Tukey plot: {}", path.display()))?;
    println!("Tukey HSD plot saved to {}", path.display());

    let path = dir.join(files.combined_plot);
    plot::bars::draw_combined(experiment, report, &path)
        .with_context(|| format!("Failed to render combined chart: {}", path.display()))?;
    println!("Combined visualization saved to {}", path.display());

    let path = dir.join(files.phase_plot);
    plot::bars::draw_phase_comparison(experiment, report, &path).with_context(|| {
        format!(
            "Failed to render phase comparison chart: {}",
            path.display()
        )
    })?;
    println!("Phase comparison visualization saved to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use flowstat_analysis::experiment;

    use super::*;

    #[test]
    fn test_ensure_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        ensure_output_dir(dir.path()).unwrap();

        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(ensure_output_dir(&file).is_err());

        let missing = dir.path().join("missing");
        let err = ensure_output_dir(&missing).unwrap_err();
        assert!(err.to_string().starts_with("Output directory does not exist"));
        assert!(!missing.exists());
    }

    #[test]
    fn test_missing_directory_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("out");
        let experiment = experiment::mcf7().unwrap();
        let report = ExperimentReport::compute(&experiment, 0.05).unwrap();

        assert!(write_artifacts(&experiment, &report, &missing).is_err());
        assert!(!missing.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
