use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use flowstat_analysis::report::ExperimentReport;

use super::SelectionArg;
use crate::{report, util::Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct ReportArg {
    #[clap(flatten)]
    pub selection: SelectionArg,

    /// Existing directory that receives workbooks and charts
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Also write every computed result as JSON to this path (`-` for stdout)
    #[arg(long)]
    pub summary_json: Option<PathBuf>,
}

impl Default for ReportArg {
    fn default() -> Self {
        Self {
            selection: SelectionArg::default(),
            output_dir: PathBuf::from("."),
            summary_json: None,
        }
    }
}

pub(crate) fn run(arg: &ReportArg) -> anyhow::Result<()> {
    report::ensure_output_dir(&arg.output_dir)?;
    let experiments = arg.selection.experiments()?;

    let mut reports = Vec::with_capacity(experiments.len());
    for experiment in &experiments {
        log::info!(
            "analyzing {} ({} replicates, {} categories)",
            experiment.cell_line,
            experiment.table.len(),
            experiment.table.columns().len()
        );
        let report = ExperimentReport::compute(experiment, arg.selection.alpha)
            .with_context(|| format!("Failed to analyze experiment {}", experiment.id))?;
        report::write_artifacts(experiment, &report, &arg.output_dir)?;
        reports.push(report);
    }

    if let Some(path) = &arg.summary_json {
        let shown = Output::save_json(&reports, path)?;
        log::info!("summary written to {shown}");
    }

    Ok(())
}
