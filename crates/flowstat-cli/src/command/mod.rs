use clap::{ArgAction, Args, Parser, Subcommand};
use flowstat_analysis::experiment::{self, Experiment};
use flowstat_stats::tukey::DEFAULT_ALPHA;
use log::LevelFilter;

use self::report::ReportArg;

mod list;
mod report;
mod show;

/// Selects every built-in experiment.
const ALL_EXPERIMENTS: &str = "all";

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run ANOVA and Tukey HSD, write workbooks and charts
    Report(#[clap(flatten)] ReportArg),
    /// Print ANOVA and Tukey HSD tables without writing files
    Show(#[clap(flatten)] SelectionArg),
    /// List built-in experiments
    List,
}

/// Experiment selection and significance level shared by subcommands.
#[derive(Debug, Clone, Args)]
pub(crate) struct SelectionArg {
    /// Experiment identifier, or `all` for every built-in experiment
    #[arg(long, default_value = ALL_EXPERIMENTS)]
    pub experiment: String,

    /// Significance level of the Tukey HSD test
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: f64,
}

impl Default for SelectionArg {
    fn default() -> Self {
        Self {
            experiment: ALL_EXPERIMENTS.to_owned(),
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl SelectionArg {
    pub(crate) fn experiments(&self) -> anyhow::Result<Vec<Experiment>> {
        if self.experiment.eq_ignore_ascii_case(ALL_EXPERIMENTS) {
            return Ok(experiment::builtin()?);
        }
        if let Some(experiment) = experiment::find(&self.experiment)? {
            return Ok(vec![experiment]);
        }
        let known = experiment::builtin()?
            .iter()
            .map(|e| e.id)
            .collect::<Vec<_>>()
            .join(", ");
        anyhow::bail!(
            "Experiment {} not found (available: {known})",
            self.experiment
        )
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logger(args.verbose);
    match args.mode.unwrap_or(Mode::Report(ReportArg::default())) {
        Mode::Report(arg) => report::run(&arg)?,
        Mode::Show(arg) => show::run(&arg)?,
        Mode::List => list::run()?,
    }
    Ok(())
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_report_is_the_default_mode() {
        let args = CommandArgs::try_parse_from(["flowstat"]).unwrap();
        assert!(args.mode.is_none());
        assert_eq!(args.verbose, 0);

        let args = CommandArgs::try_parse_from(["flowstat", "-vv", "report", "--alpha", "0.01"])
            .unwrap();
        assert_eq!(args.verbose, 2);
        let Some(Mode::Report(arg)) = args.mode else {
            panic!("expected the report mode");
        };
        assert_eq!(arg.selection.experiment, "all");
        assert!((arg.selection.alpha - 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn test_experiment_selection() {
        let all = SelectionArg::default().experiments().unwrap();
        assert_eq!(all.len(), 2);

        let one = SelectionArg {
            experiment: "MDA-MB-231".to_owned(),
            ..SelectionArg::default()
        };
        assert_eq!(one.experiments().unwrap()[0].id, "mda-mb-231");

        let unknown = SelectionArg {
            experiment: "hela".to_owned(),
            ..SelectionArg::default()
        };
        let err = unknown.experiments().unwrap_err();
        assert!(err.to_string().contains("mcf7, mda-mb-231"));
    }
}
