//! Console tables of the computed statistics.

use anyhow::Context;
use flowstat_analysis::{
    report::{CategoryAnova, ExperimentReport},
    table::Level,
};
use flowstat_stats::tukey::PairwiseComparison;

use super::SelectionArg;

pub(crate) fn run(arg: &SelectionArg) -> anyhow::Result<()> {
    for experiment in arg.experiments()? {
        let report = ExperimentReport::compute(&experiment, arg.alpha)
            .with_context(|| format!("Failed to analyze experiment {}", experiment.id))?;

        let heading = format!("{} ({})", report.cell_line, report.experiment_id);
        println!("{heading}");
        println!("{}\n", "=".repeat(heading.chars().count()));

        println!("One-way ANOVA by {}", report.dose_column);
        print_anova_table(&report.anova);
        println!();

        println!(
            "Tukey HSD on {} (alpha={}, q_crit={:.4}, MSE={:.4}, df={})",
            report.tukey_category,
            report.tukey.alpha,
            report.tukey.q_crit,
            report.tukey.mse,
            report.tukey.df_resid
        );
        print_tukey_table(&report.tukey.comparisons);
        println!();
    }
    Ok(())
}

fn format_value(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.precision$}"),
        Some(_) => "NaN".to_string(),
        None => "-".to_string(),
    }
}

fn print_anova_table(rows: &[CategoryAnova]) {
    println!(
        "  {:<32} {:>12} {:>4} {:>12} {:>4} {:>12} {:>12}",
        "Category", "SS(between)", "df", "SS(within)", "df", "F", "PR(>F)",
    );
    println!("  {}", "-".repeat(96));
    for row in rows {
        let anova = &row.anova;
        println!(
            "  {:<32} {:>12.4} {:>4} {:>12.4} {:>4} {:>12} {:>12}",
            row.category,
            anova.factor.sum_sq,
            anova.factor.df,
            anova.residual.sum_sq,
            anova.residual.df,
            format_value(anova.factor.f_value, 4),
            format_p_value(anova.factor.p_value),
        );
    }
}

fn format_p_value(p: Option<f64>) -> String {
    match p {
        Some(p) if p.is_finite() && p < 1e-4 => format!("{p:.3e}"),
        other => format_value(other, 4),
    }
}

fn print_tukey_table(comparisons: &[PairwiseComparison<Level>]) {
    println!(
        "  {:<12} {:<12} {:>10} {:>8} {:>10} {:>10} {:>7}",
        "group1", "group2", "meandiff", "p-adj", "lower", "upper", "reject",
    );
    println!("  {}", "-".repeat(75));
    for c in comparisons {
        println!(
            "  {:<12} {:<12} {:>10.4} {:>8.4} {:>10.4} {:>10.4} {:>7}",
            c.group1.to_string(),
            c.group2.to_string(),
            c.mean_diff,
            c.p_adj,
            c.lower,
            c.upper,
            c.reject,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(1.234_56), 2), "1.23");
        assert_eq!(format_value(Some(f64::NAN), 2), "NaN");
        assert_eq!(format_value(None, 2), "-");
        assert_eq!(format_p_value(Some(1.5e-6)), "1.500e-6");
        assert_eq!(format_p_value(Some(0.25)), "0.2500");
    }
}
