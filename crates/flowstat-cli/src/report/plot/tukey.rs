//! Simultaneous confidence-interval chart of a Tukey HSD test.

use std::{ops::Range, path::Path};

use flowstat_analysis::table::Level;
use flowstat_stats::tukey::{GroupInterval, TukeyHsd};
use plotters::prelude::*;

use super::{FONT, PlotError, slot_label};

const SIZE: (u32, u32) = (1000, 800);

/// Horizontal range covering every interval plus a 5% margin on each side.
#[must_use]
pub fn interval_range(groups: &[GroupInterval<Level>]) -> Range<f64> {
    let lower = groups
        .iter()
        .map(GroupInterval::lower)
        .fold(f64::INFINITY, f64::min);
    let upper = groups
        .iter()
        .map(GroupInterval::upper)
        .fold(f64::NEG_INFINITY, f64::max);
    if !(lower.is_finite() && upper.is_finite()) {
        return 0.0..1.0;
    }
    let margin = ((upper - lower) * 0.05).max(f64::EPSILON);
    lower - margin..upper + margin
}

/// Draws one horizontal interval `mean ± half-width` per group, the first
/// group at the bottom.
pub fn draw(tukey: &TukeyHsd<Level>, title: &str, path: &Path) -> Result<(), PlotError> {
    let groups = &tukey.groups;
    if groups.is_empty() {
        return Err(PlotError::InvalidData {
            message: "Tukey test has no groups".to_owned(),
        });
    }
    let labels = groups
        .iter()
        .map(|g| g.label.to_string())
        .collect::<Vec<_>>();

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| PlotError::drawing_area(&e))?;

    #[expect(clippy::cast_precision_loss)]
    let y_range = -1.0..groups.len() as f64;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(120)
        .build_cartesian_2d(interval_range(groups), y_range)
        .map_err(|e| PlotError::chart_config(&e))?;

    let formatter = |y: &f64| slot_label(&labels, *y);
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(groups.len() + 2)
        .y_label_formatter(&formatter)
        .label_style((FONT, 16))
        .draw()
        .map_err(|e| PlotError::drawing(&e))?;

    #[expect(clippy::cast_precision_loss)]
    let position = |i: usize| i as f64;
    chart
        .draw_series(groups.iter().enumerate().map(|(i, g)| {
            ErrorBar::new_horizontal(
                position(i),
                g.lower(),
                g.mean,
                g.upper(),
                BLACK.stroke_width(2),
                10,
            )
        }))
        .map_err(|e| PlotError::drawing(&e))?;
    chart
        .draw_series(
            groups
                .iter()
                .enumerate()
                .map(|(i, g)| Circle::new((g.mean, position(i)), 5, BLACK.filled())),
        )
        .map_err(|e| PlotError::drawing(&e))?;

    root.present().map_err(|e| PlotError::drawing(&e))?;
    log::debug!("rendered Tukey intervals to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use flowstat_analysis::{experiment, report::ExperimentReport};

    use super::*;

    #[test]
    fn test_interval_range_has_margins() {
        let experiment = experiment::mcf7().unwrap();
        let report = ExperimentReport::compute(&experiment, 0.05).unwrap();
        let groups = &report.tukey.groups;
        let range = interval_range(groups);

        for g in groups {
            assert!(range.start < g.lower());
            assert!(range.end > g.upper());
        }
        let span = range.end - range.start;
        let lowest = groups.iter().map(GroupInterval::lower).fold(f64::INFINITY, f64::min);
        assert_abs_diff_eq!(lowest - range.start, span / 1.1 * 0.05, epsilon = 1e-9);
    }

    #[test]
    fn test_interval_range_without_groups() {
        assert_eq!(interval_range(&[]), 0.0..1.0);
    }
}
