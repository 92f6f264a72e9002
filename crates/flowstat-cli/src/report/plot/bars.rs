//! Bar chart grids: mean response per dose, optionally split by hue.

use std::{ops::Range, path::Path};

use flowstat_analysis::{
    experiment::Experiment,
    report::{Bar, CategoryBars, ExperimentReport},
    table::Level,
};
use plotters::{coord::Shift, prelude::*};

use super::{BAR_COLOR, FONT, PlotError, slot_label, viridis};

const COMBINED_SIZE: (u32, u32) = (1200, 1000);
const PHASE_SIZE: (u32, u32) = (1200, 800);
const SLOT_WIDTH: f64 = 0.8;
/// Scale applied to the tallest bar to get the top of the response axis.
const HEADROOM: f64 = 1.1;
/// Share of the plot height taken by the legend frame and by each legend row.
const LEGEND_FRAME_SHARE: f64 = 0.05;
const LEGEND_ROW_SHARE: f64 = 0.055;
const MAX_LEGEND_SHARE: f64 = 0.6;

/// Bar placed on a dose axis where dose `i` is centred at `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBar<'a> {
    pub bar: &'a Bar,
    pub center: f64,
    pub width: f64,
}

impl PlacedBar<'_> {
    #[must_use]
    pub fn left(&self) -> f64 {
        self.center - self.width / 2.0
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.center + self.width / 2.0
    }

    /// Top of the bar including its error bar.
    #[must_use]
    pub fn top(&self) -> f64 {
        self.bar.stats.mean + self.bar.error.unwrap_or(0.0)
    }
}

/// Places `bars` side by side within the slot of their dose level.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn place_bars<'a>(levels: &[Level], bars: &'a [Bar]) -> Vec<PlacedBar<'a>> {
    let mut placed = Vec::with_capacity(bars.len());
    for (slot, level) in levels.iter().enumerate() {
        let in_slot = bars.iter().filter(|b| b.dose == *level).collect::<Vec<_>>();
        let width = SLOT_WIDTH / in_slot.len().max(1) as f64;
        for (i, bar) in in_slot.into_iter().enumerate() {
            placed.push(PlacedBar {
                bar,
                center: slot as f64 - SLOT_WIDTH / 2.0 + width * (i as f64 + 0.5),
                width,
            });
        }
    }
    placed
}

/// Value range of the response axis, with head room above the tallest bar.
///
/// With `legend_entries > 0` the top of the axis is raised until the legend
/// box in the upper corner fits above every bar.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn value_range(placed: &[PlacedBar<'_>], legend_entries: usize) -> Range<f64> {
    let max = placed.iter().map(PlacedBar::top).fold(0.0, f64::max);
    let min = placed
        .iter()
        .map(|p| p.bar.stats.mean - p.bar.error.unwrap_or(0.0))
        .fold(0.0, f64::min);
    if max - min <= 0.0 {
        return 0.0..1.0;
    }

    let start = min * HEADROOM;
    let mut end = max * HEADROOM;
    if legend_entries > 0 {
        let share = (LEGEND_FRAME_SHARE + legend_entries as f64 * LEGEND_ROW_SHARE)
            .min(MAX_LEGEND_SHARE);
        end = end.max((max - share * start) / (1.0 - share));
    }
    start..end
}

fn bar_rectangle(placed: &PlacedBar<'_>, color: RGBColor) -> Rectangle<(f64, f64)> {
    Rectangle::new(
        [(placed.left(), 0.0), (placed.right(), placed.bar.stats.mean)],
        color.filled(),
    )
}

struct Panel<'a> {
    title: String,
    x_label: &'a str,
    y_label: &'a str,
    levels: &'a [Level],
    placed: Vec<PlacedBar<'a>>,
    /// Hue keys with their colours, in legend order; `None` draws plain bars.
    legend: Option<(&'a str, Vec<(String, RGBColor)>)>,
}

/// Mean response per dose with confidence error bars, one panel per category.
pub fn draw_combined(
    experiment: &Experiment,
    report: &ExperimentReport,
    path: &Path,
) -> Result<(), PlotError> {
    let levels = experiment.table.display_levels();
    let panels = report
        .bars
        .iter()
        .map(|category| Panel {
            title: category.category.replace('_', " "),
            x_label: experiment.labels.combined_x_label,
            y_label: "% of Cells",
            levels: &levels,
            placed: place_bars(&levels, &category.by_dose),
            legend: None,
        })
        .collect::<Vec<_>>();
    draw_grid(
        path,
        COMBINED_SIZE,
        Some(experiment.labels.combined_title),
        &panels,
    )
}

/// Response per dose split by the experiment's hue, one panel per category.
pub fn draw_phase_comparison(
    experiment: &Experiment,
    report: &ExperimentReport,
    path: &Path,
) -> Result<(), PlotError> {
    let levels = experiment.table.display_levels();
    let panels = report
        .bars
        .iter()
        .map(|category| Panel {
            title: format!("{} Response by Dose", category.category),
            x_label: experiment.labels.phase_x_label,
            y_label: "Percentage",
            levels: &levels,
            placed: place_bars(&levels, &category.by_hue),
            legend: Some((experiment.labels.legend_title, hue_colors(category))),
        })
        .collect::<Vec<_>>();
    draw_grid(path, PHASE_SIZE, None, &panels)
}

/// Distinct hue keys of a category in first-appearance order, coloured
/// along the viridis map.
#[must_use]
pub fn hue_colors(category: &CategoryBars) -> Vec<(String, RGBColor)> {
    let mut keys = Vec::<String>::new();
    for bar in &category.by_hue {
        if !keys.contains(&bar.hue) {
            keys.push(bar.hue.clone());
        }
    }
    let colors = viridis(keys.len());
    keys.into_iter().zip(colors).collect()
}

fn draw_grid(
    path: &Path,
    size: (u32, u32),
    title: Option<&str>,
    panels: &[Panel<'_>],
) -> Result<(), PlotError> {
    if panels.is_empty() {
        return Err(PlotError::InvalidData {
            message: "no response categories".to_owned(),
        });
    }

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| PlotError::drawing_area(&e))?;
    let area = match title {
        Some(title) => root
            .titled(title, (FONT, 30))
            .map_err(|e| PlotError::drawing_area(&e))?,
        None => root.clone(),
    };

    let rows = panels.len().div_ceil(2);
    let cells = area.split_evenly((rows, 2));
    for (panel, cell) in panels.iter().zip(&cells) {
        draw_panel(cell, panel)?;
    }

    root.present().map_err(|e| PlotError::drawing(&e))?;
    log::debug!("rendered {} panels to {}", panels.len(), path.display());
    Ok(())
}

fn draw_panel<DB>(area: &DrawingArea<DB, Shift>, panel: &Panel<'_>) -> Result<(), PlotError>
where
    DB: DrawingBackend,
{
    let slots = panel.levels.len();
    let labels = panel
        .levels
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    #[expect(clippy::cast_precision_loss)]
    let x_range = -0.5..(slots as f64 - 0.5);
    let legend_entries = panel.legend.as_ref().map_or(0, |(_, colors)| colors.len());

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, value_range(&panel.placed, legend_entries))
        .map_err(|e| PlotError::chart_config(&e))?;

    let formatter = |x: &f64| slot_label(&labels, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_label_formatter(&formatter)
        .x_desc(panel.x_label)
        .y_desc(panel.y_label)
        .label_style((FONT, 14))
        .draw()
        .map_err(|e| PlotError::drawing(&e))?;

    match &panel.legend {
        None => {
            chart
                .draw_series(panel.placed.iter().map(|p| bar_rectangle(p, BAR_COLOR)))
                .map_err(|e| PlotError::drawing(&e))?;
        }
        Some((legend_title, colors)) => {
            for (key, color) in colors {
                let color = *color;
                chart
                    .draw_series(
                        panel
                            .placed
                            .iter()
                            .filter(|p| p.bar.hue == *key)
                            .map(|p| bar_rectangle(p, color)),
                    )
                    .map_err(|e| PlotError::drawing(&e))?
                    .label(format!("{legend_title}: {key}"))
                    .legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                    });
            }
        }
    }

    chart
        .draw_series(panel.placed.iter().filter_map(|p| {
            let error = p.bar.error?;
            let mean = p.bar.stats.mean;
            Some(ErrorBar::new_vertical(
                p.center,
                mean - error,
                mean,
                mean + error,
                BLACK.stroke_width(2),
                8,
            ))
        }))
        .map_err(|e| PlotError::drawing(&e))?;

    if panel.legend.is_some() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT, 12))
            .draw()
            .map_err(|e| PlotError::drawing(&e))?;
    }

    Ok(())
}
