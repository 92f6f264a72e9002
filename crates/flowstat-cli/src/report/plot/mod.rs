//! PNG rendering with the `plotters` bitmap backend.

use std::fmt::Display;

use plotters::style::RGBColor;

pub mod bars;
pub mod tukey;

const FONT: &str = "sans-serif";

/// Fill colour of bars that are not split by hue.
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Viridis colour map sampled at nine evenly spaced stops.
const VIRIDIS: [RGBColor; 9] = [
    RGBColor(68, 1, 84),
    RGBColor(71, 45, 123),
    RGBColor(59, 82, 139),
    RGBColor(44, 114, 142),
    RGBColor(33, 145, 140),
    RGBColor(40, 174, 128),
    RGBColor(94, 201, 98),
    RGBColor(173, 220, 48),
    RGBColor(253, 231, 37),
];

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PlotError {
    #[display("failed to prepare drawing area: {message}")]
    DrawingArea { message: String },
    #[display("failed to configure chart: {message}")]
    ChartConfig { message: String },
    #[display("failed to draw chart elements: {message}")]
    Drawing { message: String },
    #[display("nothing to plot: {message}")]
    InvalidData { message: String },
}

impl PlotError {
    fn drawing_area(err: &impl Display) -> Self {
        Self::DrawingArea {
            message: err.to_string(),
        }
    }

    fn chart_config(err: &impl Display) -> Self {
        Self::ChartConfig {
            message: err.to_string(),
        }
    }

    fn drawing(err: &impl Display) -> Self {
        Self::Drawing {
            message: err.to_string(),
        }
    }
}

/// `n` colours of the viridis map, skipping both extremes.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn viridis(n: usize) -> Vec<RGBColor> {
    let segments = (VIRIDIS.len() - 1) as f64;
    (1..=n)
        .map(|i| {
            let t = i as f64 / (n + 1) as f64 * segments;
            let lower = t.floor();
            #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let index = (lower as usize).min(VIRIDIS.len() - 2);
            let frac = t - index as f64;
            let (a, b) = (VIRIDIS[index], VIRIDIS[index + 1]);
            RGBColor(lerp(a.0, b.0, frac), lerp(a.1, b.1, frac), lerp(a.2, b.2, frac))
        })
        .collect()
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (f64::from(a) + (f64::from(b) - f64::from(a)) * t)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Maps an axis position to the label of the slot centred on it.
fn slot_label(labels: &[String], position: f64) -> String {
    let rounded = position.round();
    if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = rounded as usize;
    labels.get(index).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viridis_spans_the_map() {
        let colors = viridis(7);
        assert_eq!(colors.len(), 7);
        assert_eq!(colors[3], VIRIDIS[4]);
        assert_ne!(colors[0], VIRIDIS[0]);
        assert_ne!(colors[6], VIRIDIS[8]);
        assert!(viridis(0).is_empty());
        assert_eq!(viridis(1), [VIRIDIS[4]]);
    }

    #[test]
    fn test_slot_label() {
        let labels = ["Control".to_owned(), "50 µg/mL".to_owned()];
        assert_eq!(slot_label(&labels, 0.0), "Control");
        assert_eq!(slot_label(&labels, 1.000_000_1), "50 µg/mL");
        assert_eq!(slot_label(&labels, 0.5), "");
        assert_eq!(slot_label(&labels, -1.0), "");
        assert_eq!(slot_label(&labels, 2.0), "");
    }
}
