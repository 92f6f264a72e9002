//! Spreadsheet export.
//!
//! Worksheets are assembled as plain [`Sheet`] values first and only then
//! written out with `rust_xlsxwriter`.

use std::{fs, path::Path};

use anyhow::Context;
use flowstat_analysis::{report::ExperimentReport, table::Level};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Workbook, XlsxError};

const ANOVA_HEADER: [&str; 5] = ["", "sum_sq", "df", "F", "PR(>F)"];
const TUKEY_HEADER: [&str; 7] = [
    "group1", "group2", "meandiff", "p-adj", "lower", "upper", "reject",
];
const TUKEY_SHEET_NAME: &str = "Sheet1";
const TUKEY_DECIMALS: i32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Non-finite numbers become empty cells.
    fn number(value: f64) -> Self {
        if value.is_finite() {
            Self::Number(value)
        } else {
            Self::Empty
        }
    }

    fn rounded(value: f64) -> Self {
        let scale = 10f64.powi(TUKEY_DECIMALS);
        Self::number((value * scale).round() / scale)
    }

    fn level(level: &Level) -> Self {
        match level {
            Level::Numeric(dose) => Self::Number(f64::from(*dose)),
            Level::Label(label) => Self::text(label.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn new<S>(name: impl Into<String>, header: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            rows: vec![header.iter().map(|h| Cell::text(h.as_ref())).collect()],
        }
    }
}

/// One worksheet per response category, named after the category.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn anova_sheets(report: &ExperimentReport) -> Vec<Sheet> {
    report
        .anova
        .iter()
        .map(|entry| {
            let anova = &entry.anova;
            let mut sheet = Sheet::new(entry.category.as_str(), &ANOVA_HEADER);
            let factor = format!("C({})", report.dose_column);
            for (name, row) in [(factor.as_str(), &anova.factor), ("Residual", &anova.residual)] {
                sheet.rows.push(vec![
                    Cell::text(name),
                    Cell::number(row.sum_sq),
                    Cell::number(row.df as f64),
                    row.f_value.map_or(Cell::Empty, Cell::number),
                    row.p_value.map_or(Cell::Empty, Cell::number),
                ]);
            }
            sheet
        })
        .collect()
}

/// Single worksheet listing every pairwise comparison.
#[must_use]
pub fn tukey_sheet(report: &ExperimentReport) -> Sheet {
    let mut sheet = Sheet::new(TUKEY_SHEET_NAME, &TUKEY_HEADER);
    for c in &report.tukey.comparisons {
        sheet.rows.push(vec![
            Cell::level(&c.group1),
            Cell::level(&c.group2),
            Cell::rounded(c.mean_diff),
            Cell::rounded(c.p_adj),
            Cell::rounded(c.lower),
            Cell::rounded(c.upper),
            Cell::Bool(c.reject),
        ]);
    }
    sheet
}

fn build_workbook(sheets: &[Sheet]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    // Pinned so that re-running produces identical files.
    let created = ExcelDateTime::from_ymd(2024, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        for (row, cells) in (0u32..).zip(&sheet.rows) {
            for (col, cell) in (0u16..).zip(cells) {
                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) => {
                        worksheet.write_string(row, col, text)?;
                    }
                    Cell::Number(value) => {
                        worksheet.write_number(row, col, *value)?;
                    }
                    Cell::Bool(value) => {
                        worksheet.write_boolean(row, col, *value)?;
                    }
                }
            }
        }
    }
    Ok(workbook)
}

/// Serializes `sheets` into xlsx bytes.
pub fn to_buffer(sheets: &[Sheet]) -> Result<Vec<u8>, XlsxError> {
    build_workbook(sheets)?.save_to_buffer()
}

/// Writes `sheets` to `path`, replacing any existing file.
///
/// The parent directory must already exist.
pub fn save(sheets: &[Sheet], path: &Path) -> anyhow::Result<()> {
    let bytes = to_buffer(sheets)
        .with_context(|| format!("Failed to build workbook for {}", path.display()))?;
    fs::write(path, bytes)
        .with_context(|| format!("Failed to save workbook: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use flowstat_analysis::experiment;

    use super::*;

    fn mcf7_report() -> ExperimentReport {
        ExperimentReport::compute(&experiment::mcf7().unwrap(), 0.05).unwrap()
    }

    #[test]
    fn test_anova_sheets_layout() {
        let sheets = anova_sheets(&mcf7_report());
        assert_eq!(sheets.len(), 4);
        assert_eq!(sheets[0].name, "Live_Cells");

        let sheet = &sheets[0];
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[0][4], Cell::text("PR(>F)"));
        assert_eq!(sheet.rows[1][0], Cell::text("C(Dose)"));
        assert_eq!(sheet.rows[1][2], Cell::Number(3.0));
        assert!(matches!(sheet.rows[1][3], Cell::Number(f) if f > 100.0));
        assert_eq!(sheet.rows[2][0], Cell::text("Residual"));
        assert_eq!(sheet.rows[2][2], Cell::Number(3.0));
        assert_eq!(sheet.rows[2][3], Cell::Empty);
        assert_eq!(sheet.rows[2][4], Cell::Empty);
    }

    #[test]
    fn test_tukey_sheet_rounds_and_types_levels() {
        let sheet = tukey_sheet(&mcf7_report());
        assert_eq!(sheet.name, "Sheet1");
        assert_eq!(sheet.rows.len(), 7);
        assert_eq!(sheet.rows[1][0], Cell::Number(0.0));
        assert_eq!(sheet.rows[1][1], Cell::Number(50.0));
        assert_eq!(sheet.rows[1][6], Cell::Bool(true));
        for row in &sheet.rows[1..] {
            for cell in &row[2..6] {
                let Cell::Number(value) = cell else {
                    panic!("expected a number, got {cell:?}");
                };
                let scaled = value * 1e4;
                assert!((scaled - scaled.round()).abs() < 1e-6);
            }
        }

        let mda = ExperimentReport::compute(&experiment::mda_mb_231().unwrap(), 0.05).unwrap();
        let sheet = tukey_sheet(&mda);
        assert_eq!(sheet.rows[1][0], Cell::text("100 µg/mL"));
    }

    #[test]
    fn test_non_finite_numbers_are_empty() {
        assert_eq!(Cell::number(f64::NAN), Cell::Empty);
        assert_eq!(Cell::number(f64::INFINITY), Cell::Empty);
        assert_eq!(Cell::rounded(1.234_56), Cell::Number(1.2346));
    }

    #[test]
    fn test_workbook_bytes_do_not_depend_on_wall_clock() {
        let report = mcf7_report();
        let sheets = anova_sheets(&report);
        let first = to_buffer(&sheets).unwrap();
        // Document timestamps have one-second resolution.
        thread::sleep(Duration::from_millis(1100));
        let second = to_buffer(&sheets).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_save_requires_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sheets = [tukey_sheet(&mcf7_report())];

        let path = dir.path().join("tukey.xlsx");
        save(&sheets, &path).unwrap();
        save(&sheets, &path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), to_buffer(&sheets).unwrap());

        let missing = dir.path().join("missing").join("tukey.xlsx");
        let err = save(&sheets, &missing).unwrap_err();
        assert!(err.to_string().contains("missing"));
        assert!(!dir.path().join("missing").exists());
    }
}
