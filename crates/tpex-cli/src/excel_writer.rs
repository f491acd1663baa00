//! Excel output: a two-sheet workbook per suite.
//!
//! Spreadsheet support is a compile-time capability gated on the `excel`
//! feature. When the feature is off the rest of the pipeline still runs and
//! JSON output proceeds; the CLI reports the degradation once at startup.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tpex_ado::SuiteExtraction;

#[cfg(feature = "excel")]
use rust_xlsxwriter::{Format, Workbook};

#[cfg(feature = "excel")]
const TEST_CASE_HEADERS: [&str; 4] =
    ["Test Case ID", "Test Case Name", "Number of Steps", "Assigned To"];

/// Pathological names should not produce pathological columns.
const MAX_COLUMN_WIDTH: usize = 60;

/// Whether spreadsheet output is available in this build.
pub fn available() -> bool {
    cfg!(feature = "excel")
}

#[cfg_attr(not(feature = "excel"), allow(dead_code))]
pub fn file_name(suite_id: u64) -> String {
    format!("Suite_{suite_id}_TestCases.xlsx")
}

/// Write `{dir}/Suite_{ID}_TestCases.xlsx` with "Test Cases" and "Summary"
/// sheets, columns sized to content.
#[cfg(feature = "excel")]
pub fn write(extraction: &SuiteExtraction, dir: &Path) -> Result<PathBuf> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet().set_name("Test Cases")?;
        for (col, header) in TEST_CASE_HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }
        for (i, tc) in extraction.test_cases.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_number(row, 0, tc.test_case_id as f64)?;
            sheet.write_string(row, 1, tc.test_case_name.as_str())?;
            sheet.write_number(row, 2, f64::from(tc.number_of_steps))?;
            sheet.write_string(row, 3, tc.assigned_to.as_str())?;
        }

        let widths = [
            column_width(
                TEST_CASE_HEADERS[0],
                extraction.test_cases.iter().map(|tc| tc.test_case_id.to_string().len()),
            ),
            column_width(
                TEST_CASE_HEADERS[1],
                extraction.test_cases.iter().map(|tc| tc.test_case_name.len()),
            ),
            column_width(
                TEST_CASE_HEADERS[2],
                extraction.test_cases.iter().map(|tc| tc.number_of_steps.to_string().len()),
            ),
            column_width(
                TEST_CASE_HEADERS[3],
                extraction.test_cases.iter().map(|tc| tc.assigned_to.len()),
            ),
        ];
        for (col, width) in widths.iter().enumerate() {
            sheet.set_column_width(col as u16, *width as f64)?;
        }
    }

    {
        let generated_at = extraction.extracted_at.format("%Y-%m-%d %H:%M:%S").to_string();
        let rows = [
            ("Suite ID", extraction.suite_id.to_string()),
            ("Suite Name", extraction.suite_name.clone()),
            ("Total Test Cases", extraction.test_cases.len().to_string()),
            ("Generated At", generated_at),
        ];

        let sheet = workbook.add_worksheet().set_name("Summary")?;
        sheet.write_string_with_format(0, 0, "Metric", &bold)?;
        sheet.write_string_with_format(0, 1, "Value", &bold)?;
        for (i, (metric, value)) in rows.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, *metric)?;
            sheet.write_string(row, 1, value.as_str())?;
        }
        sheet.set_column_width(0, column_width("Metric", rows.iter().map(|(m, _)| m.len())) as f64)?;
        sheet.set_column_width(1, column_width("Value", rows.iter().map(|(_, v)| v.len())) as f64)?;
    }

    let path = dir.join(file_name(extraction.suite_id));
    workbook.save(&path)?;
    Ok(path)
}

#[cfg(not(feature = "excel"))]
pub fn write(_extraction: &SuiteExtraction, _dir: &Path) -> Result<PathBuf> {
    anyhow::bail!("spreadsheet support not compiled in (excel feature disabled)")
}

/// Width for one column: widest cell (or the header) plus padding, capped.
#[cfg_attr(not(feature = "excel"), allow(dead_code))]
fn column_width(header: &str, cell_widths: impl Iterator<Item = usize>) -> usize {
    let widest = cell_widths.chain(std::iter::once(header.len())).max().unwrap_or(0);
    (widest + 2).min(MAX_COLUMN_WIDTH)
}
