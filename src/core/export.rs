//! Spreadsheet export of report tables.

use crate::{
    core::report::{Cell, ReportTable},
    errors::Result,
};
use rust_xlsxwriter::{Format, Workbook};

/// MIME type of the generated workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const MIN_COLUMN_WIDTH: u16 = 10;
const MAX_COLUMN_WIDTH: u16 = 60;

/// Renders `table` as a single-sheet xlsx workbook and returns the file bytes.
///
/// The header row is bold, multi-line text cells wrap, and money cells use two decimals.
#[allow(clippy::cast_precision_loss)]
pub fn render_xlsx(table: &ReportTable) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let wrap_format = Format::new().set_text_wrap();
    let money_format = Format::new().set_num_format("0.00");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&table.sheet_name)?;

    for (col, header) in (0u16..).zip(&table.headers) {
        worksheet.write_string_with_format(0, col, header, &header_format)?;
    }

    for (row_idx, row) in (1u32..).zip(&table.rows) {
        for (col, cell) in (0u16..).zip(row) {
            match cell {
                Cell::Text(text) if text.contains('\n') => {
                    worksheet.write_string_with_format(row_idx, col, text, &wrap_format)?;
                }
                Cell::Text(text) => {
                    worksheet.write_string(row_idx, col, text)?;
                }
                Cell::Integer(value) => {
                    worksheet.write_number(row_idx, col, *value as f64)?;
                }
                Cell::Money(value) => {
                    worksheet.write_number_with_format(row_idx, col, *value, &money_format)?;
                }
            }
        }
    }

    for (col, width) in (0u16..).zip(column_widths(table)) {
        worksheet.set_column_width(col, f64::from(width))?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Character width of the widest line in each column, clamped to a readable range.
fn column_widths(table: &ReportTable) -> Vec<u16> {
    let mut widths: Vec<usize> = table
        .headers
        .iter()
        .map(|h| h.chars().count())
        .collect();

    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            let len = match cell {
                Cell::Text(text) => text.lines().map(|l| l.chars().count()).max().unwrap_or(0),
                Cell::Integer(value) => value.to_string().len(),
                Cell::Money(value) => format!("{value:.2}").len(),
            };
            *width = (*width).max(len);
        }
    }

    widths
        .into_iter()
        .map(|w| {
            u16::try_from(w + 2)
                .unwrap_or(MAX_COLUMN_WIDTH)
                .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn sample_table() -> ReportTable {
        ReportTable {
            sheet_name: "Продажи по блюдам".to_string(),
            headers: vec![
                "Название блюда".to_string(),
                "Продано (шт)".to_string(),
                "Выручка (₸)".to_string(),
            ],
            rows: vec![
                vec![
                    Cell::Text("Pizza".to_string()),
                    Cell::Integer(2),
                    Cell::Money(5000.0),
                ],
                vec![
                    Cell::Text("Soup\nwith bread".to_string()),
                    Cell::Integer(1),
                    Cell::Money(1200.5),
                ],
            ],
        }
    }

    #[test]
    fn test_render_produces_zip_container() {
        let bytes = render_xlsx(&sample_table()).unwrap();
        // xlsx is a zip archive
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() > 100);
    }

    #[test]
    fn test_invalid_sheet_name_is_an_error() {
        let table = ReportTable {
            sheet_name: "bad/name".to_string(),
            ..sample_table()
        };
        assert!(matches!(
            render_xlsx(&table),
            Err(crate::errors::Error::Export(_))
        ));
    }

    #[test]
    fn test_column_widths() {
        let widths = column_widths(&sample_table());
        assert_eq!(widths.len(), 3);
        // "Название блюда" is 14 characters
        assert_eq!(widths[0], 16);
        assert_eq!(widths[1], 14);
        assert_eq!(widths[2], 13);
    }
}
