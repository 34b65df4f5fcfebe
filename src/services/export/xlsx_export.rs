use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};

use crate::error::ExportError;
use crate::model::table::{RunTables, Table, HEADERS};

pub const SENTENCE_SHEET: &str = "文章";
pub const GLOSSARY_SHEET: &str = "語釈";

pub const FONT_NAME: &str = "Noto Sans CJK JP Medium";
const FONT_SIZE: f64 = 11.0;
const COLUMN_WIDTH: f64 = 50.0;
const LINE_HEIGHT: f64 = 18.0;
const CHARS_PER_LINE: usize = 50;

/// Rough number of display lines a wrapped cell needs.
pub fn estimated_lines(value: &str) -> usize {
    let explicit = value.matches('\n').count() + 1;
    let wrapped = value.chars().count() / CHARS_PER_LINE + 1;
    explicit.max(wrapped)
}

/// Height for a row: the tallest cell wins, never below one line.
pub fn row_height<S: AsRef<str>>(cells: &[S]) -> f64 {
    cells
        .iter()
        .map(|c| estimated_lines(c.as_ref()) as f64 * LINE_HEIGHT)
        .fold(LINE_HEIGHT, f64::max)
}

fn cell_format() -> Format {
    Format::new()
        .set_text_wrap()
        .set_align(FormatAlign::Top)
        .set_font_name(FONT_NAME)
        .set_font_size(FONT_SIZE)
}

fn build_sheet(name: &str, table: &Table) -> Result<Worksheet, ExportError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(name)?;

    let format = cell_format();

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &format)?;
    }
    sheet.set_row_height(0, row_height(&HEADERS))?;

    for (i, row) in table.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            sheet.write_string_with_format(r, col as u16, value, &format)?;
        }
        sheet.set_row_height(r, row_height(row))?;
    }

    for col in 0..HEADERS.len() as u16 {
        sheet.set_column_width(col, COLUMN_WIDTH)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    Ok(sheet)
}

/// Two-sheet workbook, sentences first.
pub fn build_workbook(tables: &RunTables) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(build_sheet(SENTENCE_SHEET, &tables.sentences)?);
    workbook.push_worksheet(build_sheet(GLOSSARY_SHEET, &tables.glossary)?);

    Ok(workbook.save_to_buffer()?)
}
