use super::cell::CellValue;
use super::Table;
use crate::error::TableError;
use calamine::{open_workbook_auto, Data, DataType, Reader};
use std::path::Path;

/// Reads the first worksheet; its first row is the header.
pub(super) fn load(path: &Path) -> Result<Table, TableError> {
    let sheet_err = |message: String| TableError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| sheet_err(e.to_string()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| sheet_err("workbook has no worksheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| sheet_err(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| TableError::MissingHeader {
        path: path.to_path_buf(),
    })?;
    let headers: Vec<String> = header.iter().map(header_text).collect();
    let records = rows.map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>());

    Ok(Table::from_records(headers, records))
}

fn header_text(data: &Data) -> String {
    match cell_from_data(data) {
        CellValue::Empty => String::new(),
        value => super::cell::format_value(Some(&value)),
    }
}

/// Maps a workbook cell onto the scalar kinds the merge understands.
///
/// Booleans and dates become text, error cells (`#N/A`, `#DIV/0!`) count as
/// empty.
fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => match data.as_datetime() {
            Some(moment) => CellValue::Text(moment.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        other => CellValue::Text(other.to_string()),
    }
}
