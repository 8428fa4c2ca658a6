//! Source tables: the spreadsheet or CSV file whose rows are merged.
//!
//! A table is loaded whole into memory as a header plus rows of named
//! cells. The format is picked by file extension:
//! - `.csv`, `.txt`: delimited text, delimiter detected from the header line.
//! - `.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`: first worksheet of a workbook.
//!
//! The route provided here is:
//! - `POST /api/data_sources/table/columns`: column headers of a table, used
//!   by the front end to offer the columns that can be mapped to placeholders.

pub mod cell;
mod csv_source;
mod get_columns;
mod spreadsheet;

use crate::error::TableError;
use actix_web::web::{post, scope};
use actix_web::Scope;
use cell::CellValue;
use std::collections::HashMap;
use std::path::Path;

const API_PATH: &str = "/api/data_sources/table";

/// Configures and returns the Actix scope for table data source routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/columns", post().to(get_columns::process))
}

/// One record of a source table, keyed by column header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: HashMap<String, CellValue>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_empty)
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        Row {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A loaded source table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Loads `path`, choosing the reader from its extension.
    pub fn load(path: &Path) -> Result<Table, TableError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" | "txt" => csv_source::load(path),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => spreadsheet::load(path),
            _ => Err(TableError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Builds a table from a header and positional records. Records shorter
    /// than the header are padded with empty cells, extra cells are ignored,
    /// and rows with no content at all are dropped.
    pub fn from_records<I>(headers: Vec<String>, records: I) -> Table
    where
        I: IntoIterator<Item = Vec<CellValue>>,
    {
        let headers = dedupe_headers(headers);
        let rows = records
            .into_iter()
            .map(|record| {
                let mut values = record.into_iter();
                headers
                    .iter()
                    .map(|h| (h.clone(), values.next().unwrap_or(CellValue::Empty)))
                    .collect::<Row>()
            })
            .filter(|row| !row.is_blank())
            .collect();
        Table { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Repeated header names get a `.1`, `.2`, ... suffix so every column stays
/// addressable.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|h| {
            let count = seen.entry(h.clone()).or_insert(0);
            let name = if *count == 0 {
                h
            } else {
                format!("{}.{}", h, count)
            };
            *count += 1;
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn records_are_padded_and_blank_rows_dropped() {
        let table = Table::from_records(
            vec!["id".to_string(), "qty".to_string()],
            vec![
                vec![CellValue::Text("A1".to_string())],
                vec![CellValue::Empty, CellValue::Empty],
                vec![
                    CellValue::Text("A2".to_string()),
                    CellValue::Float(3.0),
                    CellValue::Int(9),
                ],
            ],
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get("qty"), Some(&CellValue::Empty));
        assert_eq!(table.rows()[1].get("qty"), Some(&CellValue::Float(3.0)));
    }

    #[test]
    fn duplicate_headers_are_suffixed() {
        let headers = dedupe_headers(vec!["a".into(), "b".into(), "a".into(), "a".into()]);
        assert_eq!(headers, vec!["a", "b", "a.1", "a.2"]);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        assert!(matches!(
            Table::load(file.path()),
            Err(TableError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn load_dispatches_csv_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".CSV").tempfile().unwrap();
        writeln!(file, "order id;total").unwrap();
        writeln!(file, "A1;19.9").unwrap();
        let table = Table::load(file.path()).unwrap();
        assert_eq!(table.headers(), ["order id", "total"]);
        assert_eq!(table.rows()[0].get("total"), Some(&CellValue::Float(19.9)));
    }
}
