use super::cell::CellValue;
use super::Table;
use crate::error::TableError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Picks the candidate delimiter that occurs most often in the header line.
/// Falls back to a comma when none occurs.
pub(super) fn detect_delimiter(header_line: &str) -> u8 {
    CANDIDATE_DELIMITERS
        .iter()
        .copied()
        .filter(|&d| header_line.matches(d as char).count() > 0)
        .max_by_key(|&d| header_line.matches(d as char).count())
        .unwrap_or(b',')
}

fn read_header_line(path: &Path) -> Result<String, TableError> {
    let file = File::open(path).map_err(|source| TableError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .map_err(|source| TableError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Strips a UTF-8 byte order mark, which spreadsheet exports often prepend.
fn normalize_header(cell: &str) -> String {
    cell.trim_start_matches('\u{FEFF}').to_string()
}

pub(super) fn load(path: &Path) -> Result<Table, TableError> {
    let header_line = read_header_line(path)?;
    if header_line.trim().is_empty() {
        return Err(TableError::MissingHeader {
            path: path.to_path_buf(),
        });
    }
    let delimiter = detect_delimiter(&header_line);

    let csv_err = |source| TableError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(normalize_header)
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        records.push(record.iter().map(CellValue::infer).collect::<Vec<_>>());
    }

    Ok(Table::from_records(headers, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn detects_most_frequent_delimiter() {
        assert_eq!(detect_delimiter("a;b;c"), b';');
        assert_eq!(detect_delimiter("a\tb\tc,d"), b'\t');
        assert_eq!(detect_delimiter("a|b"), b'|');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn loads_quoted_fields_and_types_cells() {
        let file = write_csv(
            "\u{FEFF}order id,total invoice value,address1\r\n\
             A1,19.9,\"Main St, 5\"\r\n\
             007,3.0,\r\n",
        );
        let table = load(file.path()).unwrap();
        assert_eq!(
            table.headers(),
            ["order id", "total invoice value", "address1"]
        );
        let first = &table.rows()[0];
        assert_eq!(first.get("order id"), Some(&CellValue::Text("A1".into())));
        assert_eq!(first.get("total invoice value"), Some(&CellValue::Float(19.9)));
        assert_eq!(first.get("address1"), Some(&CellValue::Text("Main St, 5".into())));

        let second = &table.rows()[1];
        assert_eq!(second.get("order id"), Some(&CellValue::Text("007".into())));
        assert_eq!(second.get("address1"), Some(&CellValue::Empty));
    }

    #[test]
    fn ragged_rows_are_tolerated() {
        let file = write_csv("a,b,c\n1\n1,2,3,4\n");
        let table = load(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get("c"), Some(&CellValue::Empty));
        assert_eq!(table.rows()[1].get("c"), Some(&CellValue::Int(3)));
    }

    #[test]
    fn empty_file_has_no_header() {
        let file = write_csv("");
        assert!(matches!(load(file.path()), Err(TableError::MissingHeader { .. })));
    }

    #[test]
    fn missing_file_reports_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load(&dir.path().join("nope.csv"));
        assert!(matches!(result, Err(TableError::Open { .. })));
    }
}
