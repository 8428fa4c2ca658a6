use crate::services::data_sources::table::cell::format_value;
use crate::services::data_sources::table::Row;
use chrono::Local;
use uuid::Uuid;

/// Output file name for `row`: `order_{base}_{suffix}.pdf`.
///
/// `base` is the formatted value of the `id_field` column, or the current
/// local time (`%Y%m%d%H%M%S`) when the row has no usable value there.
/// `suffix` is 8 random hex digits so rows sharing an id or a second do not
/// collide.
pub fn name_for(row: &Row, id_field: &str) -> String {
    let base = row
        .get(id_field)
        .map(|value| format_value(Some(value)))
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Local::now().format("%Y%m%d%H%M%S").to_string());
    let suffix = Uuid::new_v4().simple().to_string();
    format!("order_{}_{}.pdf", sanitize(base.trim()), &suffix[..8])
}

/// Replaces characters that are not allowed in file names on common
/// platforms.
fn sanitize(base: &str) -> String {
    base.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::data_sources::table::cell::CellValue;
    use std::collections::HashSet;

    const ID: &str = "平台订单号";

    fn suffix_of(name: &str) -> &str {
        let stem = name.strip_suffix(".pdf").unwrap();
        &stem[stem.rfind('_').unwrap() + 1..]
    }

    #[test]
    fn uses_formatted_identifier() {
        let row: Row = [(ID, CellValue::Float(1234.0))].into_iter().collect();
        let name = name_for(&row, ID);
        assert!(name.starts_with("order_1234_"), "{name}");
        assert!(name.ends_with(".pdf"));
        let suffix = suffix_of(&name);
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn falls_back_to_timestamp_without_identifier() {
        let row: Row = [("other", CellValue::Text("x".into()))].into_iter().collect();
        let name = name_for(&row, ID);
        let base = name
            .strip_prefix("order_")
            .and_then(|rest| rest.split('_').next())
            .unwrap();
        assert_eq!(base.len(), 14, "{name}");
        assert!(base.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn blank_identifier_also_falls_back() {
        let row: Row = [(ID, CellValue::Empty)].into_iter().collect();
        assert!(!name_for(&row, ID).starts_with("order__"));
    }

    #[test]
    fn suffixes_differ_across_a_batch() {
        let row = Row::default();
        let suffixes: HashSet<String> = (0..500)
            .map(|_| suffix_of(&name_for(&row, ID)).to_string())
            .collect();
        assert_eq!(suffixes.len(), 500);
    }

    #[test]
    fn path_characters_are_neutralised() {
        let row: Row = [(ID, CellValue::Text("A/1:2".into()))].into_iter().collect();
        assert!(name_for(&row, ID).starts_with("order_A_1_2_"));
    }
}
