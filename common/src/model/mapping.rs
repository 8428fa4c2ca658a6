use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered table from source-column name to placeholder name.
///
/// Column keys are unique: inserting an existing column replaces its target
/// in place and keeps its position. Serialized as a JSON object whose key
/// order is the declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: IndexMap<String, String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Links `column` to `placeholder`, returning the previous target of
    /// `column` if there was one.
    pub fn insert(
        &mut self,
        column: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> Option<String> {
        self.entries.insert(column.into(), placeholder.into())
    }

    pub fn remove(&mut self, column: &str) -> Option<String> {
        self.entries.shift_remove(column)
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(column, placeholder target)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, p)| (c.as_str(), p.as_str()))
    }

    /// Builds the placeholder-name → column lookup used while rendering.
    ///
    /// Targets are normalized with [`placeholder_name`]. When several columns
    /// target the same placeholder the entry declared last wins.
    pub fn placeholder_to_column(&self) -> HashMap<&str, &str> {
        self.iter()
            .map(|(column, target)| (placeholder_name(target), column))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = FieldMapping::new();
        for (column, placeholder) in iter {
            mapping.insert(column, placeholder);
        }
        mapping
    }
}

/// Strips one pair of surrounding `{{` `}}` from a placeholder target.
///
/// `"{{order_id}}"` and `"order_id"` both yield `"order_id"`. Inner
/// whitespace is significant and left untouched.
pub fn placeholder_name(target: &str) -> &str {
    target
        .strip_prefix("{{")
        .and_then(|s| s.strip_suffix("}}"))
        .unwrap_or(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_existing_column_in_place() {
        let mut mapping = FieldMapping::new();
        assert_eq!(mapping.insert("id", "order_id"), None);
        mapping.insert("total", "total_value");
        assert_eq!(mapping.insert("id", "{{invoice_no}}"), Some("order_id".to_string()));

        let columns: Vec<&str> = mapping.iter().map(|(column, _)| column).collect();
        assert_eq!(columns, vec!["id", "total"]);
        assert_eq!(mapping.get("id"), Some("{{invoice_no}}"));
    }

    #[test]
    fn remove_drops_entry() {
        let mut mapping: FieldMapping = [("id", "order_id")].into_iter().collect();
        assert_eq!(mapping.remove("id"), Some("order_id".to_string()));
        assert!(mapping.is_empty());
        assert_eq!(mapping.remove("id"), None);
    }

    #[test]
    fn remove_keeps_order_of_remaining_entries() {
        let mut mapping: FieldMapping =
            [("a", "x"), ("b", "y"), ("c", "z")].into_iter().collect();
        mapping.remove("a");
        let columns: Vec<&str> = mapping.iter().map(|(column, _)| column).collect();
        assert_eq!(columns, vec!["b", "c"]);
    }

    #[test]
    fn braces_are_optional_in_targets() {
        assert_eq!(placeholder_name("{{order_id}}"), "order_id");
        assert_eq!(placeholder_name("order_id"), "order_id");
        assert_eq!(placeholder_name("{{ spaced }}"), " spaced ");
        assert_eq!(placeholder_name("{{half"), "{{half");
    }

    #[test]
    fn last_declared_entry_wins_for_shared_placeholder() {
        let mapping: FieldMapping = [("first", "{{x}}"), ("second", "x")].into_iter().collect();
        let inverse = mapping.placeholder_to_column();
        assert_eq!(inverse.get("x"), Some(&"second"));
        assert_eq!(inverse.len(), 1);
    }

    #[test]
    fn deserializes_object_preserving_declaration_order() {
        let mapping: FieldMapping =
            serde_json::from_str(r#"{"zeta":"{{z}}","alpha":"{{a}}","mid":"m"}"#).unwrap();
        let columns: Vec<&str> = mapping.iter().map(|(column, _)| column).collect();
        assert_eq!(columns, vec!["zeta", "alpha", "mid"]);

        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"zeta":"{{z}}","alpha":"{{a}}","mid":"m"}"#);
    }

    #[test]
    fn repeated_json_key_keeps_first_position_and_last_target() {
        let mapping: FieldMapping =
            serde_json::from_str(r#"{"id":"a","total":"t","id":"b"}"#).unwrap();
        let entries: Vec<(&str, &str)> = mapping.iter().collect();
        assert_eq!(entries, vec![("id", "b"), ("total", "t")]);
    }
}
