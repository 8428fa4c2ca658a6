use super::placeholders::{extract_placeholders, PLACEHOLDER_PATTERN};
use crate::error::MergeError;
use crate::services::data_sources::table::cell::format_value;
use crate::services::data_sources::table::Row;
use common::model::mapping::{placeholder_name, FieldMapping};
use regex::Captures;
use std::fs;
use std::path::{Path, PathBuf};

/// An HTML template loaded once per merge job.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    text: String,
    placeholders: Vec<String>,
}

impl Template {
    /// Reads a UTF-8 template file.
    pub fn load(path: &Path) -> Result<Template, MergeError> {
        let text = fs::read_to_string(path).map_err(|source| MergeError::TemplateUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let mut template = Template::from_text(text);
        template.path = path.to_path_buf();
        Ok(template)
    }

    pub fn from_text(text: impl Into<String>) -> Template {
        let text = text.into();
        let placeholders = extract_placeholders(&text);
        Template {
            path: PathBuf::new(),
            text,
            placeholders,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Mapping targets that name no placeholder of this template, once each,
    /// in declaration order.
    pub fn unmatched_targets<'m>(&self, mapping: &'m FieldMapping) -> Vec<&'m str> {
        let mut unmatched: Vec<&str> = Vec::new();
        for (_, target) in mapping.iter() {
            let name = placeholder_name(target);
            if !self.placeholders.iter().any(|p| p == name) && !unmatched.contains(&name) {
                unmatched.push(name);
            }
        }
        unmatched
    }

    pub fn render(&self, mapping: &FieldMapping, row: &Row) -> String {
        render(&self.text, mapping, row)
    }
}

/// Substitutes every `{{name}}` token of `template_text`.
///
/// A token is replaced by the formatted value of the column mapped to
/// `name`, or by the empty string when no column targets it or the row lacks
/// that column. Every occurrence is replaced in one pass; inserted values are
/// not scanned again.
pub fn render(template_text: &str, mapping: &FieldMapping, row: &Row) -> String {
    let columns = mapping.placeholder_to_column();
    PLACEHOLDER_PATTERN
        .replace_all(template_text, |caps: &Captures| {
            columns
                .get(&caps[1])
                .map(|column| format_value(row.get(column)))
                .unwrap_or_default()
        })
        .into_owned()
}
