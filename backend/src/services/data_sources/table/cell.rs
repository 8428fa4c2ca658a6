/// A single scalar read from a source table.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Types a raw CSV field.
    ///
    /// Blank fields are `Empty`. A numeric literal becomes `Int` or `Float`
    /// only if formatting the number gives the field back (trailing
    /// fractional zeros aside, so `3.0` is the float 3). Anything else stays
    /// `Text` verbatim: identifiers with leading zeros (`007`), signed phone
    /// numbers (`+8613800000000`), digit runs too long for an exact number.
    pub fn infer(raw: &str) -> Self {
        let normalized = raw.replace('\u{00A0}', " ");
        let trimmed = normalized.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        if !looks_numeric(trimmed) {
            return CellValue::Text(raw.to_string());
        }
        let typed = match trimmed.parse::<i64>() {
            Ok(i) => CellValue::Int(i),
            Err(_) => match trimmed.parse::<f64>() {
                Ok(f) => CellValue::Float(f),
                Err(_) => return CellValue::Text(raw.to_string()),
            },
        };
        if format_value(Some(&typed)) == without_trailing_fraction_zeros(trimmed) {
            typed
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

// Rejects `inf`, `NaN` and friends that `f64::from_str` would accept.
fn looks_numeric(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

/// `19.90` -> `19.9`, `3.0` -> `3`; other literals are returned unchanged.
fn without_trailing_fraction_zeros(s: &str) -> &str {
    match s.split_once('.') {
        Some((int, frac)) if !int.is_empty() && frac.chars().all(|c| c.is_ascii_digit()) => {
            let s = s.trim_end_matches('0');
            s.strip_suffix('.').unwrap_or(s)
        }
        _ => s,
    }
}

/// Display text of a cell as inserted into templates and file names.
///
/// Missing and empty cells (and NaN) render as `""`; integral numbers render
/// without a decimal point, so a quantity stored as `3.0` prints as `3`.
pub fn format_value(value: Option<&CellValue>) -> String {
    match value {
        None | Some(CellValue::Empty) => String::new(),
        Some(CellValue::Int(i)) => i.to_string(),
        Some(CellValue::Float(f)) => format_float(*f),
        Some(CellValue::Text(s)) => s.clone(),
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        return String::new();
    }
    if f.is_finite() && f.fract() == 0.0 {
        if f >= i64::MIN as f64 && f < i64::MAX as f64 {
            return (f as i64).to_string();
        }
        return format!("{:.0}", f);
    }
    f.to_string()
}
