use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Print settings handed to a PDF backend. Lengths are in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfOptions {
    pub paper_width: f64,
    pub paper_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub print_background: bool,
    /// Let the page's own `@page { size }` rule win over `paper_*`.
    pub prefer_css_page_size: bool,
    pub scale: f64,
}

impl Default for PdfOptions {
    /// A4 portrait, no margins, backgrounds printed, unscaled.
    fn default() -> Self {
        Self {
            paper_width: 8.27,
            paper_height: 11.69,
            margin_top: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            margin_right: 0.0,
            print_background: true,
            prefer_css_page_size: true,
            scale: 1.0,
        }
    }
}

impl PdfOptions {
    /// Returns a copy with every field set in `overrides` replaced.
    pub fn with_overrides(mut self, overrides: &PdfOptionsOverride) -> Self {
        let PdfOptionsOverride {
            paper_width,
            paper_height,
            margin_top,
            margin_bottom,
            margin_left,
            margin_right,
            print_background,
            prefer_css_page_size,
            scale,
        } = *overrides;
        if let Some(v) = paper_width {
            self.paper_width = v;
        }
        if let Some(v) = paper_height {
            self.paper_height = v;
        }
        if let Some(v) = margin_top {
            self.margin_top = v;
        }
        if let Some(v) = margin_bottom {
            self.margin_bottom = v;
        }
        if let Some(v) = margin_left {
            self.margin_left = v;
        }
        if let Some(v) = margin_right {
            self.margin_right = v;
        }
        if let Some(v) = print_background {
            self.print_background = v;
        }
        if let Some(v) = prefer_css_page_size {
            self.prefer_css_page_size = v;
        }
        if let Some(v) = scale {
            self.scale = v;
        }
        self
    }
}

/// Per-job overrides of [`PdfOptions`]; `None` keeps the configured value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfOptionsOverride {
    pub paper_width: Option<f64>,
    pub paper_height: Option<f64>,
    pub margin_top: Option<f64>,
    pub margin_bottom: Option<f64>,
    pub margin_left: Option<f64>,
    pub margin_right: Option<f64>,
    pub print_background: Option<bool>,
    pub prefer_css_page_size: Option<bool>,
    pub scale: Option<f64>,
}

/// Which PDF backend renders the documents of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Headless Chrome driven over the DevTools protocol.
    #[default]
    Local,
    /// Same as `Local` with automation fingerprints suppressed.
    Undetected,
    /// One browser process per document using its command-line printer.
    Cli,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Undetected => write!(f, "undetected"),
            BackendKind::Cli => write!(f, "cli"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(BackendKind::Local),
            "undetected" => Ok(BackendKind::Undetected),
            "cli" => Ok(BackendKind::Cli),
            _ => Err(format!("Unsupported backend type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_fields() {
        let overrides = PdfOptionsOverride {
            margin_top: Some(0.4),
            scale: Some(0.8),
            ..Default::default()
        };
        let options = PdfOptions::default().with_overrides(&overrides);
        assert_eq!(options.margin_top, 0.4);
        assert_eq!(options.scale, 0.8);
        assert_eq!(options.paper_width, 8.27);
        assert!(options.print_background);
    }

    #[test]
    fn partial_options_fill_from_defaults() {
        let options: PdfOptions = serde_json::from_str(r#"{"paper_width": 8.5}"#).unwrap();
        assert_eq!(options.paper_width, 8.5);
        assert_eq!(options.paper_height, 11.69);
        assert!(options.prefer_css_page_size);
    }

    #[test]
    fn backend_kind_round_trips_through_text() {
        for kind in [BackendKind::Local, BackendKind::Undetected, BackendKind::Cli] {
            assert_eq!(kind.to_string().parse::<BackendKind>(), Ok(kind));
        }
        assert!("playwright".parse::<BackendKind>().is_err());
        let kind: BackendKind = serde_json::from_str("\"undetected\"").unwrap();
        assert_eq!(kind, BackendKind::Undetected);
    }
}
