use super::scratch::ScratchDir;
use super::{file_url, PdfBackend};
use crate::error::BackendError;
use common::model::pdf::{BackendKind, PdfOptions};
use log::debug;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

static HEAD_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head(\s[^>]*)?>").expect("head pattern is valid"));
static HEAD_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head\s*>").expect("head pattern is valid"));

/// Prints through the browser's own command-line printer, one short-lived
/// process per document.
///
/// The command line cannot carry page geometry, so paper size, margins,
/// scale and background printing travel inside the document as an `@page`
/// style block.
pub struct CliPrintBackend {
    executable: PathBuf,
    scratch: ScratchDir,
}

impl CliPrintBackend {
    pub fn new(executable: &Path) -> Self {
        Self {
            executable: executable.to_path_buf(),
            scratch: ScratchDir::new("print_"),
        }
    }
}

impl PdfBackend for CliPrintBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Cli
    }

    fn print_to_pdf(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, BackendError> {
        let page = self.scratch.html_file(&with_page_style(html, options))?;
        let target = self.scratch.output_file(".pdf")?;

        let output = Command::new(&self.executable)
            .args([
                "--headless",
                "--disable-gpu",
                "--no-sandbox",
                "--no-pdf-header-footer",
            ])
            .arg(format!("--print-to-pdf={}", target.path().display()))
            .arg(file_url(page.path()))
            .output()
            .map_err(|e| {
                BackendError::Launch(format!("{}: {}", self.executable.display(), e))
            })?;
        debug!(
            "{} exited with {}",
            self.executable.display(),
            output.status
        );

        if !output.status.success() {
            return Err(BackendError::Print(format!(
                "browser exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let pdf = fs::read(target.path())?;
        if pdf.is_empty() {
            return Err(BackendError::Print("browser produced no output".to_string()));
        }
        Ok(pdf)
    }
}

fn page_style(options: &PdfOptions) -> String {
    let mut css = format!(
        "@page {{ size: {}in {}in; margin: {}in {}in {}in {}in; }}",
        options.paper_width,
        options.paper_height,
        options.margin_top,
        options.margin_right,
        options.margin_bottom,
        options.margin_left,
    );
    if options.scale != 1.0 {
        css.push_str(&format!(" html {{ zoom: {}; }}", options.scale));
    }
    if options.print_background {
        css.push_str(" * { -webkit-print-color-adjust: exact; print-color-adjust: exact; }");
    }
    format!("<style>{}</style>", css)
}

/// Inserts the print style into `html`.
///
/// With `prefer_css_page_size` the block goes first in `<head>`, so any
/// `@page` rule of the document itself overrides it; otherwise it goes last
/// and wins. Documents without a `<head>` get the block prepended.
fn with_page_style(html: &str, options: &PdfOptions) -> String {
    let style = page_style(options);
    let at = if options.prefer_css_page_size {
        HEAD_OPEN.find(html).map(|m| m.end())
    } else {
        HEAD_CLOSE.find(html).map(|m| m.start())
    };
    match at {
        Some(idx) => format!("{}{}{}", &html[..idx], style, &html[idx..]),
        None => format!("{}{}", style, html),
    }
}
