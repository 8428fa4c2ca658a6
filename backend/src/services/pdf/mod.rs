//! PDF backends.
//!
//! Every backend turns a fully rendered HTML document into PDF bytes through
//! a Chromium print pipeline. The merge runner only sees the [`PdfBackend`]
//! trait; which implementation serves a job is decided once, from
//! configuration, by [`backend_for`].
//!
//! Backends are sessions: the browser process and the scratch directory they
//! need are created on first use and released when the backend is dropped at
//! the end of the job, whatever its outcome.

mod chrome;
mod cli;
mod scratch;

pub use chrome::ChromeBackend;
pub use cli::CliPrintBackend;

use crate::error::BackendError;
use common::model::pdf::{BackendKind, PdfOptions};
use std::path::{Path, PathBuf};

pub trait PdfBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Prints `html` with `options` and returns the PDF bytes.
    fn print_to_pdf(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, BackendError>;
}

/// Builds the backend selected by `kind`. Nothing is launched yet, so this
/// cannot fail; a wrong executable path surfaces on the first print.
pub fn backend_for(kind: BackendKind, executable: &Path) -> Box<dyn PdfBackend> {
    match kind {
        BackendKind::Local => Box::new(ChromeBackend::standard(executable)),
        BackendKind::Undetected => Box::new(ChromeBackend::stealth(executable)),
        BackendKind::Cli => Box::new(CliPrintBackend::new(executable)),
    }
}

/// `file://` URL of an absolute local path, usable on every platform.
pub(crate) fn file_url(path: &Path) -> String {
    let absolute: PathBuf = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf());
    let text = absolute.to_string_lossy().replace('\\', "/");
    // Windows canonical paths carry a verbatim prefix Chrome does not accept.
    let text = text.strip_prefix("//?/").unwrap_or(&text);
    if text.starts_with('/') {
        format!("file://{}", text)
    } else {
        format!("file:///{}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_for_honours_the_configured_kind() {
        let exe = Path::new("/opt/chrome/chrome");
        for kind in [BackendKind::Local, BackendKind::Undetected, BackendKind::Cli] {
            assert_eq!(backend_for(kind, exe).kind(), kind);
        }
    }

    #[test]
    fn file_url_is_absolute() {
        let file = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
        let url = file_url(file.path());
        assert!(url.starts_with("file:///"), "{url}");
        assert!(url.ends_with(".html"));
        assert!(!url.contains('\\'));
    }

    #[test]
    fn missing_executable_fails_per_print() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("no-such-browser");
        for kind in [BackendKind::Local, BackendKind::Undetected, BackendKind::Cli] {
            let backend = backend_for(kind, &exe);
            let result = backend.print_to_pdf("<p>hi</p>", &PdfOptions::default());
            assert!(
                matches!(result, Err(BackendError::Launch(_))),
                "{kind}: {result:?}"
            );
        }
    }
}
