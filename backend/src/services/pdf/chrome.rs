use super::scratch::ScratchDir;
use super::{file_url, PdfBackend};
use crate::error::BackendError;
use common::model::pdf::{BackendKind, PdfOptions};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, info, warn};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

// Long enough to survive a paused job between two rows.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Headless Chrome driven over the DevTools protocol.
///
/// Each document is written to a temporary file in the session scratch
/// directory, opened through its `file://` URL and printed with
/// `Page.printToPDF`. The browser is started on first use and kept for the
/// rest of the session; if a print fails on a reused browser it is relaunched
/// once before the error is reported.
pub struct ChromeBackend {
    executable: PathBuf,
    stealth: bool,
    // Declared before `scratch`: the browser must exit before its profile
    // directory is deleted.
    browser: Mutex<Option<Browser>>,
    scratch: ScratchDir,
}

impl ChromeBackend {
    pub fn standard(executable: &Path) -> Self {
        Self::new(executable, false)
    }

    /// Variant that hides the usual automation fingerprints: a throw-away
    /// profile, no `AutomationControlled` blink feature and stealth overrides
    /// on every tab.
    pub fn stealth(executable: &Path) -> Self {
        Self::new(executable, true)
    }

    fn new(executable: &Path, stealth: bool) -> Self {
        Self {
            executable: executable.to_path_buf(),
            stealth,
            browser: Mutex::new(None),
            scratch: ScratchDir::new("chrome_"),
        }
    }

    fn launch(&self) -> Result<Browser, BackendError> {
        let mut args: Vec<&OsStr> = vec![
            OsStr::new("--disable-gpu"),
            OsStr::new("--disable-dev-shm-usage"),
        ];
        if self.stealth {
            args.push(OsStr::new("--disable-blink-features=AutomationControlled"));
        }

        let mut builder = LaunchOptions::default_builder();
        builder
            .path(Some(self.executable.clone()))
            .headless(true)
            .sandbox(false)
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .args(args);
        if self.stealth {
            builder.user_data_dir(Some(self.scratch.subdir("profile")?));
        }
        let options = builder
            .build()
            .map_err(|e| BackendError::Launch(e.to_string()))?;

        info!(
            "Launching {} browser {}",
            self.kind(),
            self.executable.display()
        );
        Browser::new(options).map_err(|e| BackendError::Launch(e.to_string()))
    }

    /// The session browser, launched on first call.
    fn browser(&self) -> Result<(Browser, bool), BackendError> {
        let mut slot = self.browser.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(browser) = slot.as_ref() {
            return Ok((browser.clone(), true));
        }
        let browser = self.launch()?;
        *slot = Some(browser.clone());
        Ok((browser, false))
    }

    fn discard_browser(&self) {
        self.browser
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn print_with(
        &self,
        browser: &Browser,
        url: &str,
        options: &PdfOptions,
    ) -> Result<Vec<u8>, BackendError> {
        let tab = browser
            .new_tab()
            .map_err(|e| BackendError::Navigation(e.to_string()))?;
        if self.stealth {
            tab.enable_stealth_mode()
                .map_err(|e| BackendError::Navigation(e.to_string()))?;
        }
        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| BackendError::Navigation(e.to_string()))?;

        let pdf = tab
            .print_to_pdf(Some(print_options(options)))
            .map_err(|e| BackendError::Print(e.to_string()));
        if let Err(e) = tab.close(true) {
            debug!("Closing tab failed: {}", e);
        }
        pdf
    }
}

impl PdfBackend for ChromeBackend {
    fn kind(&self) -> BackendKind {
        if self.stealth {
            BackendKind::Undetected
        } else {
            BackendKind::Local
        }
    }

    fn print_to_pdf(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, BackendError> {
        let page = self.scratch.html_file(html)?;
        let url = file_url(page.path());

        let (browser, reused) = self.browser()?;
        match self.print_with(&browser, &url, options) {
            Ok(pdf) => Ok(pdf),
            Err(e) if reused => {
                warn!("Print on running browser failed ({}), relaunching", e);
                self.discard_browser();
                let (browser, _) = self.browser()?;
                self.print_with(&browser, &url, options).inspect_err(|_| {
                    self.discard_browser();
                })
            }
            Err(e) => {
                self.discard_browser();
                Err(e)
            }
        }
    }
}

/// DevTools `Page.printToPDF` parameters for `options`.
fn print_options(options: &PdfOptions) -> PrintToPdfOptions {
    PrintToPdfOptions {
        paper_width: Some(options.paper_width),
        paper_height: Some(options.paper_height),
        margin_top: Some(options.margin_top),
        margin_bottom: Some(options.margin_bottom),
        margin_left: Some(options.margin_left),
        margin_right: Some(options.margin_right),
        print_background: Some(options.print_background),
        prefer_css_page_size: Some(options.prefer_css_page_size),
        scale: Some(options.scale),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_option_reaches_the_print_call() {
        let options = PdfOptions {
            paper_width: 8.5,
            paper_height: 11.0,
            margin_top: 0.1,
            margin_bottom: 0.2,
            margin_left: 0.3,
            margin_right: 0.4,
            print_background: true,
            prefer_css_page_size: false,
            scale: 0.9,
        };
        let printed = print_options(&options);
        assert_eq!(printed.paper_width, Some(8.5));
        assert_eq!(printed.paper_height, Some(11.0));
        assert_eq!(printed.margin_top, Some(0.1));
        assert_eq!(printed.margin_bottom, Some(0.2));
        assert_eq!(printed.margin_left, Some(0.3));
        assert_eq!(printed.margin_right, Some(0.4));
        assert_eq!(printed.print_background, Some(true));
        assert_eq!(printed.prefer_css_page_size, Some(false));
        assert_eq!(printed.scale, Some(0.9));
        assert_eq!(printed.landscape, None);
    }

    #[test]
    fn failed_launch_leaves_no_page_behind() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ChromeBackend::stealth(&dir.path().join("missing-chrome"));
        assert!(backend.print_to_pdf("<p>x</p>", &PdfOptions::default()).is_err());

        let root = backend.scratch.existing().expect("scratch dir was used");
        let leftovers: Vec<_> = std::fs::read_dir(&root)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "html"))
            .collect();
        assert!(leftovers.is_empty());

        drop(backend);
        assert!(!root.exists());
    }
}
