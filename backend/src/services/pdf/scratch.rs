use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tempfile::{NamedTempFile, TempDir};

/// Temporary directory shared by all prints of one backend session.
///
/// Created on first use and removed with everything in it when dropped.
#[derive(Debug)]
pub(super) struct ScratchDir {
    prefix: &'static str,
    dir: Mutex<Option<TempDir>>,
}

impl ScratchDir {
    pub(super) fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            dir: Mutex::new(None),
        }
    }

    pub(super) fn path(&self) -> io::Result<PathBuf> {
        let mut dir = self.dir.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = dir.as_ref() {
            return Ok(existing.path().to_path_buf());
        }
        let created = tempfile::Builder::new().prefix(self.prefix).tempdir()?;
        let path = created.path().to_path_buf();
        *dir = Some(created);
        Ok(path)
    }

    /// A sub-directory that lives as long as the session.
    pub(super) fn subdir(&self, name: &str) -> io::Result<PathBuf> {
        let path = self.path()?.join(name);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Writes `html` to a fresh `.html` file, deleted when the handle drops.
    pub(super) fn html_file(&self, html: &str) -> io::Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("page_")
            .suffix(".html")
            .tempfile_in(self.path()?)?;
        file.write_all(html.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    /// Reserves an empty file path for a program to write into.
    pub(super) fn output_file(&self, suffix: &str) -> io::Result<NamedTempFile> {
        tempfile::Builder::new()
            .prefix("print_")
            .suffix(suffix)
            .tempfile_in(self.path()?)
    }

    #[cfg(test)]
    pub(super) fn existing(&self) -> Option<PathBuf> {
        self.dir
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|d| d.path().to_path_buf())
    }
}
