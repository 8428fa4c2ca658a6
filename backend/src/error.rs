use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Job-level failures of a merge run.
///
/// Row-level problems are not represented here: they are recorded in the
/// run log and the batch moves on.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("{0}")]
    Validation(String),

    #[error("template '{}' is unreadable: {source}", .path.display())]
    TemplateUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("cannot prepare output directory '{}': {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures while loading a source table.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("cannot open table '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse CSV '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot read spreadsheet '{}': {message}", .path.display())]
    Spreadsheet { path: PathBuf, message: String },

    #[error("table '{}' has no header row", .path.display())]
    MissingHeader { path: PathBuf },

    #[error("unsupported table format '{}'", .path.display())]
    UnsupportedFormat { path: PathBuf },
}

/// Failures of a single print request. Always reported per row.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("page load failed: {0}")]
    Navigation(String),

    #[error("print failed: {0}")]
    Print(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Why a single row produced no PDF. Logged, counted, never fatal.
#[derive(Error, Debug)]
pub enum RowError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("cannot write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures while reading the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config '{}': {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },
}
