use crate::error::RowError;
use common::jobs::MergeSummary;
use log::{debug, error, info, warn};
use std::fmt::Display;
use std::path::Path;

/// A row that produced no PDF, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    /// 0-based index among the data rows.
    pub row_index: usize,
    pub message: String,
}

/// Logging context of one merge run.
///
/// Every message is prefixed with the job id before going to the `log`
/// facade, and row failures are also kept so the end of the run can list
/// them together.
#[derive(Debug)]
pub struct RunLog {
    job_id: String,
    failures: Vec<RowFailure>,
}

impl RunLog {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            failures: Vec::new(),
        }
    }

    pub fn info(&self, message: impl Display) {
        info!("[{}] {}", self.job_id, message);
    }

    pub fn row_started(&self, row_index: usize, total_rows: usize) {
        debug!(
            "[{}] Processing row {}/{}",
            self.job_id,
            row_index + 1,
            total_rows
        );
    }

    pub fn row_succeeded(&self, row_index: usize, path: &Path) {
        info!(
            "[{}] Row {} written to {}",
            self.job_id,
            row_index + 1,
            path.display()
        );
    }

    pub fn row_failed(&mut self, row_index: usize, err: &RowError) {
        error!("[{}] Row {} failed: {}", self.job_id, row_index + 1, err);
        self.failures.push(RowFailure {
            row_index,
            message: err.to_string(),
        });
    }

    pub fn failures(&self) -> &[RowFailure] {
        &self.failures
    }

    /// Every failed row (1-based) with its reason, on one line.
    pub fn failure_report(&self) -> Option<String> {
        let failures = self.failures();
        if failures.is_empty() {
            return None;
        }
        let rows: Vec<String> = failures
            .iter()
            .map(|f| format!("row {} ({})", f.row_index + 1, f.message))
            .collect();
        Some(format!("{} rows failed: {}", failures.len(), rows.join("; ")))
    }

    pub fn report_failures(&self) {
        if let Some(report) = self.failure_report() {
            warn!("[{}] {}", self.job_id, report);
        }
    }

    pub fn finished(&self, summary: &MergeSummary) {
        info!(
            "[{}] Merge finished: {} of {} rows written, {} failed",
            self.job_id, summary.produced, summary.total_rows, summary.failed
        );
        self.report_failures();
    }
}
