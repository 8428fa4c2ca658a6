use serde::{Deserialize, Serialize};

/// Lifecycle of a merge job as reported to clients.
///
/// `Running`, `Paused` and `Stopped` carry the completion percentage reached
/// so far. `Stopped`, `Completed` and `Failed` are terminal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    Idle,
    Running(u32),
    Paused(u32),
    Stopped(u32),
    Completed(MergeSummary),
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Stopped(_) | JobStatus::Completed(_) | JobStatus::Failed(_)
        )
    }
}

/// Row counts of a finished (or stopped) merge run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    /// Number of data rows in the source table.
    pub total_rows: usize,
    /// Rows that produced a PDF file.
    pub produced: usize,
    /// Rows that were visited but failed to render, print or write.
    pub failed: usize,
}
