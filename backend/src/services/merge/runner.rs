//! The synchronous merge loop.
//!
//! `merge_blocking` is the body of a merge job. It runs on a blocking thread
//! (see `start.rs`), loads the template and the table, picks the PDF backend
//! and hands the rows to `run_rows`, which processes them strictly in order:
//!
//! 1. checkpoint: stop, or wait while paused;
//! 2. render the template with the row;
//! 3. print the HTML to PDF and write it under a fresh name;
//! 4. report progress.
//!
//! A failing row is logged and counted and the loop moves on. Only problems
//! that make every row impossible (template, table, output directory) fail
//! the job.

use super::naming::name_for;
use super::run_log::RunLog;
use crate::config::AppConfig;
use crate::error::{MergeError, RowError};
use crate::job_controller::control::{Checkpoint, JobControl};
use crate::services::data_sources::table::{Row, Table};
use crate::services::pdf::{self, PdfBackend};
use crate::services::templates::render::Template;
use common::jobs::{JobStatus, MergeSummary};
use common::model::mapping::FieldMapping;
use common::model::pdf::{BackendKind, PdfOptions};
use common::requests::StartMergeRequest;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Progress reported from the worker thread to the async side.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeUpdate {
    /// A state change of the whole job (running, paused, ...).
    Job(JobStatus),
    /// Row `row_index` (0-based) has been visited, successfully or not.
    Task { row_index: usize, total_rows: usize },
}

/// Completion percentage after `done` of `total` rows, rounded down.
pub fn progress_percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    (done.min(total) * 100 / total) as u32
}

/// Everything a merge job needs, resolved from the request and the
/// configuration before the job is scheduled.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub table_path: PathBuf,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
    pub mapping: FieldMapping,
    pub backend: BackendKind,
    pub pdf_options: PdfOptions,
    pub chrome_path: PathBuf,
    pub id_field: String,
}

impl MergePlan {
    /// Validates `req` and fills the fields it leaves out from `config`.
    ///
    /// A start needs a source table and at least one mapping entry.
    pub fn from_request(config: &AppConfig, req: StartMergeRequest) -> Result<Self, MergeError> {
        if req.table_path.trim().is_empty() {
            return Err(MergeError::Validation(
                "No source table selected".to_string(),
            ));
        }
        if req.mapping.is_empty() {
            return Err(MergeError::Validation(
                "Field mapping is empty".to_string(),
            ));
        }
        let non_blank = |p: Option<String>| p.filter(|p| !p.trim().is_empty()).map(PathBuf::from);

        Ok(MergePlan {
            table_path: PathBuf::from(req.table_path),
            template_path: non_blank(req.template_path)
                .unwrap_or_else(|| config.paths.template_path.clone()),
            output_dir: non_blank(req.output_dir)
                .unwrap_or_else(|| config.paths.output_dir.clone()),
            mapping: req.mapping,
            backend: req.backend.unwrap_or(config.browser.kind),
            pdf_options: config.pdf_settings.with_overrides(&req.pdf),
            chrome_path: config.paths.chrome_path.clone(),
            id_field: config.naming.id_field.clone(),
        })
    }
}

/// Per-row inputs shared by every row of a run.
pub struct MergeJob<'a> {
    pub template: &'a Template,
    pub mapping: &'a FieldMapping,
    pub output_dir: &'a Path,
    pub pdf_options: &'a PdfOptions,
    pub id_field: &'a str,
}

/// How `run_rows` ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(MergeSummary),
    Stopped { summary: MergeSummary, progress: u32 },
}

impl RunOutcome {
    pub fn status(&self) -> JobStatus {
        match self {
            RunOutcome::Completed(summary) => JobStatus::Completed(*summary),
            RunOutcome::Stopped { progress, .. } => JobStatus::Stopped(*progress),
        }
    }
}

/// Processes `rows` in order, honouring `control` before each row.
pub fn run_rows(
    job: &MergeJob,
    rows: &[Row],
    backend: &dyn PdfBackend,
    control: &JobControl,
    log: &mut RunLog,
    notify: &mut dyn FnMut(MergeUpdate),
) -> RunOutcome {
    let total_rows = rows.len();
    let mut summary = MergeSummary {
        total_rows,
        ..MergeSummary::default()
    };
    let mut progress = 0;

    for (row_index, row) in rows.iter().enumerate() {
        match control.checkpoint(|| notify(MergeUpdate::Job(JobStatus::Paused(progress)))) {
            Checkpoint::Stop => {
                log.info(format!(
                    "Stopped before row {}; {} files written",
                    row_index + 1,
                    summary.produced
                ));
                return RunOutcome::Stopped { summary, progress };
            }
            Checkpoint::Resumed => notify(MergeUpdate::Job(JobStatus::Running(progress))),
            Checkpoint::Proceed => {}
        }

        log.row_started(row_index, total_rows);
        match produce(job, row, backend) {
            Ok(path) => {
                summary.produced += 1;
                log.row_succeeded(row_index, &path);
            }
            Err(e) => {
                summary.failed += 1;
                log.row_failed(row_index, &e);
            }
        }

        progress = progress_percent(row_index + 1, total_rows);
        notify(MergeUpdate::Task {
            row_index,
            total_rows,
        });
    }

    RunOutcome::Completed(summary)
}

/// Renders, prints and writes one row. Returns the written file.
fn produce(job: &MergeJob, row: &Row, backend: &dyn PdfBackend) -> Result<PathBuf, RowError> {
    let html = job.template.render(job.mapping, row);
    let pdf = backend.print_to_pdf(&html, job.pdf_options)?;
    let path = job.output_dir.join(name_for(row, job.id_field));
    write_new(&path, &pdf).map_err(|source| RowError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Writes `bytes` to a file that must not exist yet. A partially written
/// file is removed.
fn write_new(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    if let Err(e) = file.write_all(bytes).and_then(|_| file.flush()) {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(e);
    }
    Ok(())
}

/// The complete merge job, designed to run via `spawn_blocking`.
///
/// Progress goes out through `tx`. Returns the terminal status to record, or
/// the job-level error that made the run impossible.
pub fn merge_blocking(
    tx: mpsc::Sender<MergeUpdate>,
    job_id: &str,
    plan: &MergePlan,
    control: &JobControl,
) -> Result<JobStatus, MergeError> {
    let _ = tx.blocking_send(MergeUpdate::Job(JobStatus::Running(0)));
    let mut log = RunLog::new(job_id);

    let template = Template::load(&plan.template_path)?;
    for target in template.unmatched_targets(&plan.mapping) {
        log.info(format!(
            "Mapping target '{}' is not a placeholder of {}; ignored",
            target,
            template.path().display()
        ));
    }

    let table = Table::load(&plan.table_path)?;
    if table.is_empty() {
        log.info(format!("{} has no data rows", plan.table_path.display()));
    } else {
        log.info(format!(
            "Loaded {} rows from {}",
            table.len(),
            plan.table_path.display()
        ));
    }

    fs::create_dir_all(&plan.output_dir).map_err(|source| MergeError::OutputDir {
        path: plan.output_dir.clone(),
        source,
    })?;

    let backend = pdf::backend_for(plan.backend, &plan.chrome_path);
    log.info(format!("Printing with the {} backend", backend.kind()));

    let job = MergeJob {
        template: &template,
        mapping: &plan.mapping,
        output_dir: &plan.output_dir,
        pdf_options: &plan.pdf_options,
        id_field: &plan.id_field,
    };
    let outcome = run_rows(
        &job,
        table.rows(),
        backend.as_ref(),
        control,
        &mut log,
        &mut |update| {
            let _ = tx.blocking_send(update);
        },
    );

    match &outcome {
        RunOutcome::Completed(summary) => log.finished(summary),
        RunOutcome::Stopped { .. } => log.report_failures(),
    }
    Ok(outcome.status())
}
