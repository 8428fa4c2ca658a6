//! # Merge Job Start Service
//!
//! `POST /api/merge/start` validates a `StartMergeRequest`, registers a new
//! job and returns its id at once. The work itself runs in the background:
//!
//! 1. A Tokio task owns the job's lifecycle.
//! 2. `runner::merge_blocking` runs on the blocking thread pool, since
//!    printing drives an external browser and writes files.
//! 3. A listener task turns the worker's `MergeUpdate`s into `JobUpdate`s for
//!    the central updater.
//! 4. Once the worker returns and the listener has drained, the terminal
//!    status is recorded and the job's control handle is dropped.

use super::runner::{merge_blocking, progress_percent, MergePlan, MergeUpdate};
use crate::config::AppConfig;
use crate::error::MergeError;
use crate::job_controller::control::JobControl;
use crate::job_controller::state::{JobUpdate, JobsState};
use actix_web::{web, HttpResponse, Responder};
use common::jobs::JobStatus;
use common::requests::StartMergeRequest;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// The Actix web handler for `POST /api/merge/start`.
///
/// Responds with `{"job_id": ...}`, or 400 when the request cannot start a
/// merge.
pub(crate) async fn process(
    state: web::Data<JobsState>,
    config: web::Data<AppConfig>,
    payload: web::Json<StartMergeRequest>,
) -> impl Responder {
    match schedule_merge_job(&state, &config, payload.into_inner()).await {
        Ok(job_id) => HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id })),
        Err(MergeError::Validation(msg)) => HttpResponse::BadRequest().body(msg),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

/// Registers the job as `Idle` and spawns its background task.
async fn schedule_merge_job(
    state: &JobsState,
    config: &AppConfig,
    req: StartMergeRequest,
) -> Result<String, MergeError> {
    let plan = MergePlan::from_request(config, req)?;
    let job_id = Uuid::new_v4().to_string();
    let control = Arc::new(JobControl::new());

    state
        .jobs
        .write()
        .await
        .insert(job_id.clone(), JobStatus::Idle);
    state
        .controls
        .write()
        .await
        .insert(job_id.clone(), control.clone());

    info!(
        "Scheduled merge job {} for {} ({} mapped columns)",
        job_id,
        plan.table_path.display(),
        plan.mapping.len()
    );
    tokio::spawn(run_merge_job(state.clone(), job_id.clone(), plan, control));

    Ok(job_id)
}

async fn run_merge_job(state: JobsState, job_id: String, plan: MergePlan, control: Arc<JobControl>) {
    let tx = state.tx.clone();
    let (merge_tx, mut merge_rx) = mpsc::channel::<MergeUpdate>(100);

    let listener = {
        let tx = tx.clone();
        let job_id = job_id.clone();
        tokio::spawn(async move {
            while let Some(update) = merge_rx.recv().await {
                let status = match update {
                    MergeUpdate::Job(status) => status,
                    MergeUpdate::Task {
                        row_index,
                        total_rows,
                    } => JobStatus::Running(progress_percent(row_index + 1, total_rows)),
                };
                let _ = tx
                    .send(JobUpdate {
                        job_id: job_id.clone(),
                        status,
                    })
                    .await;
            }
        })
    };

    let handle = {
        let job_id = job_id.clone();
        let control = control.clone();
        tokio::task::spawn_blocking(move || merge_blocking(merge_tx, &job_id, &plan, &control))
    };

    let status = match handle.await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => {
            error!("Merge job {} failed: {}", job_id, e);
            JobStatus::Failed(e.to_string())
        }
        Err(e) => {
            error!("Merge job {} panicked: {}", job_id, e);
            JobStatus::Failed(format!("Task join error: {}", e))
        }
    };

    // The worker's sender is gone; let the last row updates land first.
    let _ = listener.await;
    state.controls.write().await.remove(&job_id);
    let _ = tx.send(JobUpdate { job_id, status }).await;
}
