//! Pause, resume and stop requests for a running merge job.
//!
//! Each handler only flips a flag on the job's `JobControl`. The worker
//! observes it before its next row and reports the resulting status itself.

use crate::job_controller::control::JobControl;
use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder};
use log::info;

pub(crate) async fn pause(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    apply(&job_id, &state, JobControl::pause, "Pause").await
}

pub(crate) async fn resume(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    apply(&job_id, &state, JobControl::resume, "Resume").await
}

pub(crate) async fn stop(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    apply(&job_id, &state, JobControl::stop, "Stop").await
}

/// 200 once the request is recorded, 409 for a finished job, 404 for an
/// unknown one.
async fn apply(
    job_id: &str,
    state: &JobsState,
    action: fn(&JobControl),
    verb: &str,
) -> HttpResponse {
    let control = state.controls.read().await.get(job_id).cloned();
    match control {
        Some(control) => {
            action(&control);
            info!(
                "{} requested for merge job {} (paused: {}, stopped: {})",
                verb,
                job_id,
                control.is_paused(),
                control.is_stopped()
            );
            HttpResponse::Ok().body(format!("{} requested", verb))
        }
        None if state.jobs.read().await.contains_key(job_id) => {
            HttpResponse::Conflict().body("Job is no longer running")
        }
        None => HttpResponse::NotFound().body("Job ID not found"),
    }
}
