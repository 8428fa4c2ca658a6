//! Merge jobs: one PDF per table row.
//!
//! Routes provided here:
//! - `POST /api/merge/start`: schedule a job, returns `{"job_id": ...}`.
//! - `GET /api/merge/status/{job_id}`: `{job_id, status, finished}` of a job.
//! - `POST /api/merge/{job_id}/pause`, `/resume`, `/stop`: control a running job.

mod control;
mod get_status;
pub mod naming;
pub mod run_log;
pub mod runner;
mod start;

use actix_web::web;

const API_PATH: &str = "/api/merge";

/// Configures and returns the Actix `Scope` for all merge-related routes.
pub fn configure_routes() -> actix_web::Scope {
    web::scope(API_PATH)
        .route("/start", web::post().to(start::process))
        .route("/status/{job_id}", web::get().to(get_status::process))
        .route("/{job_id}/pause", web::post().to(control::pause))
        .route("/{job_id}/resume", web::post().to(control::resume))
        .route("/{job_id}/stop", web::post().to(control::stop))
}
