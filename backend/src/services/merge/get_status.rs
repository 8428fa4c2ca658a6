use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder};

/// `GET /api/merge/status/{job_id}`: the latest status of a merge job. The
/// body names the job, so it is readable without the request at hand.
pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    let job_id = job_id.into_inner();
    match state.jobs.read().await.get(&job_id) {
        Some(status) => HttpResponse::Ok().json(serde_json::json!({
            "job_id": job_id,
            "status": status,
            "finished": status.is_terminal(),
        })),
        None => HttpResponse::NotFound().body(format!("Merge job {} not found", job_id)),
    }
}
