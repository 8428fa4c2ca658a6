//! Shared state of merge jobs.
//!
//! - `JobsState`: clonable, thread-safe handle injected into the Actix
//!   application in `main.rs`. It holds the status of every job and the
//!   control handle of every job that is still running.
//! - `JobUpdate`: message used by background jobs to report status changes.
//! - `start_job_updater`: long-running task that applies `JobUpdate`s to the
//!   status map, so workers never need write access to it.

use crate::job_controller::control::JobControl;
use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// A thread-safe, shareable container for the state of all merge jobs.
#[derive(Clone)]
pub struct JobsState {
    /// Job id → latest reported `JobStatus`. Read by the status endpoint,
    /// written by `start_job_updater` and by the scheduler when a job is
    /// registered.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Job id → pause/resume/stop handle. Entries are removed once the job
    /// reaches a terminal state.
    pub controls: Arc<RwLock<HashMap<String, Arc<JobControl>>>>,

    /// Sender half of the update channel drained by `start_job_updater`.
    pub tx: mpsc::Sender<JobUpdate>,
}

impl JobsState {
    /// Creates an empty state together with the receiver that must be handed
    /// to `start_job_updater`.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(buffer);
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            controls: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }
}

/// A status update for a specific job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

/// Applies every `JobUpdate` received on `rx` to the shared status map.
///
/// Spawned once in `main.rs`; runs until every sender is dropped.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id, update.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn updater_applies_updates_in_order() {
        let (state, rx) = JobsState::new(8);
        let updater = tokio::spawn(start_job_updater(state.clone(), rx));

        for status in [JobStatus::Running(10), JobStatus::Paused(10), JobStatus::Stopped(10)] {
            state
                .tx
                .send(JobUpdate {
                    job_id: "job".to_string(),
                    status,
                })
                .await
                .unwrap();
        }

        // The updater owns a sender clone, so wait for the map instead of the task.
        let mut last = None;
        for _ in 0..1000 {
            last = state.jobs.read().await.get("job").cloned();
            if last == Some(JobStatus::Stopped(10)) {
                break;
            }
            tokio::task::yield_now().await;
        }
        updater.abort();
        assert_eq!(last, Some(JobStatus::Stopped(10)));
    }
}
