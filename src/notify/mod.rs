//! In-process background jobs.
//!
//! Jobs are pushed onto an unbounded channel and handled by a single
//! spawned worker. Enqueueing never blocks and never fails the caller.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::db::{Database, UserRepository};

/// A background job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationJob {
    /// Greet a newly registered user.
    Welcome { user_id: i64 },
}

/// Sending half of the job queue.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    tx: mpsc::UnboundedSender<NotificationJob>,
}

impl NotificationQueue {
    /// Start the worker and return the queue feeding it.
    ///
    /// The worker exits once every queue handle is dropped, yielding the
    /// number of jobs it completed.
    pub fn start(db: Arc<Database>) -> (Self, JoinHandle<usize>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(db, rx));
        (Self { tx }, handle)
    }

    /// Queue a job. Dropped with a warning if the worker has stopped.
    pub fn enqueue(&self, job: NotificationJob) {
        debug!(?job, "Queueing job");
        if let Err(e) = self.tx.send(job) {
            warn!(job = ?e.0, "Notification worker is gone, job dropped");
        }
    }
}

async fn run_worker(db: Arc<Database>, mut rx: mpsc::UnboundedReceiver<NotificationJob>) -> usize {
    let mut completed = 0;

    while let Some(job) = rx.recv().await {
        if handle_job(&db, &job).await {
            completed += 1;
        }
    }

    debug!(completed, "Notification worker stopped");
    completed
}

async fn handle_job(db: &Database, job: &NotificationJob) -> bool {
    match job {
        NotificationJob::Welcome { user_id } => {
            match UserRepository::new(db.pool()).get_by_id(*user_id).await {
                Ok(Some(user)) => {
                    info!(user_id = user.id, "Welcome {}!", user.email);
                    true
                }
                Ok(None) => {
                    warn!(user_id, "Welcome job for unknown user");
                    false
                }
                Err(e) => {
                    warn!(user_id, error = %e, "Welcome job failed");
                    false
                }
            }
        }
    }
}
