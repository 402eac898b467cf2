//! Task scheduler: bounded worker pool over a FIFO queue.
//!
//! `submit` validates, registers a pending task, and enqueues it without
//! waiting on execution. A fixed number of workers consume the queue in
//! arrival order, so at most `workers` tasks are running at any instant.
//! Each task record is behind its own lock; the registry map is locked only
//! for insert and lookup, never across a pipeline run. The owning worker is
//! the sole writer of its task's record; pollers take snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::{GenerationRequest, Task, TaskStatus, ValidationError};
use crate::storage::ArtifactStore;

use super::Orchestrator;

/// Errors from the scheduler's query surface
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    #[error("task {0} not found")]
    NotFound(Uuid),

    #[error("task {0} has not completed")]
    NotReady(Uuid),
}

type TaskSlot = Arc<RwLock<Task>>;

pub struct Scheduler {
    tasks: RwLock<HashMap<Uuid, TaskSlot>>,
    queue: mpsc::UnboundedSender<Uuid>,
    store: Arc<dyn ArtifactStore>,
    workers: usize,
}

impl Scheduler {
    /// Create a scheduler and start its worker pool.
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        store: Arc<dyn ArtifactStore>,
        workers: usize,
    ) -> Arc<Self> {
        let workers = workers.max(1);
        let (tx, rx) = mpsc::unbounded_channel();

        let scheduler = Arc::new(Self {
            tasks: RwLock::new(HashMap::new()),
            queue: tx,
            store,
            workers,
        });

        // Workers share one receiver; holding its lock while awaiting recv
        // leaves the other workers free to run their current task.
        let rx = Arc::new(Mutex::new(rx));
        for worker in 0..workers {
            let scheduler = Arc::clone(&scheduler);
            let orchestrator = Arc::clone(&orchestrator);
            let rx = Arc::clone(&rx);
            tokio::spawn(async move {
                loop {
                    let next = rx.lock().await.recv().await;
                    let Some(task_id) = next else {
                        break;
                    };
                    scheduler.execute(&orchestrator, task_id).await;
                }
                debug!(worker, "worker stopped");
            });
        }

        scheduler
    }

    /// Number of workers in the pool
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Validate and enqueue a request; returns its task id immediately.
    pub async fn submit(&self, request: GenerationRequest) -> Result<Uuid, ValidationError> {
        request.validate()?;

        let id = Uuid::new_v4();
        let task = Task::new(id, request);
        self.tasks
            .write()
            .await
            .insert(id, Arc::new(RwLock::new(task)));

        if self.queue.send(id).is_err() {
            // Only possible once the runtime is shutting down
            warn!(task_id = %id, "worker pool unavailable, task stays pending");
        }

        info!(task_id = %id, "task submitted");
        Ok(id)
    }

    /// Snapshot a task's current state.
    pub async fn status(&self, id: Uuid) -> Result<Task, SchedulerError> {
        let slot = self
            .tasks
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SchedulerError::NotFound(id))?;
        let task = slot.read().await.clone();
        Ok(task)
    }

    /// Read the final artifact bytes of a completed task.
    pub async fn fetch_artifact(&self, id: Uuid) -> Result<Vec<u8>, SchedulerError> {
        let snapshot = self.status(id).await?;

        if snapshot.status != TaskStatus::Completed {
            return Err(SchedulerError::NotReady(id));
        }

        let key = snapshot
            .result()
            .map(|r| r.artifact_key.clone())
            .ok_or(SchedulerError::NotFound(id))?;

        match self.store.get(&key).await {
            Ok(Some(bytes)) => Ok(bytes),
            Ok(None) => {
                // Completed task without its artifact is a data-loss bug
                error!(task_id = %id, key, "artifact missing for completed task");
                Err(SchedulerError::NotFound(id))
            }
            Err(e) => {
                error!(task_id = %id, key, error = %e, "artifact read failed");
                Err(SchedulerError::NotFound(id))
            }
        }
    }

    async fn execute(&self, orchestrator: &Orchestrator, id: Uuid) {
        let Some(slot) = self.tasks.read().await.get(&id).cloned() else {
            warn!(task_id = %id, "queued task vanished from registry");
            return;
        };

        let request = {
            let mut task = slot.write().await;
            task.start();
            task.request.clone()
        };
        info!(task_id = %id, "task started");

        match orchestrator.run(&request).await {
            Ok(result) => {
                info!(task_id = %id, rounds = result.rounds, "task completed");
                slot.write().await.complete(result);
            }
            Err(failure) => {
                error!(task_id = %id, error = %failure, "task failed");
                slot.write().await.fail(failure.to_string());
            }
        }
    }
}
