//! Rate-limited bulk upload queue.
//!
//! Batches are admitted FIFO and drained by a single worker task, so only one
//! batch is in flight process-wide and records of a batch are written one at
//! a time in input order. A pacing gate keeps successive record writes at
//! least `delay` apart to stay under the store's write-rate limit.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AppError;

/// Finished jobs kept around for status lookups.
const MAX_FINISHED_JOBS: usize = 100;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("upload queue is shut down")]
    Shutdown,

    #[error("upload job {0} was dropped before completing")]
    Dropped(Uuid),
}

/// Writes one record to the store and returns the id it was stored under.
#[async_trait]
pub trait RecordHandler: Send + Sync {
    async fn handle(&self, record: &Value) -> Result<String, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcome {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Processing,
    Completed,
    /// Finished without a single record written.
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub id: Uuid,
    pub label: String,
    pub state: JobState,
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub submitted_at: String,
    pub finished_at: Option<String>,
    pub results: Vec<RecordOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    pub queue_length: usize,
    pub processing: bool,
    pub current_job: Option<Uuid>,
    pub delay_ms: u64,
}

struct Job {
    id: Uuid,
    label: String,
    records: Vec<Value>,
    handler: Arc<dyn RecordHandler>,
    reply: oneshot::Sender<Vec<RecordOutcome>>,
}

#[derive(Default)]
struct Registry {
    jobs: HashMap<Uuid, JobStatus>,
    finished: VecDeque<Uuid>,
    current: Option<Uuid>,
}

struct Shared {
    delay: Duration,
    queued: AtomicUsize,
    registry: Mutex<Registry>,
}

impl Shared {
    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a submitted batch.
pub struct UploadHandle {
    pub id: Uuid,
    receiver: oneshot::Receiver<Vec<RecordOutcome>>,
}

impl UploadHandle {
    /// Resolves with one outcome per submitted record, in input order.
    pub async fn wait(self) -> Result<Vec<RecordOutcome>, UploadError> {
        self.receiver.await.map_err(|_| UploadError::Dropped(self.id))
    }
}

#[derive(Clone)]
pub struct UploadQueue {
    sender: mpsc::UnboundedSender<Job>,
    shared: Arc<Shared>,
}

impl UploadQueue {
    /// Spawns the worker; must be called inside a tokio runtime.
    pub fn new(delay: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            delay,
            queued: AtomicUsize::new(0),
            registry: Mutex::new(Registry::default()),
        });

        tokio::spawn(run_worker(receiver, shared.clone()));
        info!("upload queue started (delay: {:?})", delay);

        Self { sender, shared }
    }

    pub fn submit(
        &self,
        label: impl Into<String>,
        records: Vec<Value>,
        handler: Arc<dyn RecordHandler>,
    ) -> Result<UploadHandle, UploadError> {
        let id = Uuid::new_v4();
        let label = label.into();
        let (reply, receiver) = oneshot::channel();

        self.shared.registry().jobs.insert(
            id,
            JobStatus {
                id,
                label: label.clone(),
                state: JobState::Queued,
                total: records.len(),
                processed: 0,
                succeeded: 0,
                failed: 0,
                submitted_at: Utc::now().to_rfc3339(),
                finished_at: None,
                results: Vec::new(),
            },
        );
        self.shared.queued.fetch_add(1, Ordering::SeqCst);

        let job = Job {
            id,
            label,
            records,
            handler,
            reply,
        };
        if self.sender.send(job).is_err() {
            self.shared.queued.fetch_sub(1, Ordering::SeqCst);
            self.shared.registry().jobs.remove(&id);
            return Err(UploadError::Shutdown);
        }

        debug!("upload job {} queued", id);
        Ok(UploadHandle { id, receiver })
    }

    pub fn status(&self) -> QueueStatus {
        let current = self.shared.registry().current;
        QueueStatus {
            queue_length: self.shared.queued.load(Ordering::SeqCst),
            processing: current.is_some(),
            current_job: current,
            delay_ms: self.shared.delay.as_millis() as u64,
        }
    }

    pub fn job(&self, id: &Uuid) -> Option<JobStatus> {
        self.shared.registry().jobs.get(id).cloned()
    }

    pub fn delay(&self) -> Duration {
        self.shared.delay
    }
}

/// Enforces a minimum spacing between successive record submissions.
struct PacingGate {
    delay: Duration,
    last: Option<Instant>,
}

impl PacingGate {
    fn new(delay: Duration) -> Self {
        Self { delay, last: None }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last {
            let next = last + self.delay;
            if next > Instant::now() {
                debug!("pacing gate holding for {:?}", next - Instant::now());
                tokio::time::sleep_until(next).await;
            }
        }
        self.last = Some(Instant::now());
    }
}

async fn run_worker(mut receiver: mpsc::UnboundedReceiver<Job>, shared: Arc<Shared>) {
    let mut gate = PacingGate::new(shared.delay);

    while let Some(job) = receiver.recv().await {
        shared.queued.fetch_sub(1, Ordering::SeqCst);
        {
            let mut registry = shared.registry();
            registry.current = Some(job.id);
            if let Some(status) = registry.jobs.get_mut(&job.id) {
                status.state = JobState::Processing;
            }
        }
        info!("upload job {} ({}) started: {} records", job.id, job.label, job.records.len());

        let results = process_batch(&job, &mut gate, &shared).await;
        let failed = results.iter().filter(|r| !r.success).count();

        {
            let mut registry = shared.registry();
            registry.current = None;
            if let Some(status) = registry.jobs.get_mut(&job.id) {
                status.state = if !results.is_empty() && failed == results.len() {
                    JobState::Failed
                } else {
                    JobState::Completed
                };
                status.finished_at = Some(Utc::now().to_rfc3339());
                status.results = results.clone();
            }
            registry.finished.push_back(job.id);
            while registry.finished.len() > MAX_FINISHED_JOBS {
                if let Some(old) = registry.finished.pop_front() {
                    registry.jobs.remove(&old);
                }
            }
        }
        info!(
            "upload job {} ({}) finished: {} ok, {} failed",
            job.id,
            job.label,
            results.len() - failed,
            failed
        );

        // The submitter may have stopped listening; the registry keeps the results.
        let _ = job.reply.send(results);
    }

    info!("upload queue stopped");
}

async fn process_batch(job: &Job, gate: &mut PacingGate, shared: &Shared) -> Vec<RecordOutcome> {
    let mut results = Vec::with_capacity(job.records.len());

    for (index, record) in job.records.iter().enumerate() {
        gate.wait().await;

        let handler = job.handler.clone();
        let record = record.clone();
        // Run on its own task so a panicking handler only fails its record.
        let outcome = match tokio::spawn(async move { handler.handle(&record).await }).await {
            Ok(Ok(id)) => RecordOutcome {
                index,
                success: true,
                id: Some(id),
                error: None,
            },
            Ok(Err(e)) => {
                warn!("upload job {} record {} failed: {}", job.id, index, e);
                RecordOutcome {
                    index,
                    success: false,
                    id: None,
                    error: Some(e.to_string()),
                }
            }
            Err(e) => {
                warn!("upload job {} record {} aborted: {}", job.id, index, e);
                RecordOutcome {
                    index,
                    success: false,
                    id: None,
                    error: Some(format!("handler aborted: {}", e)),
                }
            }
        };

        if let Some(status) = shared.registry().jobs.get_mut(&job.id) {
            status.processed += 1;
            if outcome.success {
                status.succeeded += 1;
            } else {
                status.failed += 1;
            }
        }
        results.push(outcome);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Records when each record started; fails records marked `"fail": true`
    /// and panics on `"panic": true`.
    struct Recorder {
        starts: Mutex<Vec<(String, Instant)>>,
        latency: Duration,
    }

    impl Recorder {
        fn new(latency: Duration) -> Arc<Self> {
            Arc::new(Self {
                starts: Mutex::new(Vec::new()),
                latency,
            })
        }

        fn starts(&self) -> Vec<(String, Instant)> {
            self.starts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecordHandler for Recorder {
        async fn handle(&self, record: &Value) -> Result<String, AppError> {
            let name = record["name"].as_str().unwrap_or_default().to_string();
            self.starts.lock().unwrap().push((name.clone(), Instant::now()));
            tokio::time::sleep(self.latency).await;

            if record["panic"].as_bool() == Some(true) {
                panic!("handler blew up");
            }
            if record["fail"].as_bool() == Some(true) {
                return Err(AppError::BadRequest(format!("{} is invalid", name)));
            }
            Ok(format!("id-{}", name))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn results_match_input_length_and_order() {
        let queue = UploadQueue::new(Duration::from_secs(5));
        let handler = Recorder::new(Duration::from_millis(10));

        let records = vec![
            json!({ "name": "a" }),
            json!({ "name": "b", "fail": true }),
            json!({ "name": "c" }),
        ];
        let results = queue
            .submit("faculty", records, handler.clone())
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        let indexes: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert!(results[0].success);
        assert_eq!(results[0].id.as_deref(), Some("id-a"));
        assert!(!results[1].success);
        assert_eq!(results[1].error.as_deref(), Some("Bad request: b is invalid"));
        assert!(results[2].success);

        let names: Vec<String> = handler.starts().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn successive_records_are_spaced_by_delay() {
        let delay = Duration::from_secs(5);
        let queue = UploadQueue::new(delay);

        for latency in [Duration::from_millis(100), Duration::from_secs(7)] {
            let handler = Recorder::new(latency);
            let records = (0..3).map(|i| json!({ "name": i.to_string() })).collect();
            queue.submit("rooms", records, handler.clone()).unwrap().wait().await.unwrap();

            let starts = handler.starts();
            for pair in starts.windows(2) {
                let gap = pair[1].1 - pair[0].1;
                assert!(gap >= delay, "gap {:?} shorter than delay", gap);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn batches_run_one_after_another_in_submission_order() {
        let queue = UploadQueue::new(Duration::from_secs(1));
        let handler = Recorder::new(Duration::from_millis(500));

        let batch = vec![json!({ "name": "1a" }), json!({ "name": "1b" })];
        let first = queue.submit("first", batch, handler.clone()).unwrap();
        let second = queue
            .submit("second", vec![json!({ "name": "2a" })], handler.clone())
            .unwrap();

        let (first, second) = tokio::join!(first.wait(), second.wait());
        assert_eq!(first.unwrap().len(), 2);
        assert_eq!(second.unwrap().len(), 1);

        let names: Vec<String> = handler.starts().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["1a", "1b", "2a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn status_reports_progress_while_processing() {
        let queue = UploadQueue::new(Duration::from_secs(5));
        let handler = Recorder::new(Duration::from_secs(10));

        let first = queue
            .submit("first", vec![json!({ "name": "x" })], handler.clone())
            .unwrap();
        let second = queue
            .submit("second", vec![json!({ "name": "y" })], handler.clone())
            .unwrap();
        let first_id = first.id;
        let second_id = second.id;

        tokio::time::sleep(Duration::from_millis(1)).await;

        let status = queue.status();
        assert!(status.processing);
        assert_eq!(status.current_job, Some(first_id));
        assert_eq!(status.queue_length, 1);
        assert_eq!(status.delay_ms, 5000);
        assert_eq!(queue.job(&first_id).unwrap().state, JobState::Processing);
        assert_eq!(queue.job(&second_id).unwrap().state, JobState::Queued);

        first.wait().await.unwrap();
        second.wait().await.unwrap();

        let done = queue.job(&second_id).unwrap();
        assert_eq!(done.state, JobState::Completed);
        assert_eq!(done.processed, 1);
        assert_eq!(done.succeeded, 1);
        assert!(!queue.status().processing);
        assert_eq!(queue.status().queue_length, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_handler_fails_only_its_record() {
        let queue = UploadQueue::new(Duration::from_millis(10));
        let handler = Recorder::new(Duration::ZERO);

        let records = vec![
            json!({ "name": "ok" }),
            json!({ "name": "boom", "panic": true }),
            json!({ "name": "after" }),
        ];
        let results = queue
            .submit("courses", records, handler)
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert!(results[1].error.as_deref().unwrap().starts_with("handler aborted"));
        assert!(results[2].success);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_with_no_successful_record_is_failed() {
        let queue = UploadQueue::new(Duration::from_millis(10));
        let handler = Recorder::new(Duration::ZERO);

        let rejected = vec![
            json!({ "name": "x", "fail": true }),
            json!({ "name": "y", "fail": true }),
        ];
        let handle = queue.submit("rooms", rejected, handler.clone()).unwrap();
        let id = handle.id;
        assert_eq!(handle.wait().await.unwrap().len(), 2);

        let job = queue.job(&id).unwrap();
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.failed, 2);
        assert!(job.finished_at.is_some());

        let mixed = vec![json!({ "name": "z", "fail": true }), json!({ "name": "w" })];
        let handle = queue.submit("rooms", mixed, handler).unwrap();
        let id = handle.id;
        handle.wait().await.unwrap();
        assert_eq!(queue.job(&id).unwrap().state, JobState::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_batch_completes_immediately() {
        let queue = UploadQueue::new(Duration::from_secs(5));
        let handle = queue.submit("empty", Vec::new(), Recorder::new(Duration::ZERO)).unwrap();
        let id = handle.id;

        assert!(handle.wait().await.unwrap().is_empty());
        assert_eq!(queue.job(&id).unwrap().total, 0);
        assert_eq!(queue.job(&id).unwrap().state, JobState::Completed);
    }
}
