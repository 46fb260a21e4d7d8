// Sync Jobs
// Background workers, job records and completion tracking

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{error, info, info_span};

use super::mirror::{Mirror, MirrorReport, SyncRequest};

/// Identifier of a submitted job, increasing in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Failure captured by a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    /// Name of the worker that ran the job
    pub worker: String,
    /// Original error message
    pub message: String,
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.worker, self.message)
    }
}

/// Final result of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success(MirrorReport),
    Failure(JobFailure),
}

/// Display state of a job record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Succeeded,
    Failed,
}

type WorkerResult = Result<MirrorReport, String>;

/// A single sync running on a blocking worker thread
///
/// The worker never propagates errors or panics to its owner. They are
/// captured and handed over through `take_outcome` once the worker stopped.
#[derive(Debug)]
pub struct SyncWorker {
    name: String,
    handle: JoinHandle<()>,
    outcome_rx: Option<oneshot::Receiver<WorkerResult>>,
}

impl SyncWorker {
    /// Start `request` on the runtime's blocking pool
    pub fn spawn(runtime: &Handle, name: String, mirror: Arc<dyn Mirror>, request: SyncRequest) -> Self {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let span_name = name.clone();

        let handle = runtime.spawn_blocking(move || {
            let _span = info_span!("sync_worker", worker = %span_name).entered();

            let result = match panic::catch_unwind(AssertUnwindSafe(|| mirror.mirror(&request))) {
                Ok(Ok(report)) => Ok(report),
                Ok(Err(e)) => Err(e.to_string()),
                Err(payload) => Err(format!("worker panicked: {}", panic_message(payload.as_ref()))),
            };

            // Receiver may already be gone if the tracker was dropped
            let _ = outcome_tx.send(result);
        });

        Self {
            name,
            handle,
            outcome_rx: Some(outcome_rx),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Non-blocking check of the worker's execution state
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Take the outcome of a stopped worker
    ///
    /// Returns `None` while the worker is still running, and after the
    /// outcome was taken once.
    pub fn take_outcome(&mut self) -> Option<JobOutcome> {
        if self.is_running() {
            return None;
        }

        let rx = self.outcome_rx.as_mut()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err("worker exited without reporting an outcome".to_string()),
        };
        self.outcome_rx = None;

        Some(match result {
            Ok(report) => JobOutcome::Success(report),
            Err(message) => JobOutcome::Failure(JobFailure {
                worker: self.name.clone(),
                message,
            }),
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Bookkeeping entry for one submitted sync
#[derive(Debug)]
pub struct JobRecord {
    id: JobId,
    request: SyncRequest,
    worker: SyncWorker,
    outcome: Option<JobOutcome>,
    completed: bool,
    submitted_at: Instant,
    finished_at: Option<Instant>,
}

impl JobRecord {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn request(&self) -> &SyncRequest {
        &self.request
    }

    pub fn worker_name(&self) -> &str {
        self.worker.name()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    pub fn outcome(&self) -> Option<&JobOutcome> {
        self.outcome.as_ref()
    }

    pub fn status(&self) -> JobStatus {
        match &self.outcome {
            None => JobStatus::Running,
            Some(JobOutcome::Success(_)) => JobStatus::Succeeded,
            Some(JobOutcome::Failure(_)) => JobStatus::Failed,
        }
    }

    /// Time since submission, frozen once the job completed
    pub fn elapsed(&self) -> Duration {
        self.finished_at
            .unwrap_or_else(Instant::now)
            .saturating_duration_since(self.submitted_at)
    }
}

/// Emitted once per job when it is observed finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Completed {
        id: JobId,
        source: PathBuf,
        target: PathBuf,
        report: MirrorReport,
    },
    Failed {
        id: JobId,
        source: PathBuf,
        target: PathBuf,
        failure: JobFailure,
    },
}

impl JobEvent {
    pub fn id(&self) -> JobId {
        match self {
            JobEvent::Completed { id, .. } | JobEvent::Failed { id, .. } => *id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobEvent::Failed { .. })
    }

    /// User-facing notice text
    pub fn notice(&self) -> String {
        match self {
            JobEvent::Completed { source, target, .. } => format!(
                "Sync from {} to {} complete",
                source.display(),
                target.display()
            ),
            JobEvent::Failed { source, target, failure, .. } => format!(
                "Sync from {} to {} failed: {}",
                source.display(),
                target.display(),
                failure.message
            ),
        }
    }
}

/// Owns every job record, in submission order
pub struct JobTracker {
    runtime: Handle,
    mirror: Arc<dyn Mirror>,
    records: Vec<JobRecord>,
    next_id: u64,
}

impl fmt::Debug for JobTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobTracker")
            .field("records", &self.records)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl JobTracker {
    pub fn new(runtime: Handle, mirror: Arc<dyn Mirror>) -> Self {
        Self {
            runtime,
            mirror,
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Create a job record and start its worker immediately
    pub fn submit(&mut self, request: SyncRequest) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;

        let name = format!("sync-worker-{}", id.0);
        info!(
            job = %id,
            worker = %name,
            source = %request.source.display(),
            target = %request.target.display(),
            action = %request.action,
            purge = request.options.purge,
            create = request.options.create,
            "sync job submitted"
        );

        let worker = SyncWorker::spawn(&self.runtime, name, Arc::clone(&self.mirror), request.clone());
        self.records.push(JobRecord {
            id,
            request,
            worker,
            outcome: None,
            completed: false,
            submitted_at: Instant::now(),
            finished_at: None,
        });

        id
    }

    /// Mark every newly stopped job as completed and report it
    pub fn poll(&mut self) -> Vec<JobEvent> {
        let mut events = Vec::new();

        for record in self.records.iter_mut().filter(|r| !r.completed) {
            if record.worker.is_running() {
                continue;
            }
            let Some(outcome) = record.worker.take_outcome() else {
                continue;
            };

            record.completed = true;
            record.finished_at = Some(Instant::now());

            let source = record.request.source.clone();
            let target = record.request.target.clone();
            let event = match &outcome {
                JobOutcome::Success(report) => {
                    info!(job = %record.id, summary = %report.summary(), "sync job complete");
                    JobEvent::Completed {
                        id: record.id,
                        source,
                        target,
                        report: report.clone(),
                    }
                }
                JobOutcome::Failure(failure) => {
                    error!(job = %record.id, worker = %failure.worker, error = %failure.message, "sync job failed");
                    JobEvent::Failed {
                        id: record.id,
                        source,
                        target,
                        failure: failure.clone(),
                    }
                }
            };

            record.outcome = Some(outcome);
            events.push(event);
        }

        events
    }

    /// Block until every job completed, reporting each as it finishes
    ///
    /// Used after the interactive window is gone. Returns once every record
    /// is completed, which implies every worker has stopped.
    pub fn drain(&mut self, tick: Duration, mut on_event: impl FnMut(&JobEvent)) {
        loop {
            for event in self.poll() {
                on_event(&event);
            }
            if self.all_completed() {
                break;
            }
            thread::sleep(tick);
        }
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn get(&self, id: JobId) -> Option<&JobRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Jobs not yet marked completed
    pub fn in_flight(&self) -> usize {
        self.records.iter().filter(|r| !r.completed).count()
    }

    pub fn has_in_flight(&self) -> bool {
        self.in_flight() > 0
    }

    pub fn all_completed(&self) -> bool {
        self.records.iter().all(|r| r.completed)
    }

    /// Failures captured so far, in submission order
    pub fn failures(&self) -> Vec<&JobFailure> {
        self.records
            .iter()
            .filter_map(|r| match &r.outcome {
                Some(JobOutcome::Failure(f)) => Some(f),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::operations::mirror::{MirrorError, MirrorOptions};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Condvar, Mutex};

    /// Mirror whose calls block until released. Sources containing "fail"
    /// return an error, sources containing "panic" panic.
    pub(crate) struct GatedMirror {
        released: Mutex<bool>,
        cvar: Condvar,
        pub calls: AtomicUsize,
    }

    impl GatedMirror {
        pub fn closed() -> Arc<Self> {
            Arc::new(Self {
                released: Mutex::new(false),
                cvar: Condvar::new(),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn open() -> Arc<Self> {
            let mirror = Self::closed();
            mirror.release();
            mirror
        }

        pub fn release(&self) {
            *self.released.lock().unwrap() = true;
            self.cvar.notify_all();
        }
    }

    impl Mirror for GatedMirror {
        fn mirror(&self, request: &SyncRequest) -> Result<MirrorReport, MirrorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let mut released = self.released.lock().unwrap();
            while !*released {
                released = self.cvar.wait(released).unwrap();
            }
            drop(released);

            let source = request.source.to_string_lossy();
            if source.contains("fail") {
                return Err(MirrorError::SourceMissing(request.source.clone()));
            }
            if source.contains("panic") {
                panic!("mirror exploded");
            }
            Ok(MirrorReport {
                files_copied: 1,
                ..Default::default()
            })
        }
    }

    pub(crate) fn request(source: &str, target: &str) -> SyncRequest {
        SyncRequest::new(source, target, MirrorOptions::default())
    }

    /// Poll until `count` events arrived or the deadline passes
    pub(crate) fn poll_events(tracker: &mut JobTracker, count: usize) -> Vec<JobEvent> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut events = Vec::new();
        while events.len() < count && Instant::now() < deadline {
            events.extend(tracker.poll());
            thread::sleep(Duration::from_millis(5));
        }
        events
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Runtime::new().unwrap()
    }

    #[test]
    fn test_submit_creates_one_record_and_starts_worker() {
        let rt = runtime();
        let mirror = GatedMirror::closed();
        let mut tracker = JobTracker::new(rt.handle().clone(), mirror.clone());

        let id = tracker.submit(request("/src", "/dst"));
        assert_eq!(id, JobId(1));
        assert_eq!(tracker.records().len(), 1);

        // The worker reaches the mirror call without anyone polling
        let deadline = Instant::now() + Duration::from_secs(10);
        while mirror.calls.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(mirror.calls.load(Ordering::SeqCst), 1);

        mirror.release();
        poll_events(&mut tracker, 1);
    }

    #[test]
    fn test_completion_only_after_worker_stops_and_only_once() {
        let rt = runtime();
        let mirror = GatedMirror::closed();
        let mut tracker = JobTracker::new(rt.handle().clone(), mirror.clone());
        let id = tracker.submit(request("/src", "/dst"));

        for _ in 0..5 {
            assert!(tracker.poll().is_empty());
            let record = tracker.get(id).unwrap();
            assert!(record.is_running());
            assert!(!record.is_completed());
            assert_eq!(record.status(), JobStatus::Running);
            thread::sleep(Duration::from_millis(5));
        }

        mirror.release();
        let events = poll_events(&mut tracker, 1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id(), id);

        let record = tracker.get(id).unwrap();
        assert!(!record.is_running());
        assert!(record.is_completed());
        assert_eq!(record.status(), JobStatus::Succeeded);

        // Already completed jobs are never reported again
        assert!(tracker.poll().is_empty());
        assert!(tracker.all_completed());
    }

    #[test]
    fn test_failure_is_isolated_to_its_job() {
        let rt = runtime();
        let mut tracker = JobTracker::new(rt.handle().clone(), GatedMirror::open());

        let ok_a = tracker.submit(request("/a", "/b"));
        let bad = tracker.submit(request("/fail", "/d"));
        let ok_b = tracker.submit(request("/e", "/f"));

        let events = poll_events(&mut tracker, 3);
        assert_eq!(events.len(), 3);
        assert_eq!(events.iter().filter(|e| e.is_failure()).count(), 1);

        assert_eq!(tracker.get(ok_a).unwrap().status(), JobStatus::Succeeded);
        assert_eq!(tracker.get(ok_b).unwrap().status(), JobStatus::Succeeded);

        match tracker.get(bad).unwrap().outcome() {
            Some(JobOutcome::Failure(failure)) => {
                assert_eq!(failure.worker, "sync-worker-2");
                assert!(failure.message.contains("/fail"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(tracker.failures().len(), 1);
    }

    #[test]
    fn test_panicking_mirror_is_captured() {
        let rt = runtime();
        let mut tracker = JobTracker::new(rt.handle().clone(), GatedMirror::open());
        let id = tracker.submit(request("/panic", "/dst"));

        let events = poll_events(&mut tracker, 1);
        assert_eq!(events.len(), 1);
        assert!(events[0].notice().contains("mirror exploded"));

        match tracker.get(id).unwrap().outcome() {
            Some(JobOutcome::Failure(failure)) => {
                assert!(failure.message.contains("worker panicked"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_many_concurrent_jobs_all_complete() {
        let rt = runtime();
        let mirror = GatedMirror::closed();
        let mut tracker = JobTracker::new(rt.handle().clone(), mirror.clone());

        for i in 0..8 {
            let source = if i % 3 == 0 { format!("/fail-{}", i) } else { format!("/src-{}", i) };
            tracker.submit(request(&source, &format!("/dst-{}", i)));
        }
        assert_eq!(tracker.in_flight(), 8);

        mirror.release();
        let events = poll_events(&mut tracker, 8);
        assert_eq!(events.len(), 8);
        assert!(tracker.all_completed());
        assert_eq!(tracker.in_flight(), 0);
        assert_eq!(tracker.failures().len(), 3);
    }

    #[test]
    fn test_drain_waits_for_every_job() {
        let rt = runtime();
        let mirror = GatedMirror::closed();
        let mut tracker = JobTracker::new(rt.handle().clone(), mirror.clone());

        tracker.submit(request("/a", "/b"));
        tracker.submit(request("/c", "/d"));

        let releaser = {
            let mirror = Arc::clone(&mirror);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                mirror.release();
            })
        };

        let mut notices = Vec::new();
        tracker.drain(Duration::from_millis(5), |event| notices.push(event.notice()));
        releaser.join().unwrap();

        assert!(tracker.all_completed());
        assert!(tracker.records().iter().all(|r| !r.is_running()));
        assert_eq!(notices.len(), 2);
        assert!(notices.contains(&"Sync from /a to /b complete".to_string()));
        assert!(notices.contains(&"Sync from /c to /d complete".to_string()));
    }

    #[test]
    fn test_drain_reports_failures() {
        let rt = runtime();
        let mirror = GatedMirror::closed();
        let mut tracker = JobTracker::new(rt.handle().clone(), mirror.clone());

        tracker.submit(request("/ok", "/b"));
        tracker.submit(request("/data/fail", "/d"));

        let releaser = {
            let mirror = Arc::clone(&mirror);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                mirror.release();
            })
        };

        let mut events = Vec::new();
        tracker.drain(Duration::from_millis(5), |event| events.push(event.clone()));
        releaser.join().unwrap();

        assert_eq!(events.len(), 2);
        let failed: Vec<&JobEvent> = events.iter().filter(|e| e.is_failure()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(
            failed[0].notice(),
            "Sync from /data/fail to /d failed: source directory does not exist: /data/fail"
        );

        let failures = tracker.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].worker, "sync-worker-2");
        assert_eq!(
            failures[0].to_string(),
            "sync-worker-2 failed: source directory does not exist: /data/fail"
        );
    }

    #[test]
    fn test_drain_with_no_jobs_returns_immediately() {
        let rt = runtime();
        let mut tracker = JobTracker::new(rt.handle().clone(), GatedMirror::closed());
        let mut called = false;
        tracker.drain(Duration::from_secs(60), |_| called = true);
        assert!(!called);
    }
}
