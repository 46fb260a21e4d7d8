// Operations module
// Business logic: the directory mirror engine and the background jobs running it

pub mod jobs;
pub mod mirror;

pub use jobs::{JobEvent, JobFailure, JobId, JobOutcome, JobRecord, JobStatus, JobTracker, SyncWorker};
pub use mirror::{Mirror, MirrorEngine, MirrorError, MirrorOptions, MirrorReport, SyncAction, SyncRequest};
